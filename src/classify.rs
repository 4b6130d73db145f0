// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Error classification for user-facing surfaces.
//!
//! Structured [`OrchestrationError`] variants map straight to their
//! category. Variants that carry raw provider text (submission failures,
//! reverts, anything unclassified) are additionally matched against known
//! failure signatures so a user rejection buried in a transport error
//! still reads as a rejection. Classification is pure; callers keep the
//! raw error for logs.

use serde::Serialize;

use crate::error::OrchestrationError;

/// User-facing failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    ChainMismatch,
    ChainSwitchRejected,
    ChainRegistrationFailed,
    AllowanceReadFailed,
    ApprovalFailed,
    SubmissionFailed,
    ReceiptTimeout,
    ReceiptReverted,
    ContractRevert,
    FaucetCooldown,
    InsufficientBalance,
    UserRejected,
    OperationFailed,
}

impl ErrorCategory {
    /// Stable code for this category.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCategory::ChainMismatch => "chain_mismatch",
            ErrorCategory::ChainSwitchRejected => "chain_switch_rejected",
            ErrorCategory::ChainRegistrationFailed => "chain_registration_failed",
            ErrorCategory::AllowanceReadFailed => "allowance_read_failed",
            ErrorCategory::ApprovalFailed => "approval_failed",
            ErrorCategory::SubmissionFailed => "submission_failed",
            ErrorCategory::ReceiptTimeout => "receipt_timeout",
            ErrorCategory::ReceiptReverted => "receipt_reverted",
            ErrorCategory::ContractRevert => "contract_revert",
            ErrorCategory::FaucetCooldown => "faucet_cooldown",
            ErrorCategory::InsufficientBalance => "insufficient_balance",
            ErrorCategory::UserRejected => "user_rejected",
            ErrorCategory::OperationFailed => "operation_failed",
        }
    }
}

/// A classified failure, ready to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub message: String,
}

impl ClassifiedError {
    fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Classify a terminal operation error.
pub fn classify(error: &OrchestrationError) -> ClassifiedError {
    match error {
        OrchestrationError::ChainMismatch { expected, .. } => ClassifiedError::new(
            ErrorCategory::ChainMismatch,
            format!("Wallet is connected to the wrong network (expected chain {expected})."),
        ),
        OrchestrationError::ChainSwitchRejected => ClassifiedError::new(
            ErrorCategory::ChainSwitchRejected,
            "Network switch was declined in the wallet.",
        ),
        OrchestrationError::ChainRegistrationFailed { .. } => ClassifiedError::new(
            ErrorCategory::ChainRegistrationFailed,
            "Could not add the required network to the wallet.",
        ),
        OrchestrationError::AllowanceReadFailed(_) => ClassifiedError::new(
            ErrorCategory::AllowanceReadFailed,
            "Could not check the current token allowance.",
        ),
        OrchestrationError::ApprovalFailed(_) => ClassifiedError::new(
            ErrorCategory::ApprovalFailed,
            "Token approval did not complete.",
        ),
        OrchestrationError::ReceiptTimeout { .. } => ClassifiedError::new(
            ErrorCategory::ReceiptTimeout,
            "The transaction was not confirmed in time. It may still complete.",
        ),
        OrchestrationError::ReceiptReverted { .. } => ClassifiedError::new(
            ErrorCategory::ReceiptReverted,
            "The transaction was mined but reverted.",
        ),
        // Detail-carrying variants: sniff the raw text first, keep the
        // variant's own category as the fallback.
        OrchestrationError::SubmissionFailed { headline, .. } => match_signatures(headline)
            .unwrap_or_else(|| {
                ClassifiedError::new(
                    ErrorCategory::SubmissionFailed,
                    "The transaction could not be submitted.",
                )
            }),
        OrchestrationError::ContractRevert { reason } => match_signatures(reason)
            .unwrap_or_else(|| {
                ClassifiedError::new(
                    ErrorCategory::ContractRevert,
                    format!("Transaction reverted: {reason}"),
                )
            }),
        OrchestrationError::Unclassified(raw) => classify_text(raw),
    }
}

/// Classify raw provider/wallet text.
pub fn classify_text(raw: &str) -> ClassifiedError {
    match_signatures(raw).unwrap_or_else(|| {
        ClassifiedError::new(ErrorCategory::OperationFailed, raw.to_string())
    })
}

/// Ordered signature match; first hit wins.
fn match_signatures(raw: &str) -> Option<ClassifiedError> {
    let lowered = raw.to_ascii_lowercase();

    if contains_any(&lowered, &["cooldown", "once per day"]) {
        return Some(ClassifiedError::new(
            ErrorCategory::FaucetCooldown,
            "Faucet cooldown is active. Try again later.",
        ));
    }
    if contains_any(
        &lowered,
        &[
            "insufficient balance",
            "insufficient funds",
            "exceeds balance",
            "amount exceeds",
        ],
    ) {
        return Some(ClassifiedError::new(
            ErrorCategory::InsufficientBalance,
            "Insufficient balance for this transaction.",
        ));
    }
    if contains_any(
        &lowered,
        &["user rejected", "user denied", "rejected the request"],
    ) {
        return Some(ClassifiedError::new(
            ErrorCategory::UserRejected,
            "The request was rejected in the wallet.",
        ));
    }
    if lowered.contains("reverted") {
        return Some(ClassifiedError::new(
            ErrorCategory::ContractRevert,
            "The transaction reverted.",
        ));
    }

    None
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}
