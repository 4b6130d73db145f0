// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Failure taxonomy for orchestrated operations.
//!
//! Every terminal failure an operation can report is one of these
//! variants. Components map their boundary errors (wallet, RPC, decode)
//! into the taxonomy at the point where the failure becomes meaningful to
//! the operation; [`crate::classify`] turns the taxonomy into user-facing
//! categories.

use alloy::primitives::B256;
use thiserror::Error;

/// Errors that can terminate an orchestrated operation.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// The wallet is on the wrong chain and could not be moved to the
    /// required one (capability absent, transport failure, or timeout).
    #[error("Wallet is not on chain {expected}: {detail}")]
    ChainMismatch { expected: u64, detail: String },

    /// The user declined the chain switch prompt.
    #[error("Chain switch was rejected")]
    ChainSwitchRejected,

    /// The chain is unknown to the wallet and could not be registered.
    #[error("Failed to register chain {chain_id}: {detail}")]
    ChainRegistrationFailed { chain_id: u64, detail: String },

    /// Reading the current allowance failed.
    #[error("Failed to read allowance: {0}")]
    AllowanceReadFailed(String),

    /// The approval transaction failed to submit, reverted, or timed out.
    #[error("Token approval failed: {0}")]
    ApprovalFailed(String),

    /// Every submission strategy failed.
    ///
    /// `headline` is the most specific of the per-strategy failures;
    /// `attempts` keeps one line per strategy for logs.
    #[error("Failed to submit {function}: {headline}")]
    SubmissionFailed {
        function: String,
        headline: String,
        attempts: Vec<String>,
    },

    /// No receipt arrived within the confirmation budget.
    #[error("No receipt for {tx_hash} after {waited_ms} ms")]
    ReceiptTimeout { tx_hash: B256, waited_ms: u64 },

    /// The receipt arrived with a failure status.
    #[error("Transaction {tx_hash} reverted in block {block_number}")]
    ReceiptReverted { tx_hash: B256, block_number: u64 },

    /// The contract rejected the call with a revert reason.
    #[error("Contract reverted: {reason}")]
    ContractRevert { reason: String },

    /// Anything that fits no other variant.
    #[error("{0}")]
    Unclassified(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_detail() {
        let err = OrchestrationError::ChainMismatch {
            expected: 43113,
            detail: "wallet_switchEthereumChain unsupported".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Wallet is not on chain 43113: wallet_switchEthereumChain unsupported"
        );
    }

    #[test]
    fn test_submission_failed_headline() {
        let err = OrchestrationError::SubmissionFailed {
            function: "deposit".to_string(),
            headline: "insufficient funds for gas".to_string(),
            attempts: vec![
                "raw-rpc: insufficient funds for gas".to_string(),
                "wallet-client: transport closed".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Failed to submit deposit: insufficient funds for gas"
        );
    }

    #[test]
    fn test_reverted_display_names_block() {
        let err = OrchestrationError::ReceiptReverted {
            tx_hash: B256::repeat_byte(0xab),
            block_number: 1234,
        };
        let text = err.to_string();
        assert!(text.contains("reverted in block 1234"));
        assert!(text.contains("0xabab"));
    }
}
