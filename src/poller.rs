// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Receipt polling with bounded exponential backoff.
//!
//! ## Strategy
//!
//! The first poll happens immediately; each later poll waits the delay
//! dictated by the [`BackoffPolicy`]. A poll that would start past the
//! wall-clock budget is never made: the wait fails with a timeout even if
//! attempts remain. A receipt whose on-chain status is failure ends the
//! wait at once; transient RPC errors are remembered and rethrown only if
//! every attempt is used up.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::B256;
use chrono::{DateTime, Utc};

use crate::backoff::BackoffPolicy;
use crate::error::OrchestrationError;
use crate::wallet::{TxReceipt, WalletAdapter};

/// Bookkeeping for one submitted transaction being confirmed.
///
/// `attempt` never exceeds `max_attempts`, and the record is dropped as
/// soon as a terminal outcome is reached.
#[derive(Debug, Clone)]
pub struct PendingOperation {
    /// Transaction hash being watched
    pub handle: B256,
    /// Wall-clock submission time
    pub submitted_at: DateTime<Utc>,
    /// Polls made so far
    pub attempt: u32,
    /// Attempt budget
    pub max_attempts: u32,
    /// Wall-clock budget
    pub timeout: Duration,
}

/// Waits for submitted transactions to confirm.
pub struct ConfirmationPoller {
    wallet: Arc<dyn WalletAdapter>,
    policy: BackoffPolicy,
}

impl ConfirmationPoller {
    pub fn new(wallet: Arc<dyn WalletAdapter>, policy: BackoffPolicy) -> Self {
        Self { wallet, policy }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Poll until the transaction confirms, reverts, or the budget runs
    /// out.
    pub async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, OrchestrationError> {
        let started = tokio::time::Instant::now();
        let mut pending = PendingOperation {
            handle: tx_hash,
            submitted_at: Utc::now(),
            attempt: 0,
            max_attempts: self.policy.max_attempts,
            timeout: self.policy.timeout,
        };
        let mut last_error: Option<String> = None;

        while pending.attempt < pending.max_attempts {
            let delay = self.policy.delay_before_attempt(pending.attempt + 1);

            // The wall-clock budget overrides remaining attempts: a poll
            // that would start past it is never made.
            if started.elapsed() + delay >= pending.timeout {
                tracing::warn!(
                    %tx_hash,
                    attempt = pending.attempt,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "confirmation budget exhausted"
                );
                return Err(OrchestrationError::ReceiptTimeout {
                    tx_hash,
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            pending.attempt += 1;

            match self.wallet.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) if receipt.success => {
                    tracing::info!(
                        %tx_hash,
                        block_number = receipt.block_number,
                        attempt = pending.attempt,
                        "transaction confirmed"
                    );
                    return Ok(receipt);
                }
                Ok(Some(receipt)) => {
                    // Mined but failed on chain: terminal, never retried
                    return Err(OrchestrationError::ReceiptReverted {
                        tx_hash,
                        block_number: receipt.block_number,
                    });
                }
                Ok(None) => {
                    tracing::debug!(%tx_hash, attempt = pending.attempt, "not yet mined");
                }
                Err(e) => {
                    tracing::warn!(%tx_hash, attempt = pending.attempt, error = %e, "receipt poll failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        match last_error {
            Some(detail) => Err(OrchestrationError::Unclassified(format!(
                "Confirmation polling failed after {} attempts: {detail}",
                pending.max_attempts
            ))),
            None => Err(OrchestrationError::ReceiptTimeout {
                tx_hash,
                waited_ms: started.elapsed().as_millis() as u64,
            }),
        }
    }
}
