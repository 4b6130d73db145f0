// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Strategy-fallback transaction submission.
//!
//! Wallet integrations differ in which call path actually works, so a
//! call is tried through every submission surface in priority order and
//! the first returned handle wins. A surface the adapter declares
//! unsupported is skipped and recorded. When everything fails, the
//! per-strategy failures are aggregated and the most specific one
//! (rejection, then revert, then insufficient funds, then transport
//! noise) becomes the headline.

use std::sync::Arc;

use alloy::primitives::B256;

use crate::contracts::ContractCall;
use crate::error::OrchestrationError;
use crate::wallet::{SubmitStrategy, WalletAdapter, WalletError};

/// Submits contract calls through whichever surface is available.
pub struct TransactionExecutor {
    wallet: Arc<dyn WalletAdapter>,
}

impl TransactionExecutor {
    pub fn new(wallet: Arc<dyn WalletAdapter>) -> Self {
        Self { wallet }
    }

    /// Submit `call`, returning the transaction hash from the first
    /// strategy that produces one.
    pub async fn execute(&self, call: &ContractCall) -> Result<B256, OrchestrationError> {
        let mut failures: Vec<(SubmitStrategy, WalletError)> = Vec::new();

        for strategy in SubmitStrategy::PRIORITY {
            match self.wallet.submit(call, strategy).await {
                Ok(tx_hash) => {
                    tracing::info!(
                        function = call.function,
                        strategy = strategy.name(),
                        %tx_hash,
                        "transaction submitted"
                    );
                    return Ok(tx_hash);
                }
                Err(WalletError::Unsupported) => {
                    tracing::debug!(
                        function = call.function,
                        strategy = strategy.name(),
                        "strategy not supported, trying next"
                    );
                    failures.push((strategy, WalletError::Unsupported));
                }
                Err(e) => {
                    tracing::warn!(
                        function = call.function,
                        strategy = strategy.name(),
                        error = %e,
                        "strategy failed, trying next"
                    );
                    failures.push((strategy, e));
                }
            }
        }

        Err(aggregate_failures(call.function, failures))
    }
}

fn aggregate_failures(
    function: &'static str,
    failures: Vec<(SubmitStrategy, WalletError)>,
) -> OrchestrationError {
    let attempts: Vec<String> = failures
        .iter()
        .map(|(strategy, error)| format!("{}: {error}", strategy.name()))
        .collect();

    let headline = failures
        .iter()
        .min_by_key(|(_, error)| specificity(error))
        .map(|(_, error)| match error {
            WalletError::Unsupported => "No supported submission path for this wallet".to_string(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "No submission strategies available".to_string());

    OrchestrationError::SubmissionFailed {
        function: function.to_string(),
        headline,
        attempts,
    }
}

/// Lower is more specific.
fn specificity(error: &WalletError) -> u8 {
    match error {
        WalletError::Rejected => 0,
        WalletError::Rpc(msg) if msg.to_ascii_lowercase().contains("revert") => 1,
        WalletError::Rpc(msg) if msg.to_ascii_lowercase().contains("insufficient") => 2,
        WalletError::UnrecognizedChain(_) | WalletError::Invalid(_) => 3,
        WalletError::Rpc(_) => 4,
        WalletError::Unsupported => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use crate::wallet::mock::MockWallet;

    fn call() -> ContractCall {
        ContractCall::deposit(
            Address::repeat_byte(0x22),
            Address::repeat_byte(0x33),
            U256::from(100u64),
        )
    }

    #[tokio::test]
    async fn test_first_strategy_wins() {
        let wallet = Arc::new(MockWallet::new(43113));
        let executor = TransactionExecutor::new(wallet.clone());

        let tx_hash = executor.execute(&call()).await.unwrap();
        assert!(!tx_hash.is_zero());

        let submissions = wallet.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].strategy, SubmitStrategy::RawRpc);
        assert_eq!(submissions[0].function, "deposit");
    }

    #[tokio::test]
    async fn test_unsupported_strategy_is_skipped() {
        let wallet = Arc::new(MockWallet::new(43113));
        wallet.queue_submit(Err(WalletError::Unsupported));
        let executor = TransactionExecutor::new(wallet.clone());

        executor.execute(&call()).await.unwrap();

        let strategies: Vec<SubmitStrategy> =
            wallet.submissions().iter().map(|s| s.strategy).collect();
        assert_eq!(
            strategies,
            vec![SubmitStrategy::RawRpc, SubmitStrategy::WalletClient]
        );
    }

    #[tokio::test]
    async fn test_failure_falls_through_to_next_strategy() {
        let wallet = Arc::new(MockWallet::new(43113));
        wallet.queue_submit(Err(WalletError::Rpc("transport closed".to_string())));
        wallet.queue_submit(Err(WalletError::Rpc("gateway timeout".to_string())));
        let executor = TransactionExecutor::new(wallet.clone());

        executor.execute(&call()).await.unwrap();
        assert_eq!(wallet.submissions().len(), 3);
    }

    #[tokio::test]
    async fn test_all_failed_aggregates_with_rejection_headline() {
        let wallet = Arc::new(MockWallet::new(43113));
        wallet.queue_submit(Err(WalletError::Rpc("transport closed".to_string())));
        wallet.queue_submit(Err(WalletError::Rejected));
        wallet.queue_submit(Err(WalletError::Rpc("gateway timeout".to_string())));
        let executor = TransactionExecutor::new(wallet.clone());

        let err = executor.execute(&call()).await.unwrap_err();
        match err {
            OrchestrationError::SubmissionFailed {
                function,
                headline,
                attempts,
            } => {
                assert_eq!(function, "deposit");
                assert!(headline.contains("rejected"));
                assert_eq!(attempts.len(), 3);
                assert!(attempts[0].starts_with("raw-rpc:"));
                assert!(attempts[1].starts_with("wallet-client:"));
                assert!(attempts[2].starts_with("provider-write:"));
            }
            other => panic!("expected SubmissionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_revert_outranks_transport_noise() {
        let wallet = Arc::new(MockWallet::new(43113));
        wallet.queue_submit(Err(WalletError::Rpc("gateway timeout".to_string())));
        wallet.queue_submit(Err(WalletError::Rpc(
            "execution reverted: pool exists".to_string(),
        )));
        wallet.queue_submit(Err(WalletError::Unsupported));
        let executor = TransactionExecutor::new(wallet.clone());

        let err = executor.execute(&call()).await.unwrap_err();
        match err {
            OrchestrationError::SubmissionFailed { headline, .. } => {
                assert!(headline.contains("pool exists"));
            }
            other => panic!("expected SubmissionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nothing_supported() {
        let wallet = Arc::new(MockWallet::new(43113));
        for _ in 0..3 {
            wallet.queue_submit(Err(WalletError::Unsupported));
        }
        let executor = TransactionExecutor::new(wallet.clone());

        let err = executor.execute(&call()).await.unwrap_err();
        match err {
            OrchestrationError::SubmissionFailed { headline, .. } => {
                assert_eq!(headline, "No supported submission path for this wallet");
            }
            other => panic!("expected SubmissionFailed, got {other:?}"),
        }
    }
}
