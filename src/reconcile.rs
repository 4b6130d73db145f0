// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Chain reconciliation.
//!
//! ## Strategy
//!
//! Before any contract call, the wallet must be attached to the chain the
//! operation targets. Equality is a no-op. Otherwise the wallet is asked
//! to switch; a wallet that does not recognize the chain gets the chain
//! definition registered through each registration surface in priority
//! order, then one switch retry. A user rejection anywhere stops the
//! reconciliation immediately.
//!
//! When configured with a grace period, a failed reconciliation warns the
//! user and schedules a wallet disconnect; a later successful
//! reconciliation cancels the pending disconnect.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::chains::ChainRegistry;
use crate::error::OrchestrationError;
use crate::notify::{Notification, NotificationSink};
use crate::wallet::{RegisterStrategy, WalletAdapter, WalletError};

/// Ensures the wallet is attached to the chain an operation requires.
pub struct ChainReconciler {
    wallet: Arc<dyn WalletAdapter>,
    registry: Arc<ChainRegistry>,
    notifier: Arc<dyn NotificationSink>,
    disconnect_grace: Option<Duration>,
    pending_disconnect: Mutex<Option<CancellationToken>>,
}

impl ChainReconciler {
    pub fn new(
        wallet: Arc<dyn WalletAdapter>,
        registry: Arc<ChainRegistry>,
        notifier: Arc<dyn NotificationSink>,
        disconnect_grace: Option<Duration>,
    ) -> Self {
        Self {
            wallet,
            registry,
            notifier,
            disconnect_grace,
            pending_disconnect: Mutex::new(None),
        }
    }

    /// Make the wallet's active chain equal `target_chain_id`.
    pub async fn ensure_chain(&self, target_chain_id: u64) -> Result<(), OrchestrationError> {
        let current = self.wallet.chain_id().await.map_err(|e| {
            OrchestrationError::ChainMismatch {
                expected: target_chain_id,
                detail: format!("Failed to read wallet chain: {e}"),
            }
        })?;

        if current == target_chain_id {
            self.cancel_pending_disconnect();
            return Ok(());
        }

        tracing::info!(current, target = target_chain_id, "reconciling wallet chain");

        match self.wallet.switch_chain(target_chain_id).await {
            Ok(()) => {
                self.cancel_pending_disconnect();
                Ok(())
            }
            Err(WalletError::UnrecognizedChain(_)) => {
                self.register_then_switch(target_chain_id).await
            }
            Err(WalletError::Rejected) => {
                self.on_failure();
                Err(OrchestrationError::ChainSwitchRejected)
            }
            Err(e) => {
                self.on_failure();
                Err(OrchestrationError::ChainMismatch {
                    expected: target_chain_id,
                    detail: e.to_string(),
                })
            }
        }
    }

    /// The wallet has no definition for the chain: register it, then retry
    /// the switch exactly once.
    async fn register_then_switch(&self, target_chain_id: u64) -> Result<(), OrchestrationError> {
        let Some(target) = self.registry.get(target_chain_id) else {
            self.on_failure();
            return Err(OrchestrationError::ChainRegistrationFailed {
                chain_id: target_chain_id,
                detail: "chain is not in the registry".to_string(),
            });
        };

        let mut failures: Vec<String> = Vec::new();
        let mut registered = false;
        for strategy in RegisterStrategy::PRIORITY {
            match self.wallet.register_chain(target, strategy).await {
                Ok(()) => {
                    tracing::info!(
                        chain_id = target_chain_id,
                        strategy = strategy.name(),
                        "chain registered"
                    );
                    registered = true;
                    break;
                }
                // A rejected add-chain prompt must not be re-prompted
                // through another surface.
                Err(WalletError::Rejected) => {
                    self.on_failure();
                    return Err(OrchestrationError::ChainSwitchRejected);
                }
                Err(e) => {
                    tracing::warn!(
                        chain_id = target_chain_id,
                        strategy = strategy.name(),
                        error = %e,
                        "registration strategy failed"
                    );
                    failures.push(format!("{}: {e}", strategy.name()));
                }
            }
        }

        if !registered {
            self.on_failure();
            return Err(OrchestrationError::ChainRegistrationFailed {
                chain_id: target_chain_id,
                detail: failures.join("; "),
            });
        }

        match self.wallet.switch_chain(target_chain_id).await {
            Ok(()) => {
                self.cancel_pending_disconnect();
                Ok(())
            }
            Err(WalletError::Rejected) => {
                self.on_failure();
                Err(OrchestrationError::ChainSwitchRejected)
            }
            Err(e) => {
                self.on_failure();
                Err(OrchestrationError::ChainMismatch {
                    expected: target_chain_id,
                    detail: format!("Switch failed after registration: {e}"),
                })
            }
        }
    }

    fn on_failure(&self) {
        let Some(grace) = self.disconnect_grace else {
            return;
        };
        let Ok(mut pending) = self.pending_disconnect.lock() else {
            return;
        };
        if pending.is_some() {
            return;
        }
        let token = CancellationToken::new();
        *pending = Some(token.clone());
        drop(pending);

        self.notifier.notify(Notification::warning(
            "Wrong network",
            format!(
                "The wallet will be disconnected in {}s unless it is switched to the required network.",
                grace.as_secs()
            ),
        ));

        let wallet = self.wallet.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("scheduled disconnect cancelled");
                }
                _ = tokio::time::sleep(grace) => {
                    tracing::warn!("network grace period expired, disconnecting wallet");
                    wallet.disconnect().await;
                }
            }
        });
    }

    fn cancel_pending_disconnect(&self) {
        if let Ok(mut pending) = self.pending_disconnect.lock() {
            if let Some(token) = pending.take() {
                token.cancel();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{AVALANCHE_CCHAIN, AVALANCHE_FUJI};
    use crate::notify::CollectingSink;
    use crate::wallet::mock::MockWallet;

    fn reconciler(
        wallet: Arc<MockWallet>,
        grace: Option<Duration>,
    ) -> (ChainReconciler, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let reconciler = ChainReconciler::new(
            wallet,
            Arc::new(ChainRegistry::builtin()),
            sink.clone(),
            grace,
        );
        (reconciler, sink)
    }

    #[tokio::test]
    async fn test_matching_chain_is_a_noop() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_FUJI));
        let (reconciler, _) = reconciler(wallet.clone(), None);

        reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap();
        assert!(wallet.switches().is_empty());
        assert!(wallet.registrations().is_empty());
    }

    #[tokio::test]
    async fn test_switch_happens_exactly_once_before_registration() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        let (reconciler, _) = reconciler(wallet.clone(), None);

        reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap();
        assert_eq!(wallet.switches(), vec![AVALANCHE_FUJI]);
        assert!(wallet.registrations().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_switch() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::Rejected));
        let (reconciler, _) = reconciler(wallet.clone(), None);

        let err = reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::ChainSwitchRejected));
        assert_eq!(wallet.switches().len(), 1);
        assert!(wallet.registrations().is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_chain_registers_then_switches() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::UnrecognizedChain(AVALANCHE_FUJI)));
        let (reconciler, _) = reconciler(wallet.clone(), None);

        reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap();

        assert_eq!(wallet.switches(), vec![AVALANCHE_FUJI, AVALANCHE_FUJI]);
        assert_eq!(
            wallet.registrations(),
            vec![(AVALANCHE_FUJI, RegisterStrategy::RawRpc)]
        );
    }

    #[tokio::test]
    async fn test_registration_falls_through_strategies() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::UnrecognizedChain(AVALANCHE_FUJI)));
        wallet.queue_register(Err(WalletError::Rpc("no transport".to_string())));
        wallet.queue_register(Ok(()));
        let (reconciler, _) = reconciler(wallet.clone(), None);

        reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap();

        let strategies: Vec<RegisterStrategy> =
            wallet.registrations().iter().map(|(_, s)| *s).collect();
        assert_eq!(
            strategies,
            vec![RegisterStrategy::RawRpc, RegisterStrategy::WalletClient]
        );
    }

    #[tokio::test]
    async fn test_registration_exhaustion() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::UnrecognizedChain(AVALANCHE_FUJI)));
        for _ in 0..3 {
            wallet.queue_register(Err(WalletError::Rpc("nope".to_string())));
        }
        let (reconciler, _) = reconciler(wallet.clone(), None);

        let err = reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap_err();
        match err {
            OrchestrationError::ChainRegistrationFailed { chain_id, detail } => {
                assert_eq!(chain_id, AVALANCHE_FUJI);
                assert!(detail.contains("raw-rpc"));
                assert!(detail.contains("provider-fallback"));
            }
            other => panic!("expected ChainRegistrationFailed, got {other:?}"),
        }
        // No switch retry without a successful registration
        assert_eq!(wallet.switches().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_registration_stops_prompting() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::UnrecognizedChain(AVALANCHE_FUJI)));
        wallet.queue_register(Err(WalletError::Rejected));
        let (reconciler, _) = reconciler(wallet.clone(), None);

        let err = reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::ChainSwitchRejected));
        assert_eq!(wallet.registrations().len(), 1);
    }

    #[tokio::test]
    async fn test_chain_missing_from_registry() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::UnrecognizedChain(999)));
        let (reconciler, _) = reconciler(wallet.clone(), None);

        let err = reconciler.ensure_chain(999).await.unwrap_err();
        match err {
            OrchestrationError::ChainRegistrationFailed { chain_id, detail } => {
                assert_eq!(chain_id, 999);
                assert!(detail.contains("registry"));
            }
            other => panic!("expected ChainRegistrationFailed, got {other:?}"),
        }
        assert!(wallet.registrations().is_empty());
    }

    #[tokio::test]
    async fn test_switch_transport_failure_is_mismatch() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::Rpc("timed out".to_string())));
        let (reconciler, _) = reconciler(wallet.clone(), None);

        let err = reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap_err();
        match err {
            OrchestrationError::ChainMismatch { expected, detail } => {
                assert_eq!(expected, AVALANCHE_FUJI);
                assert!(detail.contains("timed out"));
            }
            other => panic!("expected ChainMismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_switch_rejection_after_registration() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::UnrecognizedChain(AVALANCHE_FUJI)));
        wallet.queue_switch(Err(WalletError::Rejected));
        let (reconciler, _) = reconciler(wallet.clone(), None);

        let err = reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::ChainSwitchRejected));
        assert_eq!(wallet.switches().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_schedules_disconnect_after_grace() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::Rejected));
        let (reconciler, sink) = reconciler(wallet.clone(), Some(Duration::from_secs(10)));

        reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap_err();

        let warnings = sink.snapshot();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].title, "Wrong network");
        assert!(!wallet.is_disconnected());

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(wallet.is_disconnected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_success_cancels_pending_disconnect() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::Rejected));
        let (reconciler, _) = reconciler(wallet.clone(), Some(Duration::from_secs(10)));

        reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap_err();
        // The user switches manually; the next reconciliation succeeds
        reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap();

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!wallet.is_disconnected());
    }

    #[tokio::test]
    async fn test_no_grace_means_no_warning() {
        let wallet = Arc::new(MockWallet::new(AVALANCHE_CCHAIN));
        wallet.queue_switch(Err(WalletError::Rejected));
        let sink = Arc::new(CollectingSink::new());
        let reconciler = ChainReconciler::new(
            wallet.clone(),
            Arc::new(ChainRegistry::builtin()),
            sink.clone(),
            None,
        );

        reconciler.ensure_chain(AVALANCHE_FUJI).await.unwrap_err();
        assert!(sink.snapshot().is_empty());
    }
}
