// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Operation orchestration.
//!
//! ## Strategy
//!
//! Every user action runs the same pipeline: reconcile the wallet's chain,
//! top up the allowance when the action spends wallet tokens, submit the
//! primary contract call, and wait for its receipt. The machine state and
//! the step list are published on watch channels before each network call
//! so observers never see a status that lags the work it describes.
//!
//! A failed stage aborts the pipeline; the raw error is classified once
//! and surfaces through the state channel, a notification, and the
//! returned [`OperationFailure`]. A confirmation timeout is reported as
//! uncertain rather than failed, with the explorer link attached.

mod plan;

pub use plan::{
    CreatePoolParams, DepositParams, FaucetParams, MarketOrderParams, Operation, OperationKind,
    OrderFunding, OrderParams, WithdrawParams,
};

use std::sync::Arc;

use alloy::primitives::B256;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::allowance::{AllowanceCheck, AllowancePreflight};
use crate::chains::{ChainRegistry, DexDeployment};
use crate::classify::{classify, ClassifiedError};
use crate::config::CoreConfig;
use crate::error::OrchestrationError;
use crate::executor::TransactionExecutor;
use crate::notify::{Notification, NotificationSink};
use crate::poller::ConfirmationPoller;
use crate::reconcile::ChainReconciler;
use crate::steps::{Step, StepTracker};
use crate::wallet::{TxReceipt, WalletAdapter};

use plan::OperationPlan;

/// Machine state of one operation invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState {
    Idle,
    ValidatingChain,
    /// Entered only when an approval submission is actually necessary.
    Approving,
    Submitting,
    Confirming,
    Success { tx_hash: B256 },
    Failed { classified: ClassifiedError },
}

/// Terminal success payload.
#[derive(Debug, Clone)]
pub struct OperationReceipt {
    /// Invocation id, threaded through logs and notifications
    pub id: Uuid,
    pub kind: OperationKind,
    /// Hash of the primary transaction
    pub tx_hash: B256,
    /// Confirmed on-chain outcome
    pub receipt: TxReceipt,
    /// Block-explorer link for the primary transaction
    pub explorer_url: Option<String>,
}

/// Terminal failure payload: the classification to show and the raw
/// error for logs.
#[derive(Debug)]
pub struct OperationFailure {
    pub classified: ClassifiedError,
    pub error: OrchestrationError,
}

/// Live view of a spawned operation.
///
/// Dropping the handle does not cancel the operation; the spawned task
/// runs to its own terminal state.
pub struct OperationHandle {
    pub id: Uuid,
    pub kind: OperationKind,
    /// Step list snapshots as the operation progresses.
    pub steps: watch::Receiver<Vec<Step>>,
    /// Machine-state updates.
    pub state: watch::Receiver<OperationState>,
    /// Resolves to the terminal outcome.
    pub result: JoinHandle<Result<OperationReceipt, OperationFailure>>,
}

/// Drives user intents end to end against one deployment.
pub struct Orchestrator {
    deployment: DexDeployment,
    registry: Arc<ChainRegistry>,
    notifier: Arc<dyn NotificationSink>,
    reconciler: ChainReconciler,
    preflight: AllowancePreflight,
    executor: TransactionExecutor,
    poller: ConfirmationPoller,
}

impl Orchestrator {
    pub fn new(
        wallet: Arc<dyn WalletAdapter>,
        registry: Arc<ChainRegistry>,
        deployment: DexDeployment,
        notifier: Arc<dyn NotificationSink>,
        config: CoreConfig,
    ) -> Self {
        Self {
            reconciler: ChainReconciler::new(
                wallet.clone(),
                registry.clone(),
                notifier.clone(),
                config.disconnect_grace,
            ),
            preflight: AllowancePreflight::new(wallet.clone(), config.confirmation),
            executor: TransactionExecutor::new(wallet.clone()),
            poller: ConfirmationPoller::new(wallet, config.confirmation),
            deployment,
            registry,
            notifier,
        }
    }

    /// Spawn an operation and return its live handle.
    pub fn invoke(self: Arc<Self>, operation: Operation) -> OperationHandle {
        let id = Uuid::new_v4();
        let kind = operation.kind();
        let (state_tx, state_rx) = watch::channel(OperationState::Idle);

        let plan = match operation.plan(&self.deployment) {
            Ok(plan) => plan,
            Err(error) => {
                let failure = self.fail(id, kind, &state_tx, error);
                let tracker = StepTracker::new(Vec::<String>::new());
                let steps = tracker.subscribe();
                let result = tokio::spawn(async move { Err(failure) });
                return OperationHandle {
                    id,
                    kind,
                    steps,
                    state: state_rx,
                    result,
                };
            }
        };

        let mut tracker = StepTracker::new(plan.labels.iter().copied());
        let steps = tracker.subscribe();
        let result = tokio::spawn(async move {
            self.run_plan(id, plan, &mut tracker, &state_tx).await
        });

        OperationHandle {
            id,
            kind,
            steps,
            state: state_rx,
            result,
        }
    }

    /// Run an operation to completion on the caller's task.
    pub async fn execute_operation(
        &self,
        operation: Operation,
    ) -> Result<OperationReceipt, OperationFailure> {
        let id = Uuid::new_v4();
        let kind = operation.kind();
        let (state_tx, _state_rx) = watch::channel(OperationState::Idle);

        let plan = match operation.plan(&self.deployment) {
            Ok(plan) => plan,
            Err(error) => return Err(self.fail(id, kind, &state_tx, error)),
        };
        let mut tracker = StepTracker::new(plan.labels.iter().copied());
        self.run_plan(id, plan, &mut tracker, &state_tx).await
    }

    pub async fn deposit(
        &self,
        params: DepositParams,
    ) -> Result<OperationReceipt, OperationFailure> {
        self.execute_operation(Operation::Deposit(params)).await
    }

    pub async fn withdraw(
        &self,
        params: WithdrawParams,
    ) -> Result<OperationReceipt, OperationFailure> {
        self.execute_operation(Operation::Withdraw(params)).await
    }

    pub async fn place_order(
        &self,
        params: OrderParams,
    ) -> Result<OperationReceipt, OperationFailure> {
        self.execute_operation(Operation::PlaceOrder(params)).await
    }

    pub async fn place_market_order(
        &self,
        params: MarketOrderParams,
    ) -> Result<OperationReceipt, OperationFailure> {
        self.execute_operation(Operation::PlaceMarketOrder(params))
            .await
    }

    pub async fn create_pool(
        &self,
        params: CreatePoolParams,
    ) -> Result<OperationReceipt, OperationFailure> {
        self.execute_operation(Operation::CreatePool(params)).await
    }

    pub async fn request_token(
        &self,
        params: FaucetParams,
    ) -> Result<OperationReceipt, OperationFailure> {
        self.execute_operation(Operation::RequestToken(params))
            .await
    }

    async fn run_plan(
        &self,
        id: Uuid,
        plan: OperationPlan,
        tracker: &mut StepTracker,
        state: &watch::Sender<OperationState>,
    ) -> Result<OperationReceipt, OperationFailure> {
        tracing::info!(
            %id,
            kind = ?plan.kind,
            function = plan.call.function,
            "operation started"
        );
        match self.drive(id, &plan, tracker, state).await {
            Ok(receipt) => {
                state.send_replace(OperationState::Success {
                    tx_hash: receipt.tx_hash,
                });
                let mut notification =
                    Notification::success(plan.kind.label(), plan.success_body.clone());
                if let Some(url) = receipt.explorer_url.clone() {
                    notification = notification.with_link(url);
                }
                self.notifier.notify(notification);
                tracing::info!(%id, tx_hash = %receipt.tx_hash, "operation confirmed");
                Ok(receipt)
            }
            Err(error) => Err(self.fail(id, plan.kind, state, error)),
        }
    }

    /// One pass through the pipeline. Steps and state are updated before
    /// each stage's network activity.
    async fn drive(
        &self,
        id: Uuid,
        plan: &OperationPlan,
        tracker: &mut StepTracker,
        state: &watch::Sender<OperationState>,
    ) -> Result<OperationReceipt, OrchestrationError> {
        let primary = plan.labels.len() - 1;

        state.send_replace(OperationState::ValidatingChain);
        tracker.start(0);
        if let Err(e) = self.reconciler.ensure_chain(self.deployment.chain_id).await {
            tracker.fail(0, e.to_string());
            return Err(e);
        }
        tracker.succeed(0);

        if let Some(need) = &plan.approval {
            tracker.start(1);
            match self.preflight.check(need.asset, need.spender, need.amount).await {
                Ok(AllowanceCheck::Sufficient { .. }) => tracker.succeed(1),
                Ok(AllowanceCheck::Short { pending }) => {
                    state.send_replace(OperationState::Approving);
                    match pending.approve().await {
                        Ok(_) => tracker.succeed(1),
                        Err(e) => {
                            tracker.fail(1, e.to_string());
                            return Err(e);
                        }
                    }
                }
                Err(e) => {
                    tracker.fail(1, e.to_string());
                    return Err(e);
                }
            }
        }

        state.send_replace(OperationState::Submitting);
        tracker.start(primary);
        let tx_hash = match self.executor.execute(&plan.call).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                tracker.fail(primary, e.to_string());
                return Err(e);
            }
        };
        tracing::info!(%id, tx_hash = %tx_hash, "submitted, awaiting confirmation");

        state.send_replace(OperationState::Confirming);
        let receipt = match self.poller.wait_for_receipt(tx_hash).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracker.fail(primary, e.to_string());
                return Err(e);
            }
        };
        tracker.succeed(primary);

        Ok(OperationReceipt {
            id,
            kind: plan.kind,
            tx_hash,
            receipt,
            explorer_url: self.explorer_url(tx_hash),
        })
    }

    /// Record a terminal failure: classify once, publish, notify.
    fn fail(
        &self,
        id: Uuid,
        kind: OperationKind,
        state: &watch::Sender<OperationState>,
        error: OrchestrationError,
    ) -> OperationFailure {
        let classified = classify(&error);
        state.send_replace(OperationState::Failed {
            classified: classified.clone(),
        });
        tracing::warn!(
            %id,
            category = classified.category.code(),
            error = %error,
            "operation failed"
        );

        match &error {
            // A timeout is uncertain, not failed: the transaction may
            // still confirm.
            OrchestrationError::ReceiptTimeout { tx_hash, .. } => {
                let mut notification = Notification::warning(
                    kind.label(),
                    "The transaction was submitted but not confirmed in time. Check the explorer before retrying.",
                );
                if let Some(url) = self.explorer_url(*tx_hash) {
                    notification = notification.with_link(url);
                }
                self.notifier.notify(notification);
            }
            _ => {
                self.notifier
                    .notify(Notification::error(kind.label(), classified.message.clone()));
            }
        }

        OperationFailure { classified, error }
    }

    fn explorer_url(&self, tx_hash: B256) -> Option<String> {
        self.registry
            .get(self.deployment.chain_id)
            .and_then(|target| target.tx_url(&tx_hash.to_string()))
    }
}
