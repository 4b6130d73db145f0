// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! ERC-20 allowance preflight.
//!
//! Spending contracts pull tokens via `transferFrom`, so every
//! token-funded operation first checks the owner's allowance toward the
//! spender and, when short, submits an `approve` for exactly the amount
//! the operation needs and waits for it to confirm. Unlimited approvals
//! are never granted.
//!
//! [`AllowancePreflight::check`] splits the read from the approval so a
//! caller can observe that an approval is about to be submitted before it
//! happens; [`AllowancePreflight::ensure_allowance`] composes the two.

use std::sync::Arc;

use alloy::primitives::{Address, U256};

use crate::backoff::BackoffPolicy;
use crate::contracts::{allowance_calldata, decode_allowance, ContractCall};
use crate::error::OrchestrationError;
use crate::executor::TransactionExecutor;
use crate::poller::ConfirmationPoller;
use crate::wallet::{TxReceipt, WalletAdapter};

/// One allowance reading.
#[derive(Debug, Clone)]
pub struct AllowanceState {
    /// Token owner (the connected account)
    pub owner: Address,
    /// Contract allowed to pull the tokens
    pub spender: Address,
    /// ERC-20 token contract
    pub asset: Address,
    /// Allowance at the time of the check
    pub current: U256,
    /// Amount the operation is about to spend
    pub required: U256,
}

/// Result of the read phase.
pub enum AllowanceCheck<'a> {
    /// The existing allowance already covers the required amount.
    Sufficient { state: AllowanceState },
    /// The allowance is short; [`PendingApproval::approve`] submits the
    /// exact-amount approval.
    Short { pending: PendingApproval<'a> },
}

/// An approval that has been decided but not yet submitted.
pub struct PendingApproval<'a> {
    preflight: &'a AllowancePreflight,
    state: AllowanceState,
}

impl PendingApproval<'_> {
    /// The reading that triggered this approval.
    pub fn state(&self) -> &AllowanceState {
        &self.state
    }

    /// Submit the approval and wait for its confirmation.
    pub async fn approve(self) -> Result<(AllowanceState, TxReceipt), OrchestrationError> {
        let call = ContractCall::approve(self.state.asset, self.state.spender, self.state.required);
        let tx_hash = self
            .preflight
            .executor
            .execute(&call)
            .await
            .map_err(|e| OrchestrationError::ApprovalFailed(e.to_string()))?;
        let receipt = self
            .preflight
            .poller
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| OrchestrationError::ApprovalFailed(e.to_string()))?;

        tracing::info!(
            asset = %self.state.asset,
            spender = %self.state.spender,
            tx_hash = %receipt.tx_hash,
            "approval confirmed"
        );
        Ok((self.state, receipt))
    }
}

/// Outcome of a completed preflight.
#[derive(Debug)]
pub enum AllowanceOutcome {
    /// The existing allowance already covers the required amount.
    Sufficient { state: AllowanceState },
    /// An approval for the exact required amount was submitted and
    /// confirmed. `state.current` is the reading that triggered it.
    Approved {
        state: AllowanceState,
        receipt: TxReceipt,
    },
}

/// Reads allowances and tops them up before a spend.
pub struct AllowancePreflight {
    wallet: Arc<dyn WalletAdapter>,
    executor: TransactionExecutor,
    poller: ConfirmationPoller,
}

impl AllowancePreflight {
    pub fn new(wallet: Arc<dyn WalletAdapter>, policy: BackoffPolicy) -> Self {
        Self {
            executor: TransactionExecutor::new(wallet.clone()),
            poller: ConfirmationPoller::new(wallet.clone(), policy),
            wallet,
        }
    }

    /// Read the current allowance of the connected account toward
    /// `spender` and decide whether an approval is needed. No transaction
    /// is submitted here.
    pub async fn check(
        &self,
        asset: Address,
        spender: Address,
        required: U256,
    ) -> Result<AllowanceCheck<'_>, OrchestrationError> {
        let owner = self.wallet.address();
        let data = allowance_calldata(owner, spender);
        let raw = self
            .wallet
            .read(asset, data)
            .await
            .map_err(|e| OrchestrationError::AllowanceReadFailed(e.to_string()))?;
        let current = decode_allowance(&raw).map_err(|e| {
            OrchestrationError::AllowanceReadFailed(format!("Malformed allowance response: {e}"))
        })?;

        let state = AllowanceState {
            owner,
            spender,
            asset,
            current,
            required,
        };

        if current >= required {
            tracing::debug!(
                %asset,
                %spender,
                current = %current,
                required = %required,
                "allowance sufficient"
            );
            return Ok(AllowanceCheck::Sufficient { state });
        }

        tracing::info!(
            %asset,
            %spender,
            current = %current,
            required = %required,
            "allowance short, approval required"
        );
        Ok(AllowanceCheck::Short {
            pending: PendingApproval {
                preflight: self,
                state,
            },
        })
    }

    /// Ensure `spender` may pull `required` of `asset` from the connected
    /// account, approving the exact amount when the allowance is short.
    pub async fn ensure_allowance(
        &self,
        asset: Address,
        spender: Address,
        required: U256,
    ) -> Result<AllowanceOutcome, OrchestrationError> {
        match self.check(asset, spender, required).await? {
            AllowanceCheck::Sufficient { state } => Ok(AllowanceOutcome::Sufficient { state }),
            AllowanceCheck::Short { pending } => {
                let (state, receipt) = pending.approve().await?;
                Ok(AllowanceOutcome::Approved { state, receipt })
            }
        }
    }
}
