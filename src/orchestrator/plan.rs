// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Operation planning.
//!
//! Each user intent resolves to one plan: the ordered step labels, an
//! optional approval requirement, and the primary contract call against
//! one deployment. Amount validation happens here, before any network
//! activity.

use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::chains::DexDeployment;
use crate::contracts::{ContractCall, OrderSide};
use crate::error::OrchestrationError;
use crate::units::{format_amount, parse_amount, AmountError};

/// The named user actions the orchestrator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Deposit,
    Withdraw,
    PlaceOrder,
    PlaceMarketOrder,
    CreatePool,
    RequestToken,
}

impl OperationKind {
    /// Notification title for this operation.
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "Deposit",
            OperationKind::Withdraw => "Withdraw",
            OperationKind::PlaceOrder => "Place order",
            OperationKind::PlaceMarketOrder => "Market order",
            OperationKind::CreatePool => "Create pool",
            OperationKind::RequestToken => "Request tokens",
        }
    }
}

/// Funds source for order placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFunding {
    /// Spend balance already deposited with the exchange.
    Custody,
    /// Pull `amount` of `asset` from the wallet as part of the order.
    Wallet { asset: Address, amount: U256 },
}

/// Deposit into the exchange's custody contract.
#[derive(Debug, Clone)]
pub struct DepositParams {
    pub token: Address,
    /// Amount in the token's base units
    pub amount: U256,
    /// Token decimals, for display only
    pub decimals: u8,
}

impl DepositParams {
    pub fn new(token: Address, amount: U256, decimals: u8) -> Self {
        Self {
            token,
            amount,
            decimals,
        }
    }

    /// Build params from a human-entered amount string like `"12.5"`.
    pub fn from_human(token: Address, amount: &str, decimals: u8) -> Result<Self, AmountError> {
        Ok(Self {
            token,
            amount: parse_amount(amount, decimals)?,
            decimals,
        })
    }
}

/// Withdraw from the exchange's custody contract.
#[derive(Debug, Clone)]
pub struct WithdrawParams {
    pub token: Address,
    /// Amount in the token's base units
    pub amount: U256,
    /// Token decimals, for display only
    pub decimals: u8,
}

impl WithdrawParams {
    pub fn new(token: Address, amount: U256, decimals: u8) -> Self {
        Self {
            token,
            amount,
            decimals,
        }
    }

    /// Build params from a human-entered amount string like `"12.5"`.
    pub fn from_human(token: Address, amount: &str, decimals: u8) -> Result<Self, AmountError> {
        Ok(Self {
            token,
            amount: parse_amount(amount, decimals)?,
            decimals,
        })
    }
}

/// Limit order placement.
#[derive(Debug, Clone)]
pub struct OrderParams {
    pub market: Address,
    pub side: OrderSide,
    pub price: U256,
    pub quantity: U256,
    pub funding: OrderFunding,
}

/// Market order placement.
#[derive(Debug, Clone)]
pub struct MarketOrderParams {
    pub market: Address,
    pub side: OrderSide,
    pub quantity: U256,
    pub funding: OrderFunding,
}

/// New trading pool creation.
#[derive(Debug, Clone)]
pub struct CreatePoolParams {
    pub base: Address,
    pub quote: Address,
    pub tick_size: U256,
    pub lot_size: U256,
}

/// Test-token faucet request.
#[derive(Debug, Clone)]
pub struct FaucetParams {
    pub token: Address,
}

/// A user intent, ready to plan.
#[derive(Debug, Clone)]
pub enum Operation {
    Deposit(DepositParams),
    Withdraw(WithdrawParams),
    PlaceOrder(OrderParams),
    PlaceMarketOrder(MarketOrderParams),
    CreatePool(CreatePoolParams),
    RequestToken(FaucetParams),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Deposit(_) => OperationKind::Deposit,
            Operation::Withdraw(_) => OperationKind::Withdraw,
            Operation::PlaceOrder(_) => OperationKind::PlaceOrder,
            Operation::PlaceMarketOrder(_) => OperationKind::PlaceMarketOrder,
            Operation::CreatePool(_) => OperationKind::CreatePool,
            Operation::RequestToken(_) => OperationKind::RequestToken,
        }
    }

    /// Validate the intent and resolve it against one deployment.
    pub(crate) fn plan(self, deployment: &DexDeployment) -> Result<OperationPlan, OrchestrationError> {
        match self {
            Operation::Deposit(p) => {
                require_nonzero(p.amount, "Deposit amount")?;
                Ok(OperationPlan {
                    kind: OperationKind::Deposit,
                    labels: &["Check network", "Approve", "Deposit"],
                    approval: Some(ApprovalNeed {
                        asset: p.token,
                        spender: deployment.balance_manager,
                        amount: p.amount,
                    }),
                    call: ContractCall::deposit(deployment.balance_manager, p.token, p.amount),
                    success_body: format!(
                        "Deposit of {} confirmed.",
                        format_amount(p.amount, p.decimals)
                    ),
                })
            }
            Operation::Withdraw(p) => {
                require_nonzero(p.amount, "Withdrawal amount")?;
                Ok(OperationPlan {
                    kind: OperationKind::Withdraw,
                    labels: &["Check network", "Withdraw"],
                    approval: None,
                    call: ContractCall::withdraw(deployment.balance_manager, p.token, p.amount),
                    success_body: format!(
                        "Withdrawal of {} confirmed.",
                        format_amount(p.amount, p.decimals)
                    ),
                })
            }
            Operation::PlaceOrder(p) => {
                require_nonzero(p.price, "Order price")?;
                require_nonzero(p.quantity, "Order quantity")?;
                let success_body = format!("{} order placed.", side_word(p.side));
                match p.funding {
                    OrderFunding::Custody => Ok(OperationPlan {
                        kind: OperationKind::PlaceOrder,
                        labels: &["Check network", "Place order"],
                        approval: None,
                        call: ContractCall::place_order(
                            deployment.router,
                            p.market,
                            p.side,
                            p.price,
                            p.quantity,
                        ),
                        success_body,
                    }),
                    OrderFunding::Wallet { asset, amount } => {
                        require_nonzero(amount, "Wallet funding amount")?;
                        Ok(OperationPlan {
                            kind: OperationKind::PlaceOrder,
                            labels: &["Check network", "Approve", "Place order"],
                            approval: Some(ApprovalNeed {
                                asset,
                                spender: deployment.router,
                                amount,
                            }),
                            call: ContractCall::place_order_with_deposit(
                                deployment.router,
                                p.market,
                                p.side,
                                p.price,
                                p.quantity,
                                asset,
                                amount,
                            ),
                            success_body,
                        })
                    }
                }
            }
            Operation::PlaceMarketOrder(p) => {
                require_nonzero(p.quantity, "Order quantity")?;
                let success_body = format!("{} market order placed.", side_word(p.side));
                match p.funding {
                    OrderFunding::Custody => Ok(OperationPlan {
                        kind: OperationKind::PlaceMarketOrder,
                        labels: &["Check network", "Place order"],
                        approval: None,
                        call: ContractCall::place_market_order(
                            deployment.router,
                            p.market,
                            p.side,
                            p.quantity,
                        ),
                        success_body,
                    }),
                    OrderFunding::Wallet { asset, amount } => {
                        require_nonzero(amount, "Wallet funding amount")?;
                        Ok(OperationPlan {
                            kind: OperationKind::PlaceMarketOrder,
                            labels: &["Check network", "Approve", "Place order"],
                            approval: Some(ApprovalNeed {
                                asset,
                                spender: deployment.router,
                                amount,
                            }),
                            call: ContractCall::place_market_order_with_deposit(
                                deployment.router,
                                p.market,
                                p.side,
                                p.quantity,
                                asset,
                                amount,
                            ),
                            success_body,
                        })
                    }
                }
            }
            Operation::CreatePool(p) => {
                require_nonzero(p.tick_size, "Tick size")?;
                require_nonzero(p.lot_size, "Lot size")?;
                if p.base == p.quote {
                    return Err(OrchestrationError::Unclassified(
                        "Base and quote tokens must differ".to_string(),
                    ));
                }
                Ok(OperationPlan {
                    kind: OperationKind::CreatePool,
                    labels: &["Check network", "Create pool"],
                    approval: None,
                    call: ContractCall::create_pool(
                        deployment.pool_factory,
                        p.base,
                        p.quote,
                        p.tick_size,
                        p.lot_size,
                    ),
                    success_body: "Pool created.".to_string(),
                })
            }
            Operation::RequestToken(p) => {
                let Some(faucet) = deployment.faucet else {
                    return Err(OrchestrationError::Unclassified(
                        "No faucet is deployed on this chain".to_string(),
                    ));
                };
                Ok(OperationPlan {
                    kind: OperationKind::RequestToken,
                    labels: &["Check network", "Request tokens"],
                    approval: None,
                    call: ContractCall::request_token(faucet, p.token),
                    success_body: "Faucet request confirmed.".to_string(),
                })
            }
        }
    }
}

/// An approval the plan requires before the primary call.
#[derive(Debug, Clone)]
pub(crate) struct ApprovalNeed {
    pub asset: Address,
    pub spender: Address,
    pub amount: U256,
}

/// Validated, executable rendering of one intent.
#[derive(Debug)]
pub(crate) struct OperationPlan {
    pub kind: OperationKind,
    pub labels: &'static [&'static str],
    pub approval: Option<ApprovalNeed>,
    pub call: ContractCall,
    pub success_body: String,
}

fn require_nonzero(value: U256, what: &str) -> Result<(), OrchestrationError> {
    if value.is_zero() {
        return Err(OrchestrationError::Unclassified(format!(
            "{what} must be greater than zero"
        )));
    }
    Ok(())
}

fn side_word(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "Buy",
        OrderSide::Sell => "Sell",
    }
}
