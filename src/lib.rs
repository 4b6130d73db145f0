// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Spindrift Core - Transaction Orchestration for the Spindrift DEX
//!
//! This crate is the chain-reconciliation and transaction-orchestration
//! layer shared by Spindrift frontends. Every user intent (deposit,
//! withdraw, order placement, pool creation, faucet request) runs one
//! pipeline: reconcile the wallet's chain, top up the token allowance
//! when needed, submit the contract call, and poll for its receipt,
//! publishing step-by-step progress and classified failures as it goes.
//!
//! ## Modules
//!
//! - `orchestrator` - Operation pipelines and their live handles
//! - `reconcile` - Wallet/chain reconciliation (switch, register, grace disconnect)
//! - `allowance` - ERC-20 allowance preflight and exact-amount approval
//! - `wallet` - Wallet adapter surface (alloy)
//! - `steps` - Observable step tracking for UIs

pub mod allowance;
pub mod backoff;
pub mod chains;
pub mod classify;
pub mod config;
pub mod contracts;
pub mod error;
pub mod executor;
pub mod notify;
pub mod orchestrator;
pub mod poller;
pub mod reconcile;
pub mod steps;
pub mod telemetry;
pub mod units;
pub mod wallet;
