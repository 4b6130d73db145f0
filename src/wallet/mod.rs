// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Wallet adapters.
//!
//! The orchestration core talks to wallets through [`WalletAdapter`], one
//! implementation per wallet kind, selected once at connection time. A
//! surface an adapter cannot serve answers [`WalletError::Unsupported`];
//! callers never probe capabilities at runtime.
//!
//! Chain registration and transaction submission are dispatched by
//! strategy because wallet integrations differ in which call path
//! actually works; the priority orders here are the ones the reconciler
//! and executor walk.

pub mod local;
#[cfg(test)]
pub mod mock;

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use thiserror::Error;

use crate::chains::ChainTarget;
use crate::contracts::ContractCall;

/// Chain registration surfaces, in the order the reconciler tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterStrategy {
    /// Direct JSON-RPC request carrying the add-chain parameters
    RawRpc,
    /// The wallet-client abstraction's add-chain entry point
    WalletClient,
    /// Provider construction straight from the chain definition
    ProviderFallback,
}

impl RegisterStrategy {
    /// Priority order for registration attempts.
    pub const PRIORITY: [RegisterStrategy; 3] = [
        RegisterStrategy::RawRpc,
        RegisterStrategy::WalletClient,
        RegisterStrategy::ProviderFallback,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RegisterStrategy::RawRpc => "raw-rpc",
            RegisterStrategy::WalletClient => "wallet-client",
            RegisterStrategy::ProviderFallback => "provider-fallback",
        }
    }
}

/// Submission surfaces, in the order the executor tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStrategy {
    /// Locally signed transaction broadcast via `eth_sendRawTransaction`
    RawRpc,
    /// The wallet-client send path (wallet fills and signs)
    WalletClient,
    /// Contract write through a provider built fresh from chain config
    ProviderWrite,
}

impl SubmitStrategy {
    /// Priority order for submission attempts.
    pub const PRIORITY: [SubmitStrategy; 3] = [
        SubmitStrategy::RawRpc,
        SubmitStrategy::WalletClient,
        SubmitStrategy::ProviderWrite,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SubmitStrategy::RawRpc => "raw-rpc",
            SubmitStrategy::WalletClient => "wallet-client",
            SubmitStrategy::ProviderWrite => "provider-write",
        }
    }
}

/// Errors at the wallet boundary.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The wallet has no definition for this chain (EIP-3326 code 4902)
    #[error("Chain {0} is not recognized by the wallet")]
    UnrecognizedChain(u64),

    /// The user declined the request (EIP-1193 code 4001)
    #[error("The user rejected the request")]
    Rejected,

    /// This adapter does not serve the requested surface
    #[error("Not supported by this wallet")]
    Unsupported,

    /// Malformed input or session state
    #[error("{0}")]
    Invalid(String),

    /// Transport or node failure
    #[error("RPC error: {0}")]
    Rpc(String),
}

/// A confirmed transaction outcome.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: B256,
    /// Block the transaction was included in
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether the transaction succeeded on chain
    pub success: bool,
}

/// One connected wallet.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Connected account address.
    fn address(&self) -> Address;

    /// Chain the wallet is currently attached to.
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Ask the wallet to switch its active chain (EIP-3326).
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Ask the wallet to add a chain definition through one registration
    /// surface (EIP-3085).
    async fn register_chain(
        &self,
        target: &ChainTarget,
        strategy: RegisterStrategy,
    ) -> Result<(), WalletError>;

    /// Raw JSON-RPC request against the active chain.
    async fn raw_request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError>;

    /// Submit a contract call through one submission surface.
    async fn submit(&self, call: &ContractCall, strategy: SubmitStrategy)
        -> Result<B256, WalletError>;

    /// `eth_call` read against the active chain.
    async fn read(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError>;

    /// Receipt lookup; `Ok(None)` while the transaction is pending.
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, WalletError>;

    /// Tear down the session.
    async fn disconnect(&self);
}
