// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Chain registry: network definitions and per-chain DEX deployments.
//!
//! A [`ChainTarget`] carries everything needed to talk to a network and to
//! register it with a wallet that has never seen it (EIP-3085 parameter
//! shape). The built-in table covers the Avalanche networks Spindrift is
//! deployed on; additional chains can be merged in from a JSON file.

use std::collections::HashMap;
use std::path::Path;

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Avalanche C-Chain mainnet chain ID.
pub const AVALANCHE_CCHAIN: u64 = 43114;
/// Avalanche Fuji testnet chain ID.
pub const AVALANCHE_FUJI: u64 = 43113;

/// Errors raised while building or extending the chain registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read chain file: {0}")]
    Io(String),

    #[error("Failed to parse chain file: {0}")]
    Parse(String),

    #[error("Invalid RPC URL for chain {chain_id}: {reason}")]
    InvalidRpcUrl { chain_id: u64, reason: String },

    #[error("Chain {0} defines no RPC URLs")]
    NoRpcUrls(u64),
}

/// Native currency metadata for a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// A network the orchestration core can reconcile a wallet onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTarget {
    /// Chain ID (decimal)
    pub chain_id: u64,
    /// Network name for display and wallet prompts
    pub name: String,
    /// RPC endpoint URLs, in preference order
    pub rpc_urls: Vec<String>,
    /// Native currency shown by the wallet
    pub native_currency: NativeCurrency,
    /// Block explorer base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_explorer_url: Option<String>,
}

impl ChainTarget {
    /// Chain ID as the 0x-prefixed hex quantity wallets expect.
    pub fn hex_chain_id(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    /// Primary RPC endpoint, if any is configured.
    pub fn primary_rpc_url(&self) -> Option<&str> {
        self.rpc_urls.first().map(String::as_str)
    }

    /// Parameter object for a wallet add-chain request (EIP-3085).
    pub fn as_add_chain_params(&self) -> serde_json::Value {
        let explorers: Vec<&str> = self
            .block_explorer_url
            .as_deref()
            .into_iter()
            .collect();
        json!({
            "chainId": self.hex_chain_id(),
            "chainName": self.name,
            "rpcUrls": self.rpc_urls,
            "nativeCurrency": {
                "name": self.native_currency.name,
                "symbol": self.native_currency.symbol,
                "decimals": self.native_currency.decimals,
            },
            "blockExplorerUrls": explorers,
        })
    }

    /// Explorer URL for a transaction hash, when an explorer is configured.
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        self.block_explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if self.rpc_urls.is_empty() {
            return Err(RegistryError::NoRpcUrls(self.chain_id));
        }
        for raw in &self.rpc_urls {
            raw.parse::<url::Url>()
                .map_err(|e| RegistryError::InvalidRpcUrl {
                    chain_id: self.chain_id,
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

fn avax_currency() -> NativeCurrency {
    NativeCurrency {
        name: "Avalanche".to_string(),
        symbol: "AVAX".to_string(),
        decimals: 18,
    }
}

/// Avalanche C-Chain mainnet definition.
pub fn avalanche_cchain() -> ChainTarget {
    ChainTarget {
        chain_id: AVALANCHE_CCHAIN,
        name: "Avalanche C-Chain".to_string(),
        rpc_urls: vec!["https://api.avax.network/ext/bc/C/rpc".to_string()],
        native_currency: avax_currency(),
        block_explorer_url: Some("https://snowtrace.io".to_string()),
    }
}

/// Avalanche Fuji testnet definition.
pub fn avalanche_fuji() -> ChainTarget {
    ChainTarget {
        chain_id: AVALANCHE_FUJI,
        name: "Avalanche Fuji Testnet".to_string(),
        rpc_urls: vec!["https://api.avax-test.network/ext/bc/C/rpc".to_string()],
        native_currency: avax_currency(),
        block_explorer_url: Some("https://testnet.snowtrace.io".to_string()),
    }
}

/// Lookup table of known chains by chain ID.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: HashMap<u64, ChainTarget>,
}

impl ChainRegistry {
    /// Registry containing only the built-in Avalanche networks.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.insert(avalanche_cchain());
        registry.insert(avalanche_fuji());
        registry
    }

    /// Look up a chain definition.
    pub fn get(&self, chain_id: u64) -> Option<&ChainTarget> {
        self.chains.get(&chain_id)
    }

    /// Insert or replace a chain definition.
    pub fn insert(&mut self, target: ChainTarget) {
        self.chains.insert(target.chain_id, target);
    }

    /// Number of registered chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Merge chain definitions from a JSON array; later entries win.
    ///
    /// Every entry is validated (non-empty, parseable RPC URLs) before any
    /// entry is inserted, so a bad file leaves the registry untouched.
    pub fn merge_json(&mut self, raw: &str) -> Result<usize, RegistryError> {
        let targets: Vec<ChainTarget> =
            serde_json::from_str(raw).map_err(|e| RegistryError::Parse(e.to_string()))?;
        for target in &targets {
            target.validate()?;
        }
        let count = targets.len();
        for target in targets {
            self.insert(target);
        }
        Ok(count)
    }

    /// Merge chain definitions from a JSON file on disk.
    pub fn merge_json_file(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let raw = std::fs::read_to_string(path).map_err(|e| RegistryError::Io(e.to_string()))?;
        self.merge_json(&raw)
    }
}

/// Addresses of the Spindrift contracts on one chain.
#[derive(Debug, Clone)]
pub struct DexDeployment {
    /// Chain the deployment lives on
    pub chain_id: u64,
    /// Custody contract holding trading balances
    pub balance_manager: Address,
    /// Order entry contract
    pub router: Address,
    /// Market creation contract
    pub pool_factory: Address,
    /// Test-token faucet (test networks only)
    pub faucet: Option<Address>,
}

/// Spindrift deployment on Fuji.
pub fn fuji_deployment() -> DexDeployment {
    DexDeployment {
        chain_id: AVALANCHE_FUJI,
        balance_manager: address!("0x5b3e2f84d6bc09b1d34d4021af9f1f199b65f7ed"),
        router: address!("0x7a9c2de640f24a2bd5c1c9e3a58f4a6b9d830c11"),
        pool_factory: address!("0xa1b51345e0ca8f5c6ff2d4bd0e2a64993b7ea0cf"),
        faucet: Some(address!("0xf2c54e0a9ce1cd58b43f6f2c5cd6b88c2841d80a")),
    }
}

/// Spindrift deployment on the C-Chain.
pub fn cchain_deployment() -> DexDeployment {
    DexDeployment {
        chain_id: AVALANCHE_CCHAIN,
        balance_manager: address!("0x1dc8a7e5cf1d2ab2fc6e926ad8b7c1a0443b5a2e"),
        router: address!("0x95c0b6a3dd5e4128d9d0f92781be38c06d95a917"),
        pool_factory: address!("0x3ed0a5f7c7b612ffb28d5c1442abe36c1f79702d"),
        faucet: None,
    }
}
