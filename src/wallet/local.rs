// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Local signer wallet adapter.
//!
//! A headless wallet backed by an in-process private key and alloy HTTP
//! providers, used by bots and integration harnesses. Each known chain
//! holds a read provider and a signing provider; switching chains repoints
//! the active pair, registering a chain builds a new pair from the chain
//! definition.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy::{
    eips::eip2718::Encodable2718,
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, B256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RegisterStrategy, SubmitStrategy, TxReceipt, WalletAdapter, WalletError};
use crate::chains::ChainTarget;
use crate::contracts::ContractCall;

/// HTTP provider with the default fillers (reads, receipts, raw sends).
type ReadProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// HTTP provider with signing on top of the default fillers.
type SignerProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Providers for one known chain.
struct ChainSession {
    target: ChainTarget,
    read: ReadProvider,
    signing: SignerProvider,
}

/// Wallet adapter over an in-process private key.
pub struct LocalSignerWallet {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
    active: RwLock<u64>,
    chains: RwLock<HashMap<u64, Arc<ChainSession>>>,
    connected: AtomicBool,
}

impl std::fmt::Debug for LocalSignerWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSignerWallet")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}

impl LocalSignerWallet {
    /// Create a wallet with the given known chains, attached to
    /// `active_chain_id`.
    pub fn new(
        signer: PrivateKeySigner,
        known_chains: Vec<ChainTarget>,
        active_chain_id: u64,
    ) -> Result<Self, WalletError> {
        let wallet = EthereumWallet::from(signer.clone());
        let mut chains = HashMap::new();
        for target in known_chains {
            let session = Self::build_session(target, &wallet)?;
            chains.insert(session.target.chain_id, Arc::new(session));
        }
        if !chains.contains_key(&active_chain_id) {
            return Err(WalletError::UnrecognizedChain(active_chain_id));
        }
        Ok(Self {
            signer,
            wallet,
            active: RwLock::new(active_chain_id),
            chains: RwLock::new(chains),
            connected: AtomicBool::new(true),
        })
    }

    /// Create a wallet from a hex-encoded private key (with or without
    /// the 0x prefix).
    pub fn from_hex_key(
        private_key_hex: &str,
        known_chains: Vec<ChainTarget>,
        active_chain_id: u64,
    ) -> Result<Self, WalletError> {
        let key_bytes = alloy::hex::decode(private_key_hex.trim_start_matches("0x"))
            .map_err(|e| WalletError::Invalid(format!("Invalid private key: {e}")))?;
        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| WalletError::Invalid(format!("Invalid private key: {e}")))?;
        Self::new(signer, known_chains, active_chain_id)
    }

    fn build_session(
        target: ChainTarget,
        wallet: &EthereumWallet,
    ) -> Result<ChainSession, WalletError> {
        let url = primary_url(&target)?;
        let read = ProviderBuilder::new().connect_http(url.clone());
        let signing = ProviderBuilder::new()
            .wallet(wallet.clone())
            .connect_http(url);
        Ok(ChainSession {
            target,
            read,
            signing,
        })
    }

    fn ensure_connected(&self) -> Result<(), WalletError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(WalletError::Invalid("wallet is disconnected".to_string()))
        }
    }

    async fn active_session(&self) -> Result<Arc<ChainSession>, WalletError> {
        self.ensure_connected()?;
        let chain_id = *self.active.read().await;
        let chains = self.chains.read().await;
        chains
            .get(&chain_id)
            .cloned()
            .ok_or(WalletError::UnrecognizedChain(chain_id))
    }

    /// Sign locally and broadcast via `eth_sendRawTransaction`.
    async fn submit_raw(&self, call: &ContractCall) -> Result<B256, WalletError> {
        let session = self.active_session().await?;
        let from = self.signer.address();

        let (max_fee, priority_fee) = gas_prices(&session.read).await?;
        let nonce = session
            .read
            .get_transaction_count(from)
            .await
            .map_err(|e| WalletError::Rpc(format!("Failed to get nonce: {e}")))?;

        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_to(call.to)
            .with_input(call.data.clone())
            .with_nonce(nonce)
            .with_chain_id(session.target.chain_id)
            .with_max_fee_per_gas(max_fee)
            .with_max_priority_fee_per_gas(priority_fee);

        let gas_limit = session
            .read
            .estimate_gas(tx.clone())
            .await
            .map_err(|e| WalletError::Rpc(format!("Gas estimation failed: {e}")))?;
        tx.set_gas_limit(gas_limit);

        let envelope = tx
            .build(&self.wallet)
            .await
            .map_err(|e| WalletError::Rpc(format!("Failed to sign: {e}")))?;

        let pending = session
            .read
            .send_raw_transaction(&envelope.encoded_2718())
            .await
            .map_err(|e| WalletError::Rpc(format!("Failed to broadcast: {e}")))?;

        Ok(*pending.tx_hash())
    }

    /// Send through the cached signing provider; fillers handle nonce,
    /// gas, and signing.
    async fn submit_via_wallet_provider(&self, call: &ContractCall) -> Result<B256, WalletError> {
        let session = self.active_session().await?;
        let (max_fee, priority_fee) = gas_prices(&session.read).await?;

        let tx = TransactionRequest::default()
            .to(call.to)
            .input(call.data.clone().into())
            .max_fee_per_gas(max_fee)
            .max_priority_fee_per_gas(priority_fee);

        let pending = session
            .signing
            .send_transaction(tx)
            .await
            .map_err(|e| WalletError::Rpc(format!("Failed to send: {e}")))?;

        Ok(*pending.tx_hash())
    }

    /// Send through a provider built fresh from the chain definition,
    /// walking the RPC URL list in order.
    async fn submit_via_fresh_provider(&self, call: &ContractCall) -> Result<B256, WalletError> {
        let session = self.active_session().await?;

        let mut last_error = WalletError::Invalid(format!(
            "chain {} has no RPC URLs",
            session.target.chain_id
        ));
        for raw in &session.target.rpc_urls {
            let url: url::Url = match raw.parse() {
                Ok(url) => url,
                Err(e) => {
                    last_error = WalletError::Invalid(format!("Invalid RPC URL: {e}"));
                    continue;
                }
            };
            let provider = ProviderBuilder::new()
                .wallet(self.wallet.clone())
                .connect_http(url);

            let (max_fee, priority_fee) = match gas_prices(&provider).await {
                Ok(fees) => fees,
                Err(e) => {
                    last_error = e;
                    continue;
                }
            };

            let tx = TransactionRequest::default()
                .to(call.to)
                .input(call.data.clone().into())
                .max_fee_per_gas(max_fee)
                .max_priority_fee_per_gas(priority_fee);

            match provider.send_transaction(tx).await {
                Ok(pending) => return Ok(*pending.tx_hash()),
                Err(e) => {
                    tracing::warn!(url = %raw, error = %e, "fresh provider send failed");
                    last_error = WalletError::Rpc(format!("Failed to send: {e}"));
                }
            }
        }
        Err(last_error)
    }
}

#[async_trait]
impl WalletAdapter for LocalSignerWallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.ensure_connected()?;
        Ok(*self.active.read().await)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.ensure_connected()?;
        if !self.chains.read().await.contains_key(&chain_id) {
            return Err(WalletError::UnrecognizedChain(chain_id));
        }
        *self.active.write().await = chain_id;
        tracing::info!(chain_id, "switched active chain");
        Ok(())
    }

    async fn register_chain(
        &self,
        target: &ChainTarget,
        strategy: RegisterStrategy,
    ) -> Result<(), WalletError> {
        self.ensure_connected()?;
        match strategy {
            // There is no injected wallet client behind a local signer.
            RegisterStrategy::WalletClient => Err(WalletError::Unsupported),
            RegisterStrategy::RawRpc => {
                let session = Self::build_session(target.clone(), &self.wallet)?;
                // Probe the endpoint: its reported chain id must match the
                // definition before the chain is accepted.
                let reported = session
                    .read
                    .get_chain_id()
                    .await
                    .map_err(|e| WalletError::Rpc(format!("Chain probe failed: {e}")))?;
                if reported != target.chain_id {
                    return Err(WalletError::Invalid(format!(
                        "RPC reports chain {reported}, expected {}",
                        target.chain_id
                    )));
                }
                self.chains
                    .write()
                    .await
                    .insert(target.chain_id, Arc::new(session));
                tracing::info!(chain_id = target.chain_id, "registered chain (probed)");
                Ok(())
            }
            RegisterStrategy::ProviderFallback => {
                let session = Self::build_session(target.clone(), &self.wallet)?;
                self.chains
                    .write()
                    .await
                    .insert(target.chain_id, Arc::new(session));
                tracing::info!(chain_id = target.chain_id, "registered chain");
                Ok(())
            }
        }
    }

    async fn raw_request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError> {
        let session = self.active_session().await?;
        session
            .read
            .raw_request::<serde_json::Value, serde_json::Value>(method.to_string().into(), params)
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))
    }

    async fn submit(
        &self,
        call: &ContractCall,
        strategy: SubmitStrategy,
    ) -> Result<B256, WalletError> {
        self.ensure_connected()?;
        match strategy {
            SubmitStrategy::RawRpc => self.submit_raw(call).await,
            SubmitStrategy::WalletClient => self.submit_via_wallet_provider(call).await,
            SubmitStrategy::ProviderWrite => self.submit_via_fresh_provider(call).await,
        }
    }

    async fn read(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError> {
        let session = self.active_session().await?;
        let tx = TransactionRequest::default().to(to).input(data.into());
        session
            .read
            .call(tx)
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, WalletError> {
        let session = self.active_session().await?;
        let receipt = session
            .read
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| WalletError::Rpc(format!("Failed to get receipt: {e}")))?;

        Ok(receipt.map(|r| TxReceipt {
            tx_hash,
            block_number: r.block_number.unwrap_or(0),
            gas_used: r.gas_used as u64,
            success: r.status(),
        }))
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.chains.write().await.clear();
        tracing::info!(address = %self.signer.address(), "wallet disconnected");
    }
}

fn primary_url(target: &ChainTarget) -> Result<url::Url, WalletError> {
    let raw = target.primary_rpc_url().ok_or_else(|| {
        WalletError::Invalid(format!("chain {} has no RPC URLs", target.chain_id))
    })?;
    raw.parse()
        .map_err(|e: url::ParseError| WalletError::Invalid(format!("Invalid RPC URL: {e}")))
}

/// Current gas prices: doubled base fee plus a fixed priority tip.
async fn gas_prices<P: Provider>(provider: &P) -> Result<(u128, u128), WalletError> {
    let block = provider
        .get_block_by_number(alloy::eips::BlockNumberOrTag::Latest)
        .await
        .map_err(|e| WalletError::Rpc(format!("Failed to get block: {e}")))?
        .ok_or_else(|| WalletError::Rpc("No latest block".to_string()))?;

    let base_fee: u128 = block
        .header
        .base_fee_per_gas
        .map(|f| f as u128)
        .unwrap_or(25_000_000_000u128); // 25 gwei default

    // Standard priority fee for Avalanche
    let priority_fee: u128 = 1_500_000_000; // 1.5 gwei

    Ok((max_fee_from_base(base_fee, priority_fee), priority_fee))
}

/// Max fee = 2 * base_fee + priority_fee (allows for base fee increase).
fn max_fee_from_base(base_fee: u128, priority_fee: u128) -> u128 {
    base_fee.saturating_mul(2).saturating_add(priority_fee)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{avalanche_cchain, avalanche_fuji, AVALANCHE_CCHAIN, AVALANCHE_FUJI};

    fn wallet() -> LocalSignerWallet {
        LocalSignerWallet::new(
            PrivateKeySigner::random(),
            vec![avalanche_fuji()],
            AVALANCHE_FUJI,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_new_attaches_to_active_chain() {
        let w = wallet();
        assert_eq!(w.chain_id().await.unwrap(), AVALANCHE_FUJI);
        assert_eq!(w.address(), w.signer.address());
    }

    #[test]
    fn test_new_rejects_unknown_active_chain() {
        let err = LocalSignerWallet::new(
            PrivateKeySigner::random(),
            vec![avalanche_fuji()],
            AVALANCHE_CCHAIN,
        )
        .unwrap_err();
        assert!(matches!(err, WalletError::UnrecognizedChain(AVALANCHE_CCHAIN)));
    }

    #[tokio::test]
    async fn test_switch_to_unknown_chain_is_unrecognized() {
        let w = wallet();
        let err = w.switch_chain(AVALANCHE_CCHAIN).await.unwrap_err();
        assert!(matches!(err, WalletError::UnrecognizedChain(AVALANCHE_CCHAIN)));
        // Still on the original chain
        assert_eq!(w.chain_id().await.unwrap(), AVALANCHE_FUJI);
    }

    #[tokio::test]
    async fn test_register_then_switch() {
        let w = wallet();
        w.register_chain(&avalanche_cchain(), RegisterStrategy::ProviderFallback)
            .await
            .unwrap();
        w.switch_chain(AVALANCHE_CCHAIN).await.unwrap();
        assert_eq!(w.chain_id().await.unwrap(), AVALANCHE_CCHAIN);
    }

    #[tokio::test]
    async fn test_wallet_client_registration_is_unsupported() {
        let w = wallet();
        let err = w
            .register_chain(&avalanche_cchain(), RegisterStrategy::WalletClient)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Unsupported));
    }

    #[tokio::test]
    async fn test_disconnect_closes_the_session() {
        let w = wallet();
        w.disconnect().await;
        assert!(matches!(
            w.chain_id().await.unwrap_err(),
            WalletError::Invalid(_)
        ));
        assert!(matches!(
            w.switch_chain(AVALANCHE_FUJI).await.unwrap_err(),
            WalletError::Invalid(_)
        ));
    }

    #[test]
    fn test_from_hex_key() {
        let chains = vec![avalanche_fuji()];
        let key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
        let w = LocalSignerWallet::from_hex_key(key, chains.clone(), AVALANCHE_FUJI).unwrap();
        // Prefix-less form yields the same account
        let w2 = LocalSignerWallet::from_hex_key(&key[2..], chains.clone(), AVALANCHE_FUJI).unwrap();
        assert_eq!(w.address(), w2.address());

        assert!(LocalSignerWallet::from_hex_key("nothex", chains, AVALANCHE_FUJI).is_err());
    }

    #[test]
    fn test_max_fee_from_base() {
        // 25 gwei base, 1.5 gwei tip -> 51.5 gwei ceiling
        assert_eq!(
            max_fee_from_base(25_000_000_000, 1_500_000_000),
            51_500_000_000
        );
        assert_eq!(max_fee_from_base(u128::MAX, 1), u128::MAX);
    }
}
