// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Scripted wallet adapter for tests.
//!
//! Each surface pops its next scripted outcome from a queue, falling back
//! to a permissive default (switch succeeds, registration succeeds,
//! submission returns a fresh hash, reads return a zero word, receipts
//! stay pending). Every call is recorded for assertions, and receipt
//! polls capture `tokio::time::Instant` so paused-clock tests can check
//! the delay schedule exactly.

use std::collections::VecDeque;
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use tokio::time::Instant;

use super::{RegisterStrategy, SubmitStrategy, TxReceipt, WalletAdapter, WalletError};
use crate::chains::ChainTarget;
use crate::contracts::ContractCall;

/// A recorded submission.
#[derive(Debug, Clone)]
pub struct SubmittedCall {
    pub function: &'static str,
    pub to: Address,
    pub data: Bytes,
    pub strategy: SubmitStrategy,
}

#[derive(Debug, Default)]
struct MockState {
    chain_id: u64,
    disconnected: bool,
    hash_counter: u64,

    switch_outcomes: VecDeque<Result<(), WalletError>>,
    register_outcomes: VecDeque<Result<(), WalletError>>,
    submit_outcomes: VecDeque<Result<B256, WalletError>>,
    read_outcomes: VecDeque<Result<Bytes, WalletError>>,
    receipt_outcomes: VecDeque<Result<Option<TxReceipt>, WalletError>>,

    switches: Vec<u64>,
    registrations: Vec<(u64, RegisterStrategy)>,
    submissions: Vec<SubmittedCall>,
    reads: Vec<(Address, Bytes)>,
    poll_instants: Vec<Instant>,
}

/// Scripted [`WalletAdapter`].
pub struct MockWallet {
    address: Address,
    state: Mutex<MockState>,
}

impl MockWallet {
    pub fn new(chain_id: u64) -> Self {
        Self {
            address: Address::repeat_byte(0x11),
            state: Mutex::new(MockState {
                chain_id,
                ..MockState::default()
            }),
        }
    }

    pub fn queue_switch(&self, outcome: Result<(), WalletError>) {
        self.state.lock().unwrap().switch_outcomes.push_back(outcome);
    }

    pub fn queue_register(&self, outcome: Result<(), WalletError>) {
        self.state.lock().unwrap().register_outcomes.push_back(outcome);
    }

    pub fn queue_submit(&self, outcome: Result<B256, WalletError>) {
        self.state.lock().unwrap().submit_outcomes.push_back(outcome);
    }

    pub fn queue_read(&self, outcome: Result<Bytes, WalletError>) {
        self.state.lock().unwrap().read_outcomes.push_back(outcome);
    }

    pub fn queue_receipt(&self, outcome: Result<Option<TxReceipt>, WalletError>) {
        self.state.lock().unwrap().receipt_outcomes.push_back(outcome);
    }

    pub fn switches(&self) -> Vec<u64> {
        self.state.lock().unwrap().switches.clone()
    }

    pub fn registrations(&self) -> Vec<(u64, RegisterStrategy)> {
        self.state.lock().unwrap().registrations.clone()
    }

    pub fn submissions(&self) -> Vec<SubmittedCall> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn reads(&self) -> Vec<(Address, Bytes)> {
        self.state.lock().unwrap().reads.clone()
    }

    pub fn poll_instants(&self) -> Vec<Instant> {
        self.state.lock().unwrap().poll_instants.clone()
    }

    pub fn is_disconnected(&self) -> bool {
        self.state.lock().unwrap().disconnected
    }

    /// A confirmed, successful receipt for scripting.
    pub fn success_receipt(tx_hash: B256) -> TxReceipt {
        TxReceipt {
            tx_hash,
            block_number: 100,
            gas_used: 21_000,
            success: true,
        }
    }

    /// A confirmed but reverted receipt for scripting.
    pub fn reverted_receipt(tx_hash: B256) -> TxReceipt {
        TxReceipt {
            tx_hash,
            block_number: 100,
            gas_used: 21_000,
            success: false,
        }
    }

    fn nth_hash(n: u64) -> B256 {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&n.to_be_bytes());
        B256::new(bytes)
    }
}

#[async_trait]
impl WalletAdapter for MockWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.state.lock().unwrap().chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let mut state = self.state.lock().unwrap();
        state.switches.push(chain_id);
        let outcome = state.switch_outcomes.pop_front().unwrap_or(Ok(()));
        if outcome.is_ok() {
            state.chain_id = chain_id;
        }
        outcome
    }

    async fn register_chain(
        &self,
        target: &ChainTarget,
        strategy: RegisterStrategy,
    ) -> Result<(), WalletError> {
        let mut state = self.state.lock().unwrap();
        state.registrations.push((target.chain_id, strategy));
        state.register_outcomes.pop_front().unwrap_or(Ok(()))
    }

    async fn raw_request(
        &self,
        _method: &str,
        _params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError> {
        Ok(serde_json::Value::Null)
    }

    async fn submit(
        &self,
        call: &ContractCall,
        strategy: SubmitStrategy,
    ) -> Result<B256, WalletError> {
        let mut state = self.state.lock().unwrap();
        state.submissions.push(SubmittedCall {
            function: call.function,
            to: call.to,
            data: call.data.clone(),
            strategy,
        });
        match state.submit_outcomes.pop_front() {
            Some(outcome) => outcome,
            None => {
                state.hash_counter += 1;
                Ok(Self::nth_hash(state.hash_counter))
            }
        }
    }

    async fn read(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError> {
        let mut state = self.state.lock().unwrap();
        state.reads.push((to, data));
        state
            .read_outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(Bytes::from(vec![0u8; 32])))
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, WalletError> {
        let mut state = self.state.lock().unwrap();
        state.poll_instants.push(Instant::now());
        // Outcomes are scripted by position; the hash is rewritten so
        // callers always see their own.
        let outcome = state.receipt_outcomes.pop_front().unwrap_or(Ok(None));
        outcome.map(|maybe| {
            maybe.map(|mut receipt| {
                receipt.tx_hash = tx_hash;
                receipt
            })
        })
    }

    async fn disconnect(&self) {
        self.state.lock().unwrap().disconnected = true;
    }
}
