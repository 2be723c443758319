//! Scripted endpoint and simulated clock shared by unit tests.

use crate::bundle::BundleDescriptor;
use crate::dispatch::Clock;
use crate::endpoint::{Endpoint, InclusionReceipt};
use crate::errors::Result;
use alloy::eips::Decodable2718;
use alloy::consensus::TxEnvelope;
use alloy::primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Clock whose time only moves when something sleeps or calls `advance`.
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(duration).unwrap();
    }

    /// Every duration passed to `sleep`, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

#[async_trait]
impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

/// Outcome of one `eth_sendRawTransactionSync` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncResponse {
    Receipt { block_number: u64 },
    NoReceipt,
    Error,
}

/// Number of calls made to each remote method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    pub chain_id: usize,
    pub gas_price: usize,
    pub priority_fee: usize,
    pub pending_nonce: usize,
    pub confirmed_nonce: usize,
    pub block_number: usize,
    pub send_sync: usize,
    pub send: usize,
    pub receipt: usize,
    pub bundle: usize,
}

struct MockState {
    chain_id: Option<u64>,
    gas_price: Option<u128>,
    priority_fee: Option<u128>,
    pending_nonce: Option<u64>,
    confirmed_nonce: Option<u64>,
    block_number: Option<u64>,
    sync_default: SyncResponse,
    sync_script: VecDeque<SyncResponse>,
    sync_delay: Duration,
    send_fails: bool,
    receipt_after: Option<u32>,
    receipt_errors: u32,
    receipt_block: u64,
    queries_since_send: u32,
    bundle_response: Option<String>,
    calls: CallLog,
    sent: Vec<Bytes>,
    bundles: Vec<BundleDescriptor>,
}

/// Endpoint answering from a script and recording every call.
///
/// Scalars left unset make the corresponding query fail. Every accepted
/// submission bumps the pending nonce.
pub struct MockEndpoint {
    name: String,
    clock: Option<Arc<MockClock>>,
    state: Mutex<MockState>,
}

impl MockEndpoint {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            clock: None,
            state: Mutex::new(MockState {
                chain_id: Some(8453),
                gas_price: None,
                priority_fee: None,
                pending_nonce: None,
                confirmed_nonce: None,
                block_number: None,
                sync_default: SyncResponse::Receipt { block_number: 1 },
                sync_script: VecDeque::new(),
                sync_delay: Duration::ZERO,
                send_fails: false,
                receipt_after: Some(0),
                receipt_errors: 0,
                receipt_block: 1,
                queries_since_send: 0,
                bundle_response: Some("0xbundle".to_string()),
                calls: CallLog::default(),
                sent: Vec::new(),
                bundles: Vec::new(),
            }),
        }
    }

    fn update(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    /// Advance this clock by the sync delay during blocking calls.
    pub fn with_clock(mut self, clock: Arc<MockClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_fees(self, gas_price: u128, priority_fee: u128) -> Self {
        self.update(|s| {
            s.gas_price = Some(gas_price);
            s.priority_fee = Some(priority_fee);
        })
    }

    pub fn with_gas_price_only(self, gas_price: u128) -> Self {
        self.update(|s| s.gas_price = Some(gas_price))
    }

    pub fn with_pending_nonce(self, nonce: u64) -> Self {
        self.update(|s| s.pending_nonce = Some(nonce))
    }

    pub fn with_confirmed_nonce(self, nonce: u64) -> Self {
        self.update(|s| s.confirmed_nonce = Some(nonce))
    }

    pub fn with_block_number(self, block: u64) -> Self {
        self.update(|s| s.block_number = Some(block))
    }

    pub fn with_sync_response(self, response: SyncResponse) -> Self {
        self.update(|s| s.sync_default = response)
    }

    /// Responses consumed one per call before falling back to the default.
    pub fn with_sync_script(self, script: Vec<SyncResponse>) -> Self {
        self.update(|s| s.sync_script = script.into())
    }

    pub fn with_sync_delay(self, delay: Duration) -> Self {
        self.update(|s| s.sync_delay = delay)
    }

    pub fn failing_send(self) -> Self {
        self.update(|s| s.send_fails = true)
    }

    /// The receipt shows up after `n` absent answers.
    pub fn with_receipt_after(self, n: u32) -> Self {
        self.update(|s| s.receipt_after = Some(n))
    }

    pub fn with_receipt_never(self) -> Self {
        self.update(|s| s.receipt_after = None)
    }

    /// The first `n` receipt queries after each send return an error.
    pub fn with_receipt_errors(self, n: u32) -> Self {
        self.update(|s| s.receipt_errors = n)
    }

    pub fn with_receipt_block(self, block: u64) -> Self {
        self.update(|s| s.receipt_block = block)
    }

    pub fn failing_bundle(self) -> Self {
        self.update(|s| s.bundle_response = None)
    }

    pub fn calls(&self) -> CallLog {
        self.state.lock().unwrap().calls.clone()
    }

    /// Raw bytes of every submitted transaction, in order.
    pub fn sent_transactions(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn bundles(&self) -> Vec<BundleDescriptor> {
        self.state.lock().unwrap().bundles.clone()
    }

    fn accept(state: &mut MockState, raw: Bytes) {
        state.sent.push(raw);
        state.queries_since_send = 0;
        if let Some(nonce) = state.pending_nonce.as_mut() {
            *nonce += 1;
        }
    }
}

fn missing(what: &str) -> crate::errors::BenchError {
    anyhow::anyhow!("mock endpoint has no {}", what).into()
}

fn tx_hash_of(raw: &[u8]) -> TxHash {
    TxEnvelope::decode_2718(&mut &raw[..])
        .map(|tx| *tx.tx_hash())
        .unwrap_or_default()
}

#[async_trait]
impl Endpoint for MockEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chain_id(&self) -> Result<u64> {
        let mut s = self.state.lock().unwrap();
        s.calls.chain_id += 1;
        s.chain_id.ok_or_else(|| missing("chain id"))
    }

    async fn gas_price(&self) -> Result<u128> {
        let mut s = self.state.lock().unwrap();
        s.calls.gas_price += 1;
        s.gas_price.ok_or_else(|| missing("gas price"))
    }

    async fn max_priority_fee(&self) -> Result<u128> {
        let mut s = self.state.lock().unwrap();
        s.calls.priority_fee += 1;
        s.priority_fee.ok_or_else(|| missing("priority fee"))
    }

    async fn pending_nonce(&self, _account: Address) -> Result<u64> {
        let mut s = self.state.lock().unwrap();
        s.calls.pending_nonce += 1;
        s.pending_nonce.ok_or_else(|| missing("pending nonce"))
    }

    async fn confirmed_nonce(&self, _account: Address) -> Result<u64> {
        let mut s = self.state.lock().unwrap();
        s.calls.confirmed_nonce += 1;
        s.confirmed_nonce.ok_or_else(|| missing("confirmed nonce"))
    }

    async fn block_number(&self) -> Result<u64> {
        let mut s = self.state.lock().unwrap();
        s.calls.block_number += 1;
        s.block_number.ok_or_else(|| missing("block number"))
    }

    async fn send_raw_transaction_sync(&self, raw_tx: &str) -> Result<Option<InclusionReceipt>> {
        let raw: Bytes = raw_tx.parse().map_err(|_| missing("valid hex payload"))?;
        let (response, delay) = {
            let mut s = self.state.lock().unwrap();
            s.calls.send_sync += 1;
            let response = s.sync_script.pop_front().unwrap_or(s.sync_default);
            (response, s.sync_delay)
        };

        if let Some(clock) = &self.clock {
            clock.advance(delay);
        }

        let mut s = self.state.lock().unwrap();
        match response {
            SyncResponse::Receipt { block_number } => {
                let tx_hash = tx_hash_of(&raw);
                Self::accept(&mut s, raw);
                Ok(Some(InclusionReceipt {
                    tx_hash,
                    block_number,
                }))
            }
            SyncResponse::NoReceipt => Ok(None),
            SyncResponse::Error => Err(missing("sync submission support")),
        }
    }

    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<TxHash> {
        let mut s = self.state.lock().unwrap();
        s.calls.send += 1;
        if s.send_fails {
            return Err(missing("broadcast support"));
        }
        Self::accept(&mut s, Bytes::copy_from_slice(raw_tx));
        Ok(tx_hash_of(raw_tx))
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<InclusionReceipt>> {
        let mut s = self.state.lock().unwrap();
        s.calls.receipt += 1;
        s.queries_since_send += 1;

        if s.queries_since_send <= s.receipt_errors {
            return Err(missing("receipt index"));
        }

        match s.receipt_after {
            Some(n) if s.queries_since_send > n => Ok(Some(InclusionReceipt {
                tx_hash,
                block_number: s.receipt_block,
            })),
            _ => Ok(None),
        }
    }

    async fn send_bundle(&self, bundle: &BundleDescriptor) -> Result<String> {
        let mut s = self.state.lock().unwrap();
        s.calls.bundle += 1;
        s.bundles.push(bundle.clone());
        s.bundle_response.clone().ok_or_else(|| missing("bundle support"))
    }
}
