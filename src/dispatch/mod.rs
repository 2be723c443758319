//! Submission of signed transactions and timing of their inclusion.
//!
//! Two confirmation protocols are supported:
//!
//! - **Synchronous**: one blocking `eth_sendRawTransactionSync` call that
//!   returns once the transaction is included. There is no retry; a missing
//!   receipt is a hard failure.
//! - **Asynchronous**: a plain broadcast followed by receipt polling at a
//!   constant interval, capped at [`MAX_POLL_ATTEMPTS`] queries.
//!
//! `sent_at` is taken immediately before the submission call and the
//! confirmation timestamp the moment the receipt is observed.

pub mod clock;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use state::DispatchState;

use crate::endpoint::Endpoint;
use crate::errors::DispatchError;
use crate::transaction::SignedTransaction;
use alloy::primitives::TxHash;
use chrono::{DateTime, Utc};
use clock::elapsed_between;
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of receipt queries in asynchronous mode.
pub const MAX_POLL_ATTEMPTS: u32 = 1000;

/// Default receipt polling interval.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(50);

/// How a transaction is submitted and confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Submit-and-confirm in one blocking call.
    Sync,
    /// Broadcast, then poll for the receipt every `polling_interval`.
    Async { polling_interval: Duration },
}

impl DispatchMode {
    pub fn is_sync(&self) -> bool {
        matches!(self, DispatchMode::Sync)
    }

    fn polling_interval(&self) -> Duration {
        match self {
            DispatchMode::Sync => Duration::ZERO,
            DispatchMode::Async { polling_interval } => *polling_interval,
        }
    }
}

impl Default for DispatchMode {
    fn default() -> Self {
        DispatchMode::Async {
            polling_interval: DEFAULT_POLLING_INTERVAL,
        }
    }
}

/// Timing record of one dispatch.
///
/// The all-zero value (`InclusionStats::default()`) stands in for a failed
/// dispatch in a campaign's result sequence; it is not an observation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InclusionStats {
    pub sent_at: DateTime<Utc>,
    pub tx_hash: TxHash,
    pub included_in_block: u64,
    pub inclusion_delay: Duration,
}

impl InclusionStats {
    /// Record for a transaction sent at `sent_at` and seen included in
    /// `block_number` at `confirmed_at`.
    pub fn confirmed(
        tx_hash: TxHash,
        block_number: u64,
        sent_at: DateTime<Utc>,
        confirmed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sent_at,
            tx_hash,
            included_in_block: block_number,
            inclusion_delay: elapsed_between(sent_at, confirmed_at),
        }
    }

    /// Whether this is the placeholder of a failed dispatch.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Submits signed transactions and times their inclusion.
#[derive(Clone)]
pub struct Dispatcher {
    clock: Arc<dyn Clock>,
    max_poll_attempts: u32,
}

impl Dispatcher {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            max_poll_attempts: MAX_POLL_ATTEMPTS,
        }
    }

    /// Override the receipt polling cap.
    pub fn with_max_poll_attempts(mut self, max_poll_attempts: u32) -> Self {
        self.max_poll_attempts = max_poll_attempts;
        self
    }

    /// Submit `tx` to `endpoint` and wait for its inclusion.
    ///
    /// Synchronous dispatch never polls and asynchronous dispatch never uses
    /// the blocking call. On failure no partial record is returned.
    pub async fn dispatch(
        &self,
        endpoint: &dyn Endpoint,
        tx: &SignedTransaction,
        mode: DispatchMode,
    ) -> Result<InclusionStats, DispatchError> {
        let mut state = DispatchState::Built;

        loop {
            state = match state {
                DispatchState::Confirmed {
                    sent_at,
                    block_number,
                    confirmed_at,
                } => {
                    let stats = InclusionStats::confirmed(tx.hash(), block_number, sent_at, confirmed_at);

                    tracing::debug!(
                        endpoint = endpoint.name(),
                        tx_hash = %stats.tx_hash,
                        block = stats.included_in_block,
                        inclusion_delay_ms = stats.inclusion_delay.as_millis() as u64,
                        "Transaction confirmed"
                    );

                    return Ok(stats);
                }
                DispatchState::Exhausted { attempts } => {
                    tracing::warn!(
                        endpoint = endpoint.name(),
                        tx_hash = %tx.hash(),
                        attempts = attempts,
                        "Receipt polling exhausted"
                    );

                    return Err(DispatchError::ReceiptTimeout {
                        tx_hash: tx.hash().to_string(),
                        attempts,
                    });
                }
                in_flight => self.advance(in_flight, endpoint, tx, mode).await?,
            };
        }
    }

    /// Perform one transition of the dispatch state machine.
    async fn advance(
        &self,
        state: DispatchState,
        endpoint: &dyn Endpoint,
        tx: &SignedTransaction,
        mode: DispatchMode,
    ) -> Result<DispatchState, DispatchError> {
        debug_assert!(!state.is_terminal());

        let next = match state {
            DispatchState::Built if mode.is_sync() => self.submit_sync(endpoint, tx).await?,
            DispatchState::Built => self.submit(endpoint, tx).await?,
            DispatchState::Submitted { sent_at } => DispatchState::Pending {
                sent_at,
                attempts: 0,
            },
            DispatchState::Pending { attempts, .. } if attempts >= self.max_poll_attempts => {
                DispatchState::Exhausted { attempts }
            }
            DispatchState::Pending { sent_at, attempts } => {
                self.poll_once(endpoint, tx, sent_at, attempts, mode.polling_interval())
                    .await
            }
            terminal => terminal,
        };

        tracing::trace!(
            tx_hash = %tx.hash(),
            from = state.label(),
            to = next.label(),
            "Dispatch state transition"
        );

        Ok(next)
    }

    async fn submit_sync(
        &self,
        endpoint: &dyn Endpoint,
        tx: &SignedTransaction,
    ) -> Result<DispatchState, DispatchError> {
        let raw_tx = tx.to_hex();

        let sent_at = self.clock.now();
        let receipt = endpoint
            .send_raw_transaction_sync(&raw_tx)
            .await
            .map_err(|e| DispatchError::SyncSubmission {
                tx_hash: tx.hash().to_string(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| DispatchError::SyncSubmission {
                tx_hash: tx.hash().to_string(),
                reason: "receipt not found".to_string(),
            })?;
        let confirmed_at = self.clock.now();

        tracing::info!(
            endpoint = endpoint.name(),
            tx_hash = %tx.hash(),
            "Transaction sent sync"
        );

        Ok(DispatchState::Confirmed {
            sent_at,
            block_number: receipt.block_number,
            confirmed_at,
        })
    }

    async fn submit(
        &self,
        endpoint: &dyn Endpoint,
        tx: &SignedTransaction,
    ) -> Result<DispatchState, DispatchError> {
        let sent_at = self.clock.now();
        endpoint
            .send_raw_transaction(tx.raw())
            .await
            .map_err(|e| DispatchError::Submission {
                tx_hash: tx.hash().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            endpoint = endpoint.name(),
            tx_hash = %tx.hash(),
            "Transaction sent async"
        );

        Ok(DispatchState::Submitted { sent_at })
    }

    /// One receipt query. Lookup errors are treated like an absent receipt.
    async fn poll_once(
        &self,
        endpoint: &dyn Endpoint,
        tx: &SignedTransaction,
        sent_at: DateTime<Utc>,
        attempts: u32,
        polling_interval: Duration,
    ) -> DispatchState {
        match endpoint.transaction_receipt(tx.hash()).await {
            Ok(Some(receipt)) => DispatchState::Confirmed {
                sent_at,
                block_number: receipt.block_number,
                confirmed_at: self.clock.now(),
            },
            Ok(None) => {
                self.clock.sleep(polling_interval).await;
                DispatchState::Pending {
                    sent_at,
                    attempts: attempts + 1,
                }
            }
            Err(e) => {
                tracing::debug!(
                    endpoint = endpoint.name(),
                    tx_hash = %tx.hash(),
                    error = %e,
                    "Receipt lookup failed"
                );
                self.clock.sleep(polling_interval).await;
                DispatchState::Pending {
                    sent_at,
                    attempts: attempts + 1,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockClock, MockEndpoint, SyncResponse};
    use crate::transaction::{FeeQuote, TransactionBuilder};
    use alloy::primitives::Address;
    use alloy::signers::local::PrivateKeySigner;

    fn signed_tx(nonce: u64) -> SignedTransaction {
        let builder =
            TransactionBuilder::new(8453, PrivateKeySigner::random(), Address::repeat_byte(0x11));
        builder
            .sign(
                nonce,
                FeeQuote {
                    max_fee_per_gas: 100,
                    max_priority_fee_per_gas: 2,
                },
            )
            .unwrap()
    }

    fn async_mode(ms: u64) -> DispatchMode {
        DispatchMode::Async {
            polling_interval: Duration::from_millis(ms),
        }
    }

    #[tokio::test]
    async fn test_sync_dispatch_times_blocking_call() {
        let clock = Arc::new(MockClock::new());
        let endpoint = MockEndpoint::new("fast")
            .with_clock(clock.clone())
            .with_sync_response(SyncResponse::Receipt { block_number: 42 })
            .with_sync_delay(Duration::from_millis(50));
        let dispatcher = Dispatcher::new(clock.clone());
        let tx = signed_tx(5);
        let started = clock.now();

        let stats = dispatcher.dispatch(&endpoint, &tx, DispatchMode::Sync).await.unwrap();

        assert_eq!(stats.sent_at, started);
        assert_eq!(stats.tx_hash, tx.hash());
        assert_eq!(stats.included_in_block, 42);
        assert_eq!(stats.inclusion_delay, Duration::from_millis(50));

        let calls = endpoint.calls();
        assert_eq!(calls.send_sync, 1);
        assert_eq!(calls.send, 0);
        assert_eq!(calls.receipt, 0);
        assert_eq!(endpoint.sent_transactions(), vec![tx.raw().clone()]);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_sync_dispatch_without_receipt_fails() {
        let clock = Arc::new(MockClock::new());
        let endpoint = MockEndpoint::new("fast").with_sync_response(SyncResponse::NoReceipt);
        let dispatcher = Dispatcher::new(clock);

        let err = dispatcher
            .dispatch(&endpoint, &signed_tx(0), DispatchMode::Sync)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::SyncSubmission { .. }));
        assert!(err.to_string().contains("receipt not found"));
        assert_eq!(endpoint.calls().receipt, 0);
    }

    #[tokio::test]
    async fn test_sync_dispatch_rpc_error_fails() {
        let endpoint = MockEndpoint::new("fast").with_sync_response(SyncResponse::Error);
        let dispatcher = Dispatcher::new(Arc::new(MockClock::new()));

        let err = dispatcher
            .dispatch(&endpoint, &signed_tx(0), DispatchMode::Sync)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::SyncSubmission { .. }));
        assert_eq!(endpoint.calls().send_sync, 1);
    }

    #[tokio::test]
    async fn test_async_dispatch_polls_until_receipt() {
        let clock = Arc::new(MockClock::new());
        let endpoint = MockEndpoint::new("standard")
            .with_receipt_after(3)
            .with_receipt_block(77);
        let dispatcher = Dispatcher::new(clock.clone());
        let tx = signed_tx(1);
        let started = clock.now();

        let stats = dispatcher.dispatch(&endpoint, &tx, async_mode(50)).await.unwrap();

        assert_eq!(stats.sent_at, started);
        assert_eq!(stats.included_in_block, 77);
        assert_eq!(stats.inclusion_delay, Duration::from_millis(150));

        let calls = endpoint.calls();
        assert_eq!(calls.send, 1);
        assert_eq!(calls.send_sync, 0);
        assert_eq!(calls.receipt, 4);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(50); 3]);
    }

    #[tokio::test]
    async fn test_async_dispatch_treats_lookup_errors_as_absent() {
        let clock = Arc::new(MockClock::new());
        let endpoint = MockEndpoint::new("standard")
            .with_receipt_errors(2)
            .with_receipt_after(2);
        let dispatcher = Dispatcher::new(clock.clone());

        let stats = dispatcher
            .dispatch(&endpoint, &signed_tx(1), async_mode(10))
            .await
            .unwrap();

        assert!(stats.included_in_block > 0);
        assert_eq!(endpoint.calls().receipt, 3);
        assert_eq!(clock.sleep_count(), 2);
    }

    #[tokio::test]
    async fn test_async_dispatch_exhausts_after_cap() {
        let clock = Arc::new(MockClock::new());
        let endpoint = MockEndpoint::new("standard").with_receipt_never();
        let dispatcher = Dispatcher::new(clock.clone());

        let err = dispatcher
            .dispatch(&endpoint, &signed_tx(1), async_mode(50))
            .await
            .unwrap_err();

        match err {
            DispatchError::ReceiptTimeout { attempts, .. } => assert_eq!(attempts, MAX_POLL_ATTEMPTS),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(endpoint.calls().receipt, MAX_POLL_ATTEMPTS as usize);
        assert_eq!(clock.sleep_count(), MAX_POLL_ATTEMPTS as usize);
        assert!(clock.sleeps().iter().all(|d| *d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_async_dispatch_custom_cap() {
        let endpoint = MockEndpoint::new("standard").with_receipt_never();
        let dispatcher = Dispatcher::new(Arc::new(MockClock::new())).with_max_poll_attempts(5);

        let err = dispatcher
            .dispatch(&endpoint, &signed_tx(1), async_mode(1))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::ReceiptTimeout { attempts: 5, .. }));
        assert_eq!(endpoint.calls().receipt, 5);
    }

    #[tokio::test]
    async fn test_async_submission_failure_skips_polling() {
        let endpoint = MockEndpoint::new("standard").failing_send();
        let dispatcher = Dispatcher::new(Arc::new(MockClock::new()));

        let err = dispatcher
            .dispatch(&endpoint, &signed_tx(1), async_mode(50))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Submission { .. }));
        assert_eq!(endpoint.calls().receipt, 0);
    }

    #[test]
    fn test_zero_stats() {
        assert!(InclusionStats::default().is_zero());

        let now = Utc::now();
        let stats = InclusionStats::confirmed(TxHash::repeat_byte(1), 3, now, now);
        assert!(!stats.is_zero());
        assert_eq!(stats.inclusion_delay, Duration::ZERO);
    }
}
