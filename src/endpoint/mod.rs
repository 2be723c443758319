//! Remote calls made against a single RPC endpoint.
//!
//! The benchmark only ever talks to a node through the [`Endpoint`] trait, so
//! the transaction builder, dispatcher and bundle assembler can be driven by
//! a scripted endpoint in tests. [`RpcEndpoint`] is the production
//! implementation on top of an Alloy provider.

pub mod rpc;

pub use rpc::RpcEndpoint;

use crate::bundle::BundleDescriptor;
use crate::errors::Result;
use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;

/// The subset of a transaction receipt the benchmark cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InclusionReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
}

impl InclusionReceipt {
    /// Convert an RPC receipt. Receipts without a block number are not yet
    /// included and yield `None`.
    pub fn from_rpc(receipt: &TransactionReceipt) -> Option<Self> {
        receipt.block_number.map(|block_number| Self {
            tx_hash: receipt.transaction_hash,
            block_number,
        })
    }
}

/// Handle to one RPC endpoint.
///
/// Handles are acquired once at startup and reused for every call of a run.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Label used in logs and output file names.
    fn name(&self) -> &str;

    /// Chain identifier reported by the node.
    async fn chain_id(&self) -> Result<u64>;

    /// Suggested gas price, used as the fee cap.
    async fn gas_price(&self) -> Result<u128>;

    /// Suggested priority fee (tip).
    async fn max_priority_fee(&self) -> Result<u128>;

    /// Next nonce including transactions still in the mempool.
    async fn pending_nonce(&self, account: Address) -> Result<u64>;

    /// Nonce as of the latest confirmed block.
    async fn confirmed_nonce(&self, account: Address) -> Result<u64>;

    /// Current block height.
    async fn block_number(&self) -> Result<u64>;

    /// Blocking submit-and-confirm call (`eth_sendRawTransactionSync`).
    ///
    /// `raw_tx` is the 0x-prefixed hex encoding of the signed transaction.
    /// `Ok(None)` means the node answered without a receipt.
    async fn send_raw_transaction_sync(&self, raw_tx: &str) -> Result<Option<InclusionReceipt>>;

    /// Broadcast a signed transaction without waiting for inclusion.
    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<TxHash>;

    /// Look up a receipt; `Ok(None)` while the transaction is not included.
    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<InclusionReceipt>>;

    /// Submit an atomic bundle (`eth_sendBundle`), returning the opaque
    /// bundle identifier assigned by the receiver.
    async fn send_bundle(&self, bundle: &BundleDescriptor) -> Result<String>;
}
