//! Atomic bundle assembly and submission.
//!
//! This module provides the core bundle functionality:
//! - `BundleDescriptor`: ordered signed transactions targeting one block
//! - `BundleOptions`: flashblock/timestamp windows, drop list and replacement id
//! - `BundleAssembler`: builds a bundle for the next block and submits it
//!
//! The receiving node must include every listed transaction in the target
//! block or none of them.

pub mod relay;

pub use relay::RelayClient;

use crate::endpoint::Endpoint;
use crate::errors::BundleError;
use crate::transaction::{SignedTransaction, TransactionBuilder};
use alloy::primitives::{Bytes, TxHash};
use uuid::Uuid;

type BundleResult<T> = std::result::Result<T, BundleError>;

/// A bundle of signed transactions to be included atomically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BundleDescriptor {
    /// EIP-2718 encoded transactions, in execution order.
    pub transactions: Vec<Bytes>,
    /// Block the bundle must land in.
    pub block_number: u64,
    /// Earliest flashblock index within the target block.
    pub flashblock_number_min: Option<u64>,
    /// Latest flashblock index within the target block.
    pub flashblock_number_max: Option<u64>,
    /// Earliest block timestamp at which the bundle is valid.
    pub min_timestamp: Option<u64>,
    /// Latest block timestamp at which the bundle is valid.
    pub max_timestamp: Option<u64>,
    /// Transactions allowed to revert without invalidating the bundle.
    pub reverting_tx_hashes: Vec<TxHash>,
    /// Transactions whose pending bundles are dropped when this one lands.
    pub dropping_tx_hashes: Vec<TxHash>,
    /// Identifier used to replace this bundle on resubmission.
    pub replacement_uuid: Option<Uuid>,
}

impl BundleDescriptor {
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

/// Optional constraints copied onto every assembled bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleOptions {
    pub flashblock_number_min: Option<u64>,
    pub flashblock_number_max: Option<u64>,
    pub min_timestamp: Option<u64>,
    pub max_timestamp: Option<u64>,
    pub dropping_tx_hashes: Vec<TxHash>,
    pub replacement_uuid: Option<Uuid>,
}

/// Result of a successful bundle submission.
#[derive(Debug, Clone)]
pub struct BundleSubmission {
    bundle_id: String,
    target_block: u64,
    tx_hashes: Vec<TxHash>,
}

impl BundleSubmission {
    /// Opaque identifier returned by the receiver.
    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    pub fn target_block(&self) -> u64 {
        self.target_block
    }

    /// Hashes of the bundled transactions, in bundle order.
    pub fn tx_hashes(&self) -> &[TxHash] {
        &self.tx_hashes
    }
}

/// Builds bundles of sequential-nonce transfers targeting the next block.
///
/// The target is chosen once per attempt (`height + 1`); a missed block is
/// not retried. Every transaction is marked as allowed to revert.
pub struct BundleAssembler {
    builder: TransactionBuilder,
    options: BundleOptions,
}

impl BundleAssembler {
    pub fn new(builder: TransactionBuilder) -> Self {
        Self {
            builder,
            options: BundleOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BundleOptions) -> Self {
        self.options = options;
        self
    }

    /// Build a bundle of `count` transfers without submitting it.
    ///
    /// Nonces are allocated up front from the confirmed nonce, so they form a
    /// contiguous ascending run. Any build failure discards the whole bundle.
    pub async fn assemble(
        &self,
        endpoint: &dyn Endpoint,
        count: usize,
    ) -> BundleResult<(BundleDescriptor, Vec<SignedTransaction>)> {
        if count == 0 {
            return Err(BundleError::EmptyBundle);
        }

        let height = endpoint
            .block_number()
            .await
            .map_err(|e| BundleError::BlockHeight {
                reason: e.to_string(),
            })?;
        let target_block = height.checked_add(1).ok_or_else(|| BundleError::BlockHeight {
            reason: format!("no block follows height {}", height),
        })?;

        let first_nonce = endpoint
            .confirmed_nonce(self.builder.intent().from)
            .await
            .map_err(|e| BundleError::Nonce {
                reason: e.to_string(),
            })?;

        let end_nonce = first_nonce
            .checked_add(count as u64)
            .ok_or_else(|| BundleError::Nonce {
                reason: format!("{} transactions from nonce {} overflow", count, first_nonce),
            })?;

        let mut signed = Vec::with_capacity(count);
        for (index, nonce) in (first_nonce..end_nonce).enumerate() {
            let tx = self
                .builder
                .build_with_nonce(endpoint, nonce)
                .await
                .map_err(|source| BundleError::TransactionBuild { index, source })?;
            signed.push(tx);
        }

        let descriptor = BundleDescriptor {
            transactions: signed.iter().map(|tx| tx.raw().clone()).collect(),
            block_number: target_block,
            flashblock_number_min: self.options.flashblock_number_min,
            flashblock_number_max: self.options.flashblock_number_max,
            min_timestamp: self.options.min_timestamp,
            max_timestamp: self.options.max_timestamp,
            reverting_tx_hashes: signed.iter().map(|tx| tx.hash()).collect(),
            dropping_tx_hashes: self.options.dropping_tx_hashes.clone(),
            replacement_uuid: self.options.replacement_uuid,
        };

        tracing::debug!(
            endpoint = endpoint.name(),
            target_block = target_block,
            first_nonce = first_nonce,
            tx_count = count,
            "Bundle assembled"
        );

        Ok((descriptor, signed))
    }

    /// Assemble a bundle of `count` transfers and submit it in one call.
    pub async fn submit(
        &self,
        endpoint: &dyn Endpoint,
        count: usize,
    ) -> BundleResult<BundleSubmission> {
        let (descriptor, signed) = self.assemble(endpoint, count).await?;

        tracing::info!(
            endpoint = endpoint.name(),
            target_block = descriptor.block_number,
            tx_count = descriptor.transaction_count(),
            "Submitting bundle"
        );

        let bundle_id = endpoint
            .send_bundle(&descriptor)
            .await
            .map_err(|e| BundleError::Submission {
                url: endpoint.name().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            endpoint = endpoint.name(),
            bundle_id = %bundle_id,
            target_block = descriptor.block_number,
            "Bundle submitted"
        );

        Ok(BundleSubmission {
            bundle_id,
            target_block: descriptor.block_number,
            tx_hashes: signed.iter().map(|tx| tx.hash()).collect(),
        })
    }
}
