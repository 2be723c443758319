//! Alloy-backed endpoint implementation.

use super::{Endpoint, InclusionReceipt};
use crate::bundle::{BundleDescriptor, RelayClient};
use crate::errors::Result;
use alloy::network::Ethereum;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use url::Url;

/// JSON-RPC method of the blocking submit-and-confirm call.
pub const SEND_RAW_TRANSACTION_SYNC: &str = "eth_sendRawTransactionSync";

/// Long-lived handle to one node.
///
/// Standard calls go through an Alloy provider. Bundles are posted by a
/// [`RelayClient`], which targets the same URL unless replaced with
/// [`RpcEndpoint::with_relay`].
pub struct RpcEndpoint {
    name: String,
    provider: RootProvider<Ethereum>,
    relay: RelayClient,
}

impl RpcEndpoint {
    /// Create a handle for the node at `url`.
    ///
    /// # Arguments
    ///
    /// * `name` - Label used in logs and output files
    /// * `url` - Node URL
    /// * `relay_timeout_ms` - HTTP timeout for bundle submissions
    pub fn connect(name: impl Into<String>, url: Url, relay_timeout_ms: u64) -> Result<Self> {
        let name = name.into();
        let relay = RelayClient::new(url.clone(), relay_timeout_ms, None)?;
        let provider = RootProvider::<Ethereum>::new_http(url);

        tracing::debug!(endpoint = %name, "Endpoint handle created");

        Ok(Self {
            name,
            provider,
            relay,
        })
    }

    /// Replace the relay used for bundle submission.
    pub fn with_relay(mut self, relay: RelayClient) -> Self {
        self.relay = relay;
        self
    }
}

#[async_trait]
impl Endpoint for RpcEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn gas_price(&self) -> Result<u128> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn max_priority_fee(&self) -> Result<u128> {
        Ok(self.provider.get_max_priority_fee_per_gas().await?)
    }

    async fn pending_nonce(&self, account: Address) -> Result<u64> {
        Ok(self.provider.get_transaction_count(account).pending().await?)
    }

    async fn confirmed_nonce(&self, account: Address) -> Result<u64> {
        Ok(self.provider.get_transaction_count(account).latest().await?)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn send_raw_transaction_sync(&self, raw_tx: &str) -> Result<Option<InclusionReceipt>> {
        let receipt: Option<TransactionReceipt> = self
            .provider
            .raw_request(SEND_RAW_TRANSACTION_SYNC.into(), (raw_tx.to_string(),))
            .await?;

        Ok(receipt.as_ref().and_then(InclusionReceipt::from_rpc))
    }

    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<TxHash> {
        let pending = self.provider.send_raw_transaction(raw_tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<InclusionReceipt>> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.as_ref().and_then(InclusionReceipt::from_rpc))
    }

    async fn send_bundle(&self, bundle: &BundleDescriptor) -> Result<String> {
        self.relay.submit_bundle(bundle).await
    }
}
