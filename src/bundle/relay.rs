//! JSON-RPC client for `eth_sendBundle`.
//!
//! This module handles the networking side of bundle submission: building
//! the request payload, optionally signing it with an identity key, and
//! interpreting the relay's answer.

use crate::bundle::BundleDescriptor;
use crate::errors::{BundleError, Result};
use crate::utils::to_hex_prefixed;
use alloy::primitives::keccak256;
use alloy::signers::{local::PrivateKeySigner, Signer};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Parameters for the eth_sendBundle JSON-RPC method.
#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EthSendBundleParams {
    pub txs: Vec<String>,
    pub block_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flashblock_number_min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flashblock_number_max: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reverting_tx_hashes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropping_tx_hashes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_uuid: Option<String>,
}

fn quantity(value: u64) -> String {
    format!("0x{:x}", value)
}

impl From<&BundleDescriptor> for EthSendBundleParams {
    fn from(bundle: &BundleDescriptor) -> Self {
        Self {
            txs: bundle.transactions.iter().map(to_hex_prefixed).collect(),
            block_number: quantity(bundle.block_number),
            flashblock_number_min: bundle.flashblock_number_min.map(quantity),
            flashblock_number_max: bundle.flashblock_number_max.map(quantity),
            min_timestamp: bundle.min_timestamp.map(quantity),
            max_timestamp: bundle.max_timestamp.map(quantity),
            reverting_tx_hashes: bundle.reverting_tx_hashes.iter().map(to_hex_prefixed).collect(),
            dropping_tx_hashes: bundle.dropping_tx_hashes.iter().map(to_hex_prefixed).collect(),
            replacement_uuid: bundle.replacement_uuid.map(|id| id.to_string()),
        }
    }
}

/// Generic JSON-RPC request structure.
#[derive(Serialize, Debug)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Vec<T>,
}

impl JsonRpcRequest<EthSendBundleParams> {
    /// Create a new eth_sendBundle request.
    pub fn send_bundle(params: EthSendBundleParams) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: "eth_sendBundle".to_string(),
            params: vec![params],
        }
    }
}

/// Generic JSON-RPC response structure.
#[derive(Deserialize, Debug)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Deserialize, Debug)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// Result of eth_sendBundle.
///
/// Builders answer either with `{"bundleHash": ...}` or with a bare
/// identifier string.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum EthSendBundleResponse {
    #[serde(rename_all = "camelCase")]
    Hash { bundle_hash: String },
    Id(String),
}

impl EthSendBundleResponse {
    pub fn into_id(self) -> String {
        match self {
            EthSendBundleResponse::Hash { bundle_hash } => bundle_hash,
            EthSendBundleResponse::Id(id) => id,
        }
    }
}

/// Client posting bundles to one URL.
pub struct RelayClient {
    http_client: HttpClient,
    identity_signer: Option<PrivateKeySigner>,
    url: Url,
}

impl RelayClient {
    /// Create a new RelayClient.
    ///
    /// # Arguments
    ///
    /// * `url` - Endpoint accepting `eth_sendBundle`
    /// * `timeout_ms` - HTTP request timeout
    /// * `identity_signer` - Key used for the `X-Flashbots-Signature` header;
    ///   requests are unsigned when absent
    pub fn new(url: Url, timeout_ms: u64, identity_signer: Option<PrivateKeySigner>) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            http_client,
            identity_signer,
            url,
        })
    }

    /// Submit a bundle and return the identifier assigned by the relay.
    pub async fn submit_bundle(&self, bundle: &BundleDescriptor) -> Result<String> {
        let request = JsonRpcRequest::send_bundle(EthSendBundleParams::from(bundle));

        let response = self
            .send_request::<EthSendBundleParams, EthSendBundleResponse>(&request)
            .await?;

        match (response.error, response.result) {
            (Some(err), _) => Err(BundleError::Submission {
                url: self.url.to_string(),
                reason: format!("{} (code {})", err.message, err.code),
            }
            .into()),
            (None, Some(result)) => Ok(result.into_id()),
            (None, None) => Err(BundleError::InvalidRelayerResponse {
                url: self.url.to_string(),
                message: "Empty response".to_string(),
            }
            .into()),
        }
    }

    async fn send_request<T: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        request: &JsonRpcRequest<T>,
    ) -> Result<JsonRpcResponse<R>> {
        let request_body = serde_json::to_string(request)?;

        let mut builder = self
            .http_client
            .post(self.url.clone())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");

        if let Some(signature) = self.sign_request(&request_body).await? {
            builder = builder.header("X-Flashbots-Signature", signature);
        }

        let response = builder.body(request_body).send().await?;

        let response_text = response.text().await?;
        let json_response: JsonRpcResponse<R> = serde_json::from_str(&response_text)
            .map_err(|e| BundleError::InvalidRelayerResponse {
                url: self.url.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(json_response)
    }

    async fn sign_request(&self, request_body: &str) -> Result<Option<String>> {
        let Some(signer) = &self.identity_signer else {
            return Ok(None);
        };

        let hash = keccak256(request_body.as_bytes());
        let message = to_hex_prefixed(hash);

        let signature = signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| BundleError::RequestSigningFailed {
                reason: e.to_string(),
            })?;

        Ok(Some(format!("{}:0x{}", signer.address(), hex::encode(signature.as_bytes()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, TxHash};
    use uuid::Uuid;

    #[test]
    fn test_params_encoding() {
        let uuid = Uuid::new_v4();
        let bundle = BundleDescriptor {
            transactions: vec![Bytes::from(vec![0x02, 0xf8])],
            block_number: 255,
            flashblock_number_min: Some(2),
            flashblock_number_max: None,
            min_timestamp: None,
            max_timestamp: Some(16),
            reverting_tx_hashes: vec![TxHash::repeat_byte(0xab)],
            dropping_tx_hashes: vec![],
            replacement_uuid: Some(uuid),
        };

        let json = serde_json::to_value(JsonRpcRequest::send_bundle((&bundle).into())).unwrap();
        assert_eq!(json["method"], "eth_sendBundle");

        let params = &json["params"][0];
        assert_eq!(params["txs"][0], "0x02f8");
        assert_eq!(params["blockNumber"], "0xff");
        assert_eq!(params["flashblockNumberMin"], "0x2");
        assert!(params.get("flashblockNumberMax").is_none());
        assert!(params.get("minTimestamp").is_none());
        assert_eq!(params["maxTimestamp"], "0x10");
        assert_eq!(params["revertingTxHashes"][0], format!("0x{}", "ab".repeat(32)));
        assert!(params.get("droppingTxHashes").is_none());
        assert_eq!(params["replacementUuid"], uuid.to_string());
    }

    #[test]
    fn test_response_variants() {
        let hash: JsonRpcResponse<EthSendBundleResponse> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":{"bundleHash":"0xabc"}}"#).unwrap();
        assert_eq!(hash.result.unwrap().into_id(), "0xabc");

        let id: JsonRpcResponse<EthSendBundleResponse> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"bundle-1"}"#).unwrap();
        assert_eq!(id.result.unwrap().into_id(), "bundle-1");

        let err: JsonRpcResponse<EthSendBundleResponse> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"bundle rejected"}}"#,
        )
        .unwrap();
        assert!(err.result.is_none());
        assert_eq!(err.error.unwrap().message, "bundle rejected");
    }

    #[tokio::test]
    async fn test_sign_request_header_format() {
        let signer = PrivateKeySigner::random();
        let address = signer.address();
        let client = RelayClient::new("http://localhost:8545".parse().unwrap(), 1000, Some(signer)).unwrap();

        let header = client.sign_request("{}").await.unwrap().unwrap();
        let (addr, sig) = header.split_once(':').unwrap();
        assert_eq!(addr, address.to_string());
        assert!(sig.starts_with("0x"));
        assert_eq!(sig.len(), 2 + 130);

        let unsigned = RelayClient::new("http://localhost:8545".parse().unwrap(), 1000, None).unwrap();
        assert!(unsigned.sign_request("{}").await.unwrap().is_none());
    }
}
