//! Construction and signing of plain value-transfer transactions.
//!
//! Every transaction of a run moves the same value with the same gas limit;
//! only the nonce and the fee parameters change between transactions. A fee
//! change therefore means building and signing a new transaction.

use crate::endpoint::Endpoint;
use crate::errors::TransactionError;
use crate::utils::to_hex_prefixed;
use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Value moved by every transfer, in wei.
pub const TRANSFER_VALUE_WEI: u64 = 100;

type TxResult<T> = std::result::Result<T, TransactionError>;

/// The fixed part of every transfer in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferIntent {
    pub chain_id: u64,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub gas_limit: u64,
}

impl TransferIntent {
    /// Intent for a standard transfer of [`TRANSFER_VALUE_WEI`].
    pub fn new(chain_id: u64, from: Address, to: Address) -> Self {
        Self {
            chain_id,
            from,
            to,
            value: U256::from(TRANSFER_VALUE_WEI),
            gas_limit: TRANSFER_GAS_LIMIT,
        }
    }
}

/// Which account nonce a transaction is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonceSource {
    /// Next nonce including mempool-visible transactions.
    #[default]
    Pending,
    /// Nonce as of the latest block. Required when several transactions
    /// must receive strictly sequential nonces within one call.
    Confirmed,
}

/// Fee parameters quoted by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Fee ceiling per gas; the endpoint's suggested gas price.
    pub max_fee_per_gas: u128,
    /// Priority tip per gas.
    pub max_priority_fee_per_gas: u128,
}

impl FeeQuote {
    /// Query both fee parameters. No markup is applied.
    pub async fn fetch(endpoint: &dyn Endpoint) -> TxResult<Self> {
        let max_fee_per_gas = endpoint
            .gas_price()
            .await
            .map_err(|e| TransactionError::FeeQuote {
                reason: format!("gas price: {}", e),
            })?;

        let max_priority_fee_per_gas = endpoint
            .max_priority_fee()
            .await
            .map_err(|e| TransactionError::FeeQuote {
                reason: format!("priority fee: {}", e),
            })?;

        Ok(Self {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }
}

/// A signed transaction in its canonical EIP-2718 encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    raw: Bytes,
    hash: TxHash,
    nonce: u64,
}

impl SignedTransaction {
    /// The EIP-2718 encoded bytes.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Hash of the signed encoding.
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// 0x-prefixed hex of the encoded bytes.
    pub fn to_hex(&self) -> String {
        to_hex_prefixed(&self.raw)
    }
}

/// Builds and signs transfers for one account.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    intent: TransferIntent,
    signer: PrivateKeySigner,
}

impl TransactionBuilder {
    /// Create a builder; the intent's sender is the signer's address.
    pub fn new(chain_id: u64, signer: PrivateKeySigner, to: Address) -> Self {
        let intent = TransferIntent::new(chain_id, signer.address(), to);
        Self { intent, signer }
    }

    pub fn intent(&self) -> &TransferIntent {
        &self.intent
    }

    /// Read the nonce from `source`, quote fees and sign.
    pub async fn build(
        &self,
        endpoint: &dyn Endpoint,
        source: NonceSource,
    ) -> TxResult<SignedTransaction> {
        let account = self.intent.from;
        let nonce = match source {
            NonceSource::Pending => endpoint.pending_nonce(account).await,
            NonceSource::Confirmed => endpoint.confirmed_nonce(account).await,
        }
        .map_err(|e| TransactionError::Nonce {
            reason: e.to_string(),
        })?;

        self.build_with_nonce(endpoint, nonce).await
    }

    /// Quote fees and sign with a nonce allocated by the caller.
    pub async fn build_with_nonce(
        &self,
        endpoint: &dyn Endpoint,
        nonce: u64,
    ) -> TxResult<SignedTransaction> {
        let quote = FeeQuote::fetch(endpoint).await?;
        self.sign(nonce, quote)
    }

    /// Sign a dynamic-fee transfer with the given nonce and fees.
    pub fn sign(&self, nonce: u64, quote: FeeQuote) -> TxResult<SignedTransaction> {
        let mut tx = TxEip1559 {
            chain_id: self.intent.chain_id,
            nonce,
            gas_limit: self.intent.gas_limit,
            max_fee_per_gas: quote.max_fee_per_gas,
            max_priority_fee_per_gas: quote.max_priority_fee_per_gas,
            to: TxKind::Call(self.intent.to),
            value: self.intent.value,
            access_list: Default::default(),
            input: Bytes::new(),
        };

        let signature = self
            .signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| TransactionError::Signing {
                reason: e.to_string(),
            })?;

        let signed = tx.into_signed(signature);
        let hash = *signed.hash();
        let raw = Bytes::from(TxEnvelope::from(signed).encoded_2718());

        tracing::trace!(
            tx_hash = %hash,
            nonce = nonce,
            max_fee_per_gas = quote.max_fee_per_gas,
            max_priority_fee_per_gas = quote.max_priority_fee_per_gas,
            "Transfer signed"
        );

        Ok(SignedTransaction { raw, hash, nonce })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockEndpoint;
    use alloy::consensus::transaction::SignerRecoverable;
    use alloy::consensus::Transaction;
    use alloy::eips::Decodable2718;

    fn builder() -> TransactionBuilder {
        TransactionBuilder::new(8453, PrivateKeySigner::random(), Address::repeat_byte(0x42))
    }

    #[test]
    fn test_sign_produces_decodable_transfer() {
        let builder = builder();
        let quote = FeeQuote {
            max_fee_per_gas: 100,
            max_priority_fee_per_gas: 2,
        };

        let signed = builder.sign(5, quote).unwrap();
        let envelope = TxEnvelope::decode_2718(&mut signed.raw().as_ref()).unwrap();

        assert_eq!(*envelope.tx_hash(), signed.hash());
        assert_eq!(envelope.nonce(), 5);
        assert_eq!(envelope.gas_limit(), TRANSFER_GAS_LIMIT);
        assert_eq!(envelope.value(), U256::from(TRANSFER_VALUE_WEI));
        assert_eq!(envelope.max_fee_per_gas(), 100);
        assert_eq!(envelope.max_priority_fee_per_gas(), Some(2));
        assert_eq!(envelope.chain_id(), Some(8453));
        assert_eq!(envelope.to(), Some(Address::repeat_byte(0x42)));
        assert_eq!(envelope.recover_signer().unwrap(), builder.intent().from);
        assert!(signed.to_hex().starts_with("0x02"));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let builder = builder();
        let quote = FeeQuote {
            max_fee_per_gas: 100,
            max_priority_fee_per_gas: 2,
        };

        let a = builder.sign(7, quote).unwrap();
        let b = builder.sign(7, quote).unwrap();
        assert_eq!(a, b);

        let c = builder.sign(8, quote).unwrap();
        assert_ne!(a.hash(), c.hash());
    }

    #[tokio::test]
    async fn test_build_uses_requested_nonce_source() {
        let endpoint = MockEndpoint::new("fast")
            .with_fees(100, 2)
            .with_pending_nonce(9)
            .with_confirmed_nonce(5);
        let builder = builder();

        let pending = builder.build(&endpoint, NonceSource::Pending).await.unwrap();
        assert_eq!(pending.nonce(), 9);

        let confirmed = builder.build(&endpoint, NonceSource::Confirmed).await.unwrap();
        assert_eq!(confirmed.nonce(), 5);
    }

    #[tokio::test]
    async fn test_build_fee_quote_error() {
        let endpoint = MockEndpoint::new("fast").with_pending_nonce(1);

        let err = builder().build(&endpoint, NonceSource::Pending).await.unwrap_err();
        assert!(matches!(err, TransactionError::FeeQuote { .. }));
    }

    #[tokio::test]
    async fn test_build_nonce_error() {
        let endpoint = MockEndpoint::new("fast").with_fees(100, 2);

        let err = builder().build(&endpoint, NonceSource::Confirmed).await.unwrap_err();
        assert!(matches!(err, TransactionError::Nonce { .. }));
    }
}
