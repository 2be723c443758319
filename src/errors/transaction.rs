//! Transaction building errors.

/// Errors that can occur while building and signing a transfer.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Unable to get fee quote: {reason}")]
    FeeQuote { reason: String },

    #[error("Unable to get nonce: {reason}")]
    Nonce { reason: String },

    #[error("Unable to sign transaction: {reason}")]
    Signing { reason: String },
}
