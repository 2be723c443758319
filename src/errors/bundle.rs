//! Bundle assembly and submission errors.

use super::TransactionError;

/// Errors that can occur during bundle operations
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Unable to read block height: {reason}")]
    BlockHeight { reason: String },

    #[error("Unable to read confirmed nonce: {reason}")]
    Nonce { reason: String },

    #[error("Failed to build bundle transaction {index}: {source}")]
    TransactionBuild {
        index: usize,
        #[source]
        source: TransactionError,
    },

    #[error("Bundle must contain at least one transaction")]
    EmptyBundle,

    #[error("Bundle submission to {url} failed: {reason}")]
    Submission { url: String, reason: String },

    #[error("Invalid response from relayer {url}: {message}")]
    InvalidRelayerResponse { url: String, message: String },

    #[error("Request signing failed: {reason}")]
    RequestSigningFailed { reason: String },
}
