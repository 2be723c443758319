//! Dispatch errors.

/// Errors that can occur while submitting a signed transaction and waiting
/// for its inclusion.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The blocking submit-and-confirm call failed or returned no receipt.
    ///
    /// The network may still have accepted the transaction.
    #[error("Unable to send sync transaction {tx_hash}: {reason}")]
    SyncSubmission { tx_hash: String, reason: String },

    #[error("Unable to send transaction {tx_hash}: {reason}")]
    Submission { tx_hash: String, reason: String },

    #[error("Receipt for {tx_hash} not found after {attempts} attempts")]
    ReceiptTimeout { tx_hash: String, attempts: u32 },
}
