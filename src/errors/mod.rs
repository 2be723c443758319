//! Error handling for the latency benchmark.
//!
//! Every component owns a domain error enum; `BenchError` wraps all of them
//! together with the errors of the external crates the library talks to.
//!
//! # Error Hierarchy
//!
//! - **`ConfigError`**: missing or malformed run configuration. Fatal, raised
//!   before any transaction is dispatched.
//! - **`TransactionError`**: fee quote, nonce and signing failures while
//!   building a transfer.
//! - **`DispatchError`**: submission failures and receipt polling exhaustion.
//! - **`BundleError`**: block height, nonce, build and submission failures of
//!   an atomic bundle.
//! - **`StatsError`**: persisting or re-reading result records.
//!
//! Transaction, dispatch and bundle errors are recovered at the campaign or
//! bundle boundary: they are logged, counted, and the run moves on.

pub mod bundle;
pub mod config;
pub mod dispatch;
pub mod stats;
pub mod transaction;

pub use bundle::BundleError;
pub use config::ConfigError;
pub use dispatch::DispatchError;
pub use stats::StatsError;
pub use transaction::TransactionError;

/// Main result type for the library
pub type Result<T> = std::result::Result<T, BenchError>;

/// Top-level error enum that encompasses all possible errors in the library.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Building or signing a transfer transaction failed.
    #[error("Transaction build failed: {0}")]
    Transaction(#[from] TransactionError),

    /// Submitting a transaction or waiting for its receipt failed.
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// Assembling or submitting a bundle failed.
    #[error("Bundle operation failed: {0}")]
    Bundle(#[from] BundleError),

    /// Writing or reading result records failed.
    #[error("Stats recorder error: {0}")]
    Stats(#[from] StatsError),

    /// Network communication error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// RPC communication error with blockchain nodes.
    #[error("RPC error: {0}")]
    Rpc(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),

    /// Generic error for cases not covered by specific error types.
    #[error("Generic error: {0}")]
    Other(#[from] anyhow::Error),
}

impl BenchError {
    /// Whether this error belongs to the fatal configuration class.
    pub fn is_configuration(&self) -> bool {
        matches!(self, BenchError::Config(_))
    }
}
