//! Flashblocks Latency Library
//!
//! Measures how long it takes for a transaction to be included in a block,
//! comparing a fast-confirmation endpoint (which supports the blocking
//! `eth_sendRawTransactionSync` call) with a standard endpoint, and exercises
//! atomic `eth_sendBundle` submission.
//!
//! # Architecture Overview
//!
//! - **`transaction`**: builds and signs value-transfer transactions
//! - **`dispatch`**: submits a signed transaction and times its inclusion,
//!   synchronously or by receipt polling
//! - **`bundle`**: assembles sequential-nonce bundles targeting the next block
//!   and posts them through a JSON-RPC relay client
//! - **`campaign`**: runs N paced dispatches per target, targets in order
//! - **`stats`**: persists campaign results as CSV
//! - **`endpoint`**: the remote-call seam and its Alloy implementation
//! - **`config`**: environment-based configuration and validation
//! - **`builders`**: fluent construction of the campaign runner
//! - **`errors`**: domain errors and the top-level `BenchError`
//! - **`utils`**: key, address and URL parsing helpers
//!
//! # Execution Model
//!
//! Everything is sequential: a transaction is built, submitted and confirmed
//! (or given up on) before the next one is built. The account nonce is read
//! from the endpoint for every transaction, which is only sound because no
//! two dispatches for the same account are ever in flight together.

pub mod builders;
pub mod bundle;
pub mod campaign;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod errors;
pub mod stats;
pub mod transaction;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

// Re-export the main Result type and error enum for convenience
pub use errors::{BenchError, Result};

pub use builders::CampaignRunnerBuilder;
pub use bundle::{BundleAssembler, BundleDescriptor, BundleOptions};
pub use campaign::{Campaign, CampaignRunner, CampaignTarget, PacingPolicy};
pub use config::BenchConfig;
pub use dispatch::{DispatchMode, Dispatcher, InclusionStats};
pub use endpoint::{Endpoint, RpcEndpoint};
pub use stats::StatsRecorder;
pub use transaction::{NonceSource, TransactionBuilder};
