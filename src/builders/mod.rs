//! Builder patterns for complex object construction.
//!
//! # Available Builders
//!
//! - **`CampaignRunnerBuilder`**: assembles the transaction builder, dispatcher
//!   and clock a campaign runner needs, from explicit values or from a loaded
//!   `BenchConfig`
//!
//! Builders consume themselves and validate required fields in `build`,
//! returning `Result<T>`.

pub mod runner;

// Re-export builders for convenience
pub use runner::CampaignRunnerBuilder;
