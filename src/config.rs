//! Configuration management for the latency benchmark.
//!
//! All run parameters come from environment variables (optionally loaded
//! from a `.env` file by the binary). Required values that are missing or
//! malformed are fatal and surface before any transaction is dispatched.
//! Numeric knobs are lenient: an unparseable value falls back to its default
//! with a warning.

use crate::campaign::{PacingPolicy, FAST_ASYNC_PACING, FAST_SYNC_PACING, STANDARD_PACING};
use crate::dispatch::{DispatchMode, DEFAULT_POLLING_INTERVAL};
use crate::errors::{ConfigError, Result};
use crate::utils::{mask_url, parse_address, parse_endpoint_url, parse_private_key};
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default number of dispatches per target.
pub const DEFAULT_TRANSACTIONS: usize = 100;

/// Default directory for result files.
pub const DEFAULT_OUTPUT_DIR: &str = "/data";

/// Default HTTP timeout of the bundle relay.
pub const DEFAULT_RELAYER_TIMEOUT_MS: u64 = 5000;

/// Settings of the optional bundle run.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Transactions per bundle; `0` disables the bundle run.
    pub transactions: usize,
    /// URL receiving `eth_sendBundle`.
    pub endpoint_url: Url,
    /// Key signing relay requests, if any.
    pub identity: Option<PrivateKeySigner>,
    pub timeout_ms: u64,
}

impl BundleConfig {
    pub fn is_enabled(&self) -> bool {
        self.transactions > 0
    }
}

/// Main configuration structure for a benchmark run
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Run label, part of every output file name
    pub region: String,
    /// Key signing every transfer
    pub signer: PrivateKeySigner,
    /// Recipient of every transfer
    pub recipient: Address,
    /// Fast-confirmation endpoint
    pub endpoint1_url: Url,
    /// Standard endpoint
    pub endpoint2_url: Url,
    /// Use `eth_sendRawTransactionSync` for both targets
    pub send_sync: bool,
    /// Whether the standard endpoint is exercised at all
    pub run_endpoint2: bool,
    pub polling_interval: Duration,
    pub transactions: usize,
    pub output_dir: PathBuf,
    /// Chain id override; queried from the standard endpoint when absent
    pub chain_id: Option<u64>,
    pub bundle: BundleConfig,
}

impl BenchConfig {
    /// Create a new configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// ## Required
    /// - `REGION`: run label used in output file names
    /// - `PRIVATE_KEY`: signing key (64 hex characters, optional 0x)
    /// - `TO_ADDRESS`: transfer recipient, must not be the zero address
    /// - `BASE_NODE_ENDPOINT_1`: fast-confirmation endpoint URL
    /// - `BASE_NODE_ENDPOINT_2`: standard endpoint URL
    ///
    /// ## Optional
    /// - `SEND_TXN_SYNC`: `true` selects synchronous dispatch (default: false)
    /// - `RUN_ENDPOINT2_TESTING`: `false` skips the standard endpoint (default: true)
    /// - `POLLING_INTERVAL_MS`: receipt polling interval (default: 50)
    /// - `NUMBER_OF_TRANSACTIONS`: dispatches per target (default: 100)
    /// - `OUTPUT_DIR`: directory for CSV files (default: /data)
    /// - `CHAIN_ID`: skip the chain id query
    /// - `BUNDLE_TRANSACTIONS`: size of the optional bundle run (default: 0, disabled)
    /// - `BUNDLE_ENDPOINT`: `eth_sendBundle` URL (default: `BASE_NODE_ENDPOINT_1`)
    /// - `BUNDLE_IDENTITY_KEY`: key signing bundle requests
    /// - `RELAYER_TIMEOUT_MS`: bundle relay timeout (default: 5000)
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a required variable is missing or if a key,
    /// address or URL is malformed.
    pub fn from_env() -> Result<Self> {
        tracing::info!("Loading benchmark configuration from environment");

        let region = required("REGION")?;

        let signer = parse_private_key(&required("PRIVATE_KEY")?, "PRIVATE_KEY")?;
        tracing::debug!(sender = %signer.address(), "Signing key loaded and validated");

        let recipient = parse_address(&required("TO_ADDRESS")?, "TO_ADDRESS")?;

        let endpoint1_url = parse_endpoint_url(&required("BASE_NODE_ENDPOINT_1")?, "BASE_NODE_ENDPOINT_1")?;
        let endpoint2_url = parse_endpoint_url(&required("BASE_NODE_ENDPOINT_2")?, "BASE_NODE_ENDPOINT_2")?;

        let send_sync = optional("SEND_TXN_SYNC").as_deref() == Some("true");
        let run_endpoint2 = optional("RUN_ENDPOINT2_TESTING").as_deref() != Some("false");

        let polling_interval = Duration::from_millis(parse_or_default(
            "POLLING_INTERVAL_MS",
            DEFAULT_POLLING_INTERVAL.as_millis() as u64,
        ));
        let transactions = parse_or_default("NUMBER_OF_TRANSACTIONS", DEFAULT_TRANSACTIONS);
        let output_dir = optional("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let chain_id = optional("CHAIN_ID").and_then(|raw| match raw.parse::<u64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(value = %raw, "Ignoring unparseable CHAIN_ID");
                None
            }
        });

        let bundle = Self::bundle_from_env(&endpoint1_url)?;

        let config = Self {
            region,
            signer,
            recipient,
            endpoint1_url,
            endpoint2_url,
            send_sync,
            run_endpoint2,
            polling_interval,
            transactions,
            output_dir,
            chain_id,
            bundle,
        };

        tracing::info!(
            region = %config.region,
            endpoint1 = %mask_url(config.endpoint1_url.as_str()),
            endpoint2 = %mask_url(config.endpoint2_url.as_str()),
            send_sync = config.send_sync,
            run_endpoint2 = config.run_endpoint2,
            polling_interval_ms = config.polling_interval.as_millis() as u64,
            transactions = config.transactions,
            output_dir = %config.output_dir.display(),
            bundle_transactions = config.bundle.transactions,
            "Benchmark configuration loaded successfully"
        );

        Ok(config)
    }

    fn bundle_from_env(default_url: &Url) -> Result<BundleConfig> {
        let transactions = parse_or_default("BUNDLE_TRANSACTIONS", 0usize);

        let endpoint_url = match optional("BUNDLE_ENDPOINT") {
            Some(raw) => parse_endpoint_url(&raw, "BUNDLE_ENDPOINT")?,
            None => default_url.clone(),
        };

        let identity = optional("BUNDLE_IDENTITY_KEY")
            .map(|raw| parse_private_key(&raw, "BUNDLE_IDENTITY_KEY"))
            .transpose()?;

        let timeout_ms = parse_or_default("RELAYER_TIMEOUT_MS", DEFAULT_RELAYER_TIMEOUT_MS);

        tracing::debug!(
            transactions = transactions,
            endpoint = %mask_url(endpoint_url.as_str()),
            has_identity = identity.is_some(),
            timeout_ms = timeout_ms,
            "Bundle configuration loaded"
        );

        Ok(BundleConfig {
            transactions,
            endpoint_url,
            identity,
            timeout_ms,
        })
    }

    /// Create a configuration for testing purposes with a random signing key
    #[cfg(test)]
    pub fn for_testing() -> Self {
        let endpoint1_url = Url::parse("http://localhost:8545").expect("static url");
        Self {
            region: "test".to_string(),
            signer: PrivateKeySigner::random(),
            recipient: Address::repeat_byte(0x42),
            endpoint2_url: Url::parse("http://localhost:9545").expect("static url"),
            send_sync: false,
            run_endpoint2: true,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            transactions: 2,
            output_dir: std::env::temp_dir(),
            chain_id: Some(8453),
            bundle: BundleConfig {
                transactions: 0,
                endpoint_url: endpoint1_url.clone(),
                identity: None,
                timeout_ms: DEFAULT_RELAYER_TIMEOUT_MS,
            },
            endpoint1_url,
        }
    }

    /// Dispatch mode shared by every target of the run.
    pub fn dispatch_mode(&self) -> DispatchMode {
        if self.send_sync {
            DispatchMode::Sync
        } else {
            DispatchMode::Async {
                polling_interval: self.polling_interval,
            }
        }
    }

    /// Pacing of the fast endpoint, tighter in synchronous mode.
    pub fn endpoint1_pacing(&self) -> PacingPolicy {
        if self.send_sync {
            FAST_SYNC_PACING
        } else {
            FAST_ASYNC_PACING
        }
    }

    pub fn endpoint2_pacing(&self) -> PacingPolicy {
        STANDARD_PACING
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn required(name: &str) -> std::result::Result<String, ConfigError> {
    optional(name).ok_or_else(|| {
        tracing::error!(variable = name, "Required environment variable not set");
        ConfigError::MissingVariable {
            name: name.to_string(),
        }
    })
}

fn parse_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match optional(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(
                variable = name,
                value = %raw,
                default = %default,
                "Unparseable value, using default"
            );
            default
        }),
    }
}
