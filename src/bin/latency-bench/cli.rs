use clap::Parser;
use flashblocks_latency::errors::Result;
use flashblocks_latency::utils::mask_url;

/// Command-line overrides. Every flag falls back to its environment variable;
/// validation and defaults live in `BenchConfig::from_env`.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(long, env = "REGION", help = "Run label used in output file names")]
    pub region: Option<String>,

    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true, help = "Private key signing every transfer")]
    pub private_key: Option<String>,

    #[clap(long, env = "TO_ADDRESS", help = "Recipient of every transfer")]
    pub to_address: Option<String>,

    #[clap(long, env = "BASE_NODE_ENDPOINT_1", hide_env_values = true, help = "Fast-confirmation endpoint URL")]
    pub endpoint1: Option<String>,

    #[clap(long, env = "BASE_NODE_ENDPOINT_2", hide_env_values = true, help = "Standard endpoint URL")]
    pub endpoint2: Option<String>,

    #[clap(long, env = "SEND_TXN_SYNC", help = "Use eth_sendRawTransactionSync (true/false)")]
    pub send_txn_sync: Option<String>,

    #[clap(long, env = "RUN_ENDPOINT2_TESTING", help = "Set to false to skip the standard endpoint")]
    pub run_endpoint2_testing: Option<String>,

    #[clap(long, env = "POLLING_INTERVAL_MS", help = "Receipt polling interval in milliseconds")]
    pub polling_interval_ms: Option<String>,

    #[clap(long, env = "NUMBER_OF_TRANSACTIONS", help = "Transactions per endpoint")]
    pub number_of_transactions: Option<String>,

    #[clap(long, env = "OUTPUT_DIR", help = "Directory for CSV result files")]
    pub output_dir: Option<String>,

    #[clap(long, env = "CHAIN_ID", help = "Chain id; queried from the standard endpoint when absent")]
    pub chain_id: Option<String>,

    #[clap(long, env = "BUNDLE_TRANSACTIONS", help = "Transactions in the optional bundle run (0 disables)")]
    pub bundle_transactions: Option<String>,

    #[clap(long, env = "BUNDLE_ENDPOINT", hide_env_values = true, help = "URL receiving eth_sendBundle")]
    pub bundle_endpoint: Option<String>,

    #[clap(long, env = "BUNDLE_IDENTITY_KEY", hide_env_values = true, help = "Private key signing bundle requests")]
    pub bundle_identity_key: Option<String>,

    #[clap(long, env = "RELAYER_TIMEOUT_MS", help = "Bundle relay timeout in milliseconds")]
    pub relayer_timeout_ms: Option<String>,
}

impl Args {
    fn pairs(&self) -> [(&'static str, Option<&String>); 15] {
        [
            ("REGION", self.region.as_ref()),
            ("PRIVATE_KEY", self.private_key.as_ref()),
            ("TO_ADDRESS", self.to_address.as_ref()),
            ("BASE_NODE_ENDPOINT_1", self.endpoint1.as_ref()),
            ("BASE_NODE_ENDPOINT_2", self.endpoint2.as_ref()),
            ("SEND_TXN_SYNC", self.send_txn_sync.as_ref()),
            ("RUN_ENDPOINT2_TESTING", self.run_endpoint2_testing.as_ref()),
            ("POLLING_INTERVAL_MS", self.polling_interval_ms.as_ref()),
            ("NUMBER_OF_TRANSACTIONS", self.number_of_transactions.as_ref()),
            ("OUTPUT_DIR", self.output_dir.as_ref()),
            ("CHAIN_ID", self.chain_id.as_ref()),
            ("BUNDLE_TRANSACTIONS", self.bundle_transactions.as_ref()),
            ("BUNDLE_ENDPOINT", self.bundle_endpoint.as_ref()),
            ("BUNDLE_IDENTITY_KEY", self.bundle_identity_key.as_ref()),
            ("RELAYER_TIMEOUT_MS", self.relayer_timeout_ms.as_ref()),
        ]
    }

    /// Set environment variables from parsed CLI arguments
    /// This ensures that the config module sees command-line overrides
    pub fn set_environment_variables(&self) -> Result<()> {
        use std::env;

        tracing::debug!("Setting environment variables from CLI arguments");

        let mut applied = 0usize;
        for (name, value) in self.pairs() {
            if let Some(value) = value {
                env::set_var(name, value);
                applied += 1;
            }
        }

        tracing::info!(
            applied = applied,
            endpoint1 = %self.endpoint1.as_deref().map(mask_url).unwrap_or_default(),
            endpoint2 = %self.endpoint2.as_deref().map(mask_url).unwrap_or_default(),
            has_private_key = self.private_key.is_some(),
            has_bundle_identity = self.bundle_identity_key.is_some(),
            "Environment variables set from CLI arguments"
        );

        Ok(())
    }
}

pub fn parse_cli_args() -> Result<Args> {
    let args = Args::parse();

    // Set environment variables from CLI arguments so that config module can find them
    args.set_environment_variables()?;

    Ok(args)
}
