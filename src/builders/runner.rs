//! Builder pattern for CampaignRunner

use crate::campaign::{CampaignRunner, DEFAULT_SETTLE_DELAY};
use crate::config::BenchConfig;
use crate::dispatch::{Clock, Dispatcher, SystemClock, MAX_POLL_ATTEMPTS};
use crate::errors::{ConfigError, Result};
use crate::transaction::TransactionBuilder;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating CampaignRunner instances with a fluent API
pub struct CampaignRunnerBuilder {
    chain_id: Option<u64>,
    signer: Option<PrivateKeySigner>,
    recipient: Option<Address>,
    clock: Arc<dyn Clock>,
    settle_delay: Duration,
    max_poll_attempts: u32,
}

impl CampaignRunnerBuilder {
    /// Create a new CampaignRunnerBuilder using the system clock
    pub fn new() -> Self {
        Self {
            chain_id: None,
            signer: None,
            recipient: None,
            clock: Arc::new(SystemClock),
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_poll_attempts: MAX_POLL_ATTEMPTS,
        }
    }

    /// Take signer and recipient from a loaded configuration
    ///
    /// The chain id still has to be supplied when the configuration does not
    /// carry an override.
    pub fn from_config(config: &BenchConfig) -> Self {
        let builder = Self::new()
            .with_signer(config.signer.clone())
            .with_recipient(config.recipient);

        match config.chain_id {
            Some(chain_id) => builder.with_chain_id(chain_id),
            None => builder,
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_signer(mut self, signer: PrivateKeySigner) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Replace the clock used for timestamps, polling and pacing
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_max_poll_attempts(mut self, max_poll_attempts: u32) -> Self {
        self.max_poll_attempts = max_poll_attempts;
        self
    }

    /// Build the transaction builder alone
    ///
    /// # Errors
    ///
    /// Returns an error if chain id, signer or recipient was not provided
    pub fn build_transaction_builder(&self) -> Result<TransactionBuilder> {
        let chain_id = self.chain_id.ok_or_else(|| missing("chain id"))?;
        let signer = self.signer.clone().ok_or_else(|| missing("signer"))?;
        let recipient = self.recipient.ok_or_else(|| missing("recipient"))?;

        Ok(TransactionBuilder::new(chain_id, signer, recipient))
    }

    /// Build the CampaignRunner
    ///
    /// # Errors
    ///
    /// Returns an error if chain id, signer or recipient was not provided
    pub fn build(self) -> Result<CampaignRunner> {
        let builder = self.build_transaction_builder()?;
        let dispatcher =
            Dispatcher::new(self.clock.clone()).with_max_poll_attempts(self.max_poll_attempts);

        Ok(CampaignRunner::new(builder, self.clock)
            .with_dispatcher(dispatcher)
            .with_settle_delay(self.settle_delay))
    }
}

impl Default for CampaignRunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(field: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: "CampaignRunnerBuilder".to_string(),
        message: format!("{} is required", field),
    }
}
