//! Campaign execution against one or more endpoints.
//!
//! A campaign is `N` strictly sequential build-and-dispatch iterations
//! against a single [`CampaignTarget`]. Each iteration yields exactly one
//! [`InclusionStats`]: the real record on success, the zero record on any
//! failure. Failures are counted and logged; they never end a campaign early.
//!
//! Targets run one after the other in list order, separated by a fixed
//! settling delay so pending transactions of one endpoint do not overlap the
//! next campaign.

pub mod pacing;

pub use pacing::{
    PacingPolicy, DEFAULT_SETTLE_DELAY, FAST_ASYNC_PACING, FAST_SYNC_PACING, STANDARD_PACING,
};

use crate::dispatch::{Clock, DispatchMode, Dispatcher, InclusionStats};
use crate::endpoint::Endpoint;
use crate::errors::Result;
use crate::transaction::{NonceSource, TransactionBuilder};
use std::sync::Arc;
use std::time::Duration;

/// One named endpoint together with how it is exercised.
#[derive(Clone)]
pub struct CampaignTarget {
    pub name: String,
    pub endpoint: Arc<dyn Endpoint>,
    pub mode: DispatchMode,
    pub transactions: usize,
    pub pacing: PacingPolicy,
    pub nonce_source: NonceSource,
}

impl CampaignTarget {
    pub fn new(name: impl Into<String>, endpoint: Arc<dyn Endpoint>) -> Self {
        Self {
            name: name.into(),
            endpoint,
            mode: DispatchMode::default(),
            transactions: 0,
            pacing: PacingPolicy::default(),
            nonce_source: NonceSource::Pending,
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_transactions(mut self, transactions: usize) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_nonce_source(mut self, nonce_source: NonceSource) -> Self {
        self.nonce_source = nonce_source;
        self
    }
}

impl std::fmt::Debug for CampaignTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CampaignTarget")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint.name())
            .field("mode", &self.mode)
            .field("transactions", &self.transactions)
            .field("pacing", &self.pacing)
            .field("nonce_source", &self.nonce_source)
            .finish()
    }
}

/// Results of one campaign, in dispatch order.
#[derive(Debug, Clone, Default)]
pub struct Campaign {
    target: String,
    results: Vec<InclusionStats>,
    errors: usize,
}

impl Campaign {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            results: Vec::new(),
            errors: 0,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Every record, zero records of failed dispatches included.
    pub fn results(&self) -> &[InclusionStats] {
        &self.results
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Records of successful dispatches only.
    pub fn confirmed(&self) -> impl Iterator<Item = &InclusionStats> {
        self.results.iter().filter(|stats| !stats.is_zero())
    }

    /// Mean inclusion delay over successful dispatches.
    pub fn mean_inclusion_delay(&self) -> Option<Duration> {
        let (count, total) = self
            .confirmed()
            .fold((0u32, Duration::ZERO), |(n, sum), stats| (n + 1, sum + stats.inclusion_delay));
        (count > 0).then(|| total / count)
    }

    fn record_success(&mut self, stats: InclusionStats) {
        self.results.push(stats);
    }

    fn record_failure(&mut self) {
        self.results.push(InclusionStats::default());
        self.errors += 1;
    }
}

/// Runs campaigns with one signing account.
pub struct CampaignRunner {
    builder: TransactionBuilder,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
    settle_delay: Duration,
}

impl CampaignRunner {
    pub fn new(builder: TransactionBuilder, clock: Arc<dyn Clock>) -> Self {
        Self {
            builder,
            dispatcher: Dispatcher::new(clock.clone()),
            clock,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    /// Run every target in order, settling between consecutive campaigns.
    pub async fn run(&self, targets: &[CampaignTarget]) -> Vec<Campaign> {
        let mut campaigns = Vec::with_capacity(targets.len());

        for (index, target) in targets.iter().enumerate() {
            if index > 0 {
                tracing::info!(
                    settle_ms = self.settle_delay.as_millis() as u64,
                    next_campaign = %target.name,
                    "Settling before next campaign"
                );
                self.clock.sleep(self.settle_delay).await;
            }
            campaigns.push(self.run_campaign(target).await);
        }

        campaigns
    }

    /// Run `target.transactions` dispatches against one target.
    pub async fn run_campaign(&self, target: &CampaignTarget) -> Campaign {
        tracing::info!(
            campaign = %target.name,
            transactions = target.transactions,
            sync = target.mode.is_sync(),
            "Starting campaign"
        );

        let mut campaign = Campaign::new(target.name.clone());

        for iteration in 0..target.transactions {
            match self.attempt(target).await {
                Ok(stats) => {
                    tracing::debug!(
                        campaign = %target.name,
                        iteration = iteration,
                        tx_hash = %stats.tx_hash,
                        block = stats.included_in_block,
                        inclusion_delay_ms = stats.inclusion_delay.as_millis() as u64,
                        "Dispatch recorded"
                    );
                    campaign.record_success(stats);
                }
                Err(e) => {
                    tracing::warn!(
                        campaign = %target.name,
                        iteration = iteration,
                        error = %e,
                        "Failed to send transaction"
                    );
                    campaign.record_failure();
                }
            }

            self.clock.sleep(target.pacing.next_delay()).await;
        }

        tracing::info!(
            campaign = %target.name,
            transactions = campaign.len(),
            errors = campaign.error_count(),
            "Campaign finished"
        );

        campaign
    }

    async fn attempt(&self, target: &CampaignTarget) -> Result<InclusionStats> {
        let tx = self
            .builder
            .build(target.endpoint.as_ref(), target.nonce_source)
            .await?;

        tracing::trace!(campaign = %target.name, tx_hash = %tx.hash(), nonce = tx.nonce(), "Transaction built");

        let stats = self
            .dispatcher
            .dispatch(target.endpoint.as_ref(), &tx, target.mode)
            .await?;

        Ok(stats)
    }
}
