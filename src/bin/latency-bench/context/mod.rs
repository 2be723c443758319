//! Wiring of a benchmark run.
//!
//! Endpoints are connected once at startup and reused for every call. The
//! optional bundle run goes first, then the campaigns in target order, and
//! result files are written only after every campaign has finished.

pub mod summary;

use flashblocks_latency::{
    builders::CampaignRunnerBuilder,
    bundle::{BundleAssembler, RelayClient},
    campaign::{Campaign, CampaignRunner, CampaignTarget},
    config::BenchConfig,
    endpoint::{Endpoint, RpcEndpoint},
    errors::{ConfigError, Result},
    stats::StatsRecorder,
};
use std::sync::Arc;
use summary::RunSummary;

/// Name of the fast-confirmation target, also its file name prefix.
pub const ENDPOINT1: &str = "endpoint1";

/// Name of the standard target.
pub const ENDPOINT2: &str = "endpoint2";

struct BundleRun {
    assembler: BundleAssembler,
    endpoint: Arc<dyn Endpoint>,
    transactions: usize,
}

pub struct Context {
    runner: CampaignRunner,
    targets: Vec<CampaignTarget>,
    recorder: StatsRecorder,
    bundle: Option<BundleRun>,
}

impl Context {
    pub async fn new(config: BenchConfig) -> Result<Self> {
        let timeout_ms = config.bundle.timeout_ms;

        let endpoint1: Arc<dyn Endpoint> = Arc::new(RpcEndpoint::connect(
            ENDPOINT1,
            config.endpoint1_url.clone(),
            timeout_ms,
        )?);
        let endpoint2: Arc<dyn Endpoint> = Arc::new(RpcEndpoint::connect(
            ENDPOINT2,
            config.endpoint2_url.clone(),
            timeout_ms,
        )?);

        let chain_id = match config.chain_id {
            Some(chain_id) => chain_id,
            None => endpoint2.chain_id().await.map_err(|e| ConfigError::InvalidValue {
                name: "CHAIN_ID".to_string(),
                message: format!("failed to query chain id from {}: {}", ENDPOINT2, e),
            })?,
        };

        let runner = CampaignRunnerBuilder::from_config(&config)
            .with_chain_id(chain_id)
            .build()?;

        let mode = config.dispatch_mode();
        let mut targets = vec![CampaignTarget::new(ENDPOINT1, endpoint1)
            .with_mode(mode)
            .with_transactions(config.transactions)
            .with_pacing(config.endpoint1_pacing())];

        if config.run_endpoint2 {
            targets.push(
                CampaignTarget::new(ENDPOINT2, endpoint2)
                    .with_mode(mode)
                    .with_transactions(config.transactions)
                    .with_pacing(config.endpoint2_pacing()),
            );
        } else {
            tracing::info!("Skipping endpoint2 transactions (RUN_ENDPOINT2_TESTING=false)");
        }

        let bundle = if config.bundle.is_enabled() {
            let relay = RelayClient::new(
                config.bundle.endpoint_url.clone(),
                timeout_ms,
                config.bundle.identity.clone(),
            )?;
            let endpoint = RpcEndpoint::connect("bundle", config.bundle.endpoint_url.clone(), timeout_ms)?
                .with_relay(relay);

            Some(BundleRun {
                assembler: BundleAssembler::new(runner.builder().clone()),
                endpoint: Arc::new(endpoint),
                transactions: config.bundle.transactions,
            })
        } else {
            None
        };

        tracing::info!(
            chain_id = chain_id,
            sender = %runner.builder().intent().from,
            recipient = %runner.builder().intent().to,
            targets = targets.len(),
            sync = mode.is_sync(),
            bundle_enabled = bundle.is_some(),
            "Benchmark context initialized"
        );

        Ok(Self {
            runner,
            targets,
            recorder: StatsRecorder::new(config.output_dir, config.region),
            bundle,
        })
    }

    /// Run the bundle attempt and every campaign, then persist the results.
    pub async fn run(&self) -> Result<RunSummary> {
        if let Some(bundle) = &self.bundle {
            self.run_bundle(bundle).await;
        }

        let campaigns = self.runner.run(&self.targets).await;
        self.write_results(&campaigns)?;

        Ok(RunSummary::from_campaigns(&campaigns))
    }

    async fn run_bundle(&self, bundle: &BundleRun) {
        match bundle
            .assembler
            .submit(bundle.endpoint.as_ref(), bundle.transactions)
            .await
        {
            Ok(submission) => tracing::info!(
                bundle_id = submission.bundle_id(),
                target_block = submission.target_block(),
                tx_count = submission.tx_hashes().len(),
                "Bundle run finished"
            ),
            Err(e) => tracing::error!(error = %e, "Bundle run failed"),
        }
    }

    fn write_results(&self, campaigns: &[Campaign]) -> Result<()> {
        for campaign in campaigns {
            self.recorder.record(campaign.target(), campaign.results())?;
        }
        Ok(())
    }
}
