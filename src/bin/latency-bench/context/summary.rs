//! End-of-run summary.

use flashblocks_latency::campaign::Campaign;

/// Per-target totals of one run.
#[derive(Debug, Clone, Default)]
pub struct TargetSummary {
    pub target: String,
    pub transactions: usize,
    pub errors: usize,
    pub mean_inclusion_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub targets: Vec<TargetSummary>,
}

impl RunSummary {
    pub fn from_campaigns(campaigns: &[Campaign]) -> Self {
        let targets = campaigns
            .iter()
            .map(|campaign| TargetSummary {
                target: campaign.target().to_string(),
                transactions: campaign.len(),
                errors: campaign.error_count(),
                mean_inclusion_delay_ms: campaign
                    .mean_inclusion_delay()
                    .map(|d| d.as_millis() as u64),
            })
            .collect();

        Self { targets }
    }

    pub fn total_errors(&self) -> usize {
        self.targets.iter().map(|t| t.errors).sum()
    }

    pub fn log(&self) {
        for target in &self.targets {
            tracing::info!(
                campaign = %target.target,
                transactions = target.transactions,
                errors = target.errors,
                mean_inclusion_delay_ms = ?target.mean_inclusion_delay_ms,
                "Target summary"
            );
        }

        tracing::info!(
            targets = self.targets.len(),
            total_errors = self.total_errors(),
            "Completed benchmark run"
        );
    }
}
