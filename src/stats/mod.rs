//! CSV persistence of campaign results.
//!
//! One file per target, named `<target>-<region>.csv`, with the columns
//! `sent_at,txn_hash,included_in_block,inclusion_delay_ms`. Zero records of
//! failed dispatches are written like any other row.

use crate::dispatch::InclusionStats;
use crate::errors::StatsError;
use crate::utils::to_hex_prefixed;
use alloy::primitives::TxHash;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

type StatsResult<T> = std::result::Result<T, StatsError>;

/// Column names, written even when a campaign has no results.
pub const HEADER: [&str; 4] = [
    "sent_at",
    "txn_hash",
    "included_in_block",
    "inclusion_delay_ms",
];

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StatsRow {
    sent_at: String,
    txn_hash: String,
    included_in_block: u64,
    inclusion_delay_ms: u64,
}

impl From<&InclusionStats> for StatsRow {
    fn from(stats: &InclusionStats) -> Self {
        Self {
            sent_at: stats.sent_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            txn_hash: to_hex_prefixed(stats.tx_hash),
            included_in_block: stats.included_in_block,
            inclusion_delay_ms: stats.inclusion_delay.as_millis() as u64,
        }
    }
}

impl StatsRow {
    fn into_stats(self, path: &Path) -> StatsResult<InclusionStats> {
        let invalid = |message: String| StatsError::InvalidRecord {
            path: path.to_path_buf(),
            message,
        };

        let sent_at = DateTime::parse_from_rfc3339(&self.sent_at)
            .map_err(|e| invalid(format!("sent_at '{}': {}", self.sent_at, e)))?
            .with_timezone(&Utc);

        let tx_hash = TxHash::from_str(&self.txn_hash)
            .map_err(|e| invalid(format!("txn_hash '{}': {}", self.txn_hash, e)))?;

        Ok(InclusionStats {
            sent_at,
            tx_hash,
            included_in_block: self.included_in_block,
            inclusion_delay: Duration::from_millis(self.inclusion_delay_ms),
        })
    }
}

/// Writes campaign results under one output directory.
#[derive(Debug, Clone)]
pub struct StatsRecorder {
    output_dir: PathBuf,
    region: String,
}

impl StatsRecorder {
    pub fn new(output_dir: impl Into<PathBuf>, region: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            region: region.into(),
        }
    }

    /// File that results of `target` are written to.
    pub fn path_for(&self, target: &str) -> PathBuf {
        self.output_dir.join(format!("{}-{}.csv", target, self.region))
    }

    /// Write `results` for `target`, replacing any previous file.
    pub fn record(&self, target: &str, results: &[InclusionStats]) -> StatsResult<PathBuf> {
        let path = self.path_for(target);

        std::fs::create_dir_all(&self.output_dir).map_err(|source| StatsError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let write_err = |source| StatsError::Write {
            path: path.clone(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(write_err)?;
        writer.write_record(HEADER).map_err(write_err)?;
        for stats in results {
            writer.serialize(StatsRow::from(stats)).map_err(write_err)?;
        }
        writer.flush().map_err(|source| StatsError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            records = results.len(),
            "Results written"
        );

        Ok(path)
    }
}

/// Read back a file written by [`StatsRecorder::record`].
///
/// Delays come back truncated to whole milliseconds.
pub fn read_records(path: impl AsRef<Path>) -> StatsResult<Vec<InclusionStats>> {
    let path = path.as_ref();
    let read_err = |source| StatsError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
    reader
        .deserialize::<StatsRow>()
        .map(|row| row.map_err(read_err)?.into_stats(path))
        .collect()
}
