#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]

pub mod plan;
pub mod reader;
pub mod resolve;
pub mod summary;

use std::path::PathBuf;
use std::sync::Arc;

use manifold_core::types::{ContentSummary, FileSplit, FileSplitError, ResolvedTarget};
use manifold_fs::{Fs, FsError};
use manifold_observe::metrics::{Counter, Gauge};
use thiserror::Error;
use tracing::info;

pub use plan::PlannerConfig;
pub use reader::{LineRecordReader, RecordSource};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("No input paths specified in job.")]
    NoInputPaths,
    #[error("input target is a directory: {0}")]
    TargetIsDirectory(String),
    #[error("invalid split: {0}")]
    InvalidSplit(#[from] FileSplitError),
    #[error("filesystem error: {0}")]
    Fs(#[from] FsError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the configured input roots are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// The roots hold the data files themselves.
    Direct,
    /// The roots hold manifest files whose lines name the data files.
    Manifest,
}

/// Counters maintained across planning calls and the readers they open.
#[derive(Debug, Default)]
pub struct InputMetrics {
    pub targets_resolved_total: Counter,
    pub splits_planned_total: Counter,
    pub records_delivered_total: Counter,
    pub split_bytes_high_water: Gauge,
}

/// Planning and read entry points exposed to the execution framework.
///
/// Planning runs synchronously in the calling thread; every call resolves
/// the inputs fresh. The produced [`FileSplit`] values are self-contained,
/// so they can be handed to independent workers which open their own
/// readers via [`InputPlanner::open_split`].
#[derive(Clone)]
pub struct InputPlanner {
    fs: Arc<dyn Fs>,
    layout: InputLayout,
    cfg: PlannerConfig,
    metrics: Arc<InputMetrics>,
}

impl InputPlanner {
    pub fn new(fs: Arc<dyn Fs>, layout: InputLayout, cfg: PlannerConfig) -> Self {
        Self {
            fs,
            layout,
            cfg,
            metrics: Arc::new(InputMetrics::default()),
        }
    }

    pub fn metrics(&self) -> Arc<InputMetrics> {
        self.metrics.clone()
    }

    /// Aggregate size and file count over the logical input.
    pub fn content_summary(&self, inputs: &[PathBuf]) -> Result<ContentSummary, InputError> {
        let targets = self.resolve(inputs)?;
        let summary = summary::summarize(&targets);
        info!(
            target: "manifold_proof",
            event = "content_summary",
            total_length = summary.total_length,
            file_count = summary.file_count,
            "summarized input"
        );
        Ok(summary)
    }

    /// Partition the logical input into roughly `desired` splits.
    ///
    /// `desired` is advisory: short targets, slop merging and block
    /// alignment all shift the produced count.
    pub fn plan_splits(
        &self,
        inputs: &[PathBuf],
        desired: u32,
    ) -> Result<Vec<FileSplit>, InputError> {
        let targets = self.resolve(inputs)?;
        let splits = plan::plan_splits(&targets, desired, &self.cfg);
        self.metrics.splits_planned_total.inc_by(splits.len() as u64);
        for split in &splits {
            self.metrics.split_bytes_high_water.max(split.len);
        }
        info!(
            target: "manifold_proof",
            event = "splits_planned",
            targets = targets.len() as u64,
            desired = desired,
            splits = splits.len() as u64,
            "planned input splits"
        );
        Ok(splits)
    }

    /// Open a line-record stream over one split.
    ///
    /// The reader owns its file handle; dropping it (early close included)
    /// releases the handle. Restarting means calling this again with the
    /// same split value.
    pub fn open_split(&self, split: &FileSplit) -> Result<LineRecordReader, InputError> {
        split.validate()?;
        let reader = LineRecordReader::open(self.fs.as_ref(), split)?;
        Ok(reader.with_metrics(self.metrics.clone()))
    }

    fn resolve(&self, inputs: &[PathBuf]) -> Result<Vec<ResolvedTarget>, InputError> {
        validate_inputs(inputs)?;
        let targets = match self.layout {
            InputLayout::Direct => resolve::resolve_direct_targets(self.fs.as_ref(), inputs)?,
            InputLayout::Manifest => resolve::resolve_manifest_targets(self.fs.as_ref(), inputs)?,
        };
        self.metrics
            .targets_resolved_total
            .inc_by(targets.len() as u64);
        Ok(targets)
    }
}

/// Rejects an empty input-path configuration before any filesystem work.
fn validate_inputs(inputs: &[PathBuf]) -> Result<(), InputError> {
    if inputs.is_empty() {
        return Err(InputError::NoInputPaths);
    }
    Ok(())
}
