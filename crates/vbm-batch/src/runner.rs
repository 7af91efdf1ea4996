//! Parallel execution of a grid against a shared dataset.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};
use vbm_core::{AnalysisConfig, ErrorInfo, PanelDataset, PanelError};
use vbm_fit::{FitMetadata, RegressionExecutor, RegressionResult};
use vbm_grid::describe_config;
use vbm_panel::{apply_filters, prepare_outcome, FilterRequest, PanelView};

use crate::config::RunOpts;
use crate::record::{CompiledRecord, RunStats};

#[derive(Default)]
struct Counters {
    attempted: AtomicUsize,
    succeeded: AtomicUsize,
    config_errors: AtomicUsize,
    insufficient_data: AtomicUsize,
    fit_failures: AtomicUsize,
}

impl Counters {
    fn record(&self, outcome: &Result<CompiledRecord, PanelError>) -> usize {
        let counter = match outcome {
            Ok(_) => &self.succeeded,
            Err(PanelError::InsufficientData(_)) => &self.insufficient_data,
            Err(PanelError::Fit(_)) => &self.fit_failures,
            Err(_) => &self.config_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.attempted.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn snapshot(&self) -> RunStats {
        let config_errors = self.config_errors.load(Ordering::Relaxed);
        let insufficient_data = self.insufficient_data.load(Ordering::Relaxed);
        let fit_failures = self.fit_failures.load(Ordering::Relaxed);
        RunStats {
            attempted: self.attempted.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: config_errors + insufficient_data + fit_failures,
            config_errors,
            insufficient_data,
            fit_failures,
        }
    }
}

/// Records and failures of one batch, both in grid order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// Successful analyses.
    pub records: Vec<CompiledRecord>,
    /// Per-analysis failures keyed by analysis id (or entry index when the
    /// entry could not be decoded).
    pub failures: Vec<(String, PanelError)>,
    /// Final counters.
    pub stats: RunStats,
}

/// Runs analysis configurations against one shared dataset.
pub struct BatchRunner {
    dataset: Arc<PanelDataset>,
    opts: RunOpts,
    executor: RegressionExecutor,
}

impl BatchRunner {
    /// Creates a runner over `dataset`.
    pub fn new(dataset: Arc<PanelDataset>, opts: RunOpts) -> Self {
        let executor = RegressionExecutor::new(opts.fit);
        Self {
            dataset,
            opts,
            executor,
        }
    }

    /// Options in use.
    pub fn opts(&self) -> &RunOpts {
        &self.opts
    }

    /// Runs every configuration.
    pub fn run(&self, configs: &[AnalysisConfig]) -> Result<BatchOutcome, PanelError> {
        let entries: Vec<Result<&AnalysisConfig, PanelError>> = configs.iter().map(Ok).collect();
        self.run_slots(&entries)
    }

    /// Runs decoded grid entries; undecodable entries count as
    /// configuration failures.
    pub fn run_entries(
        &self,
        entries: &[Result<AnalysisConfig, PanelError>],
    ) -> Result<BatchOutcome, PanelError> {
        let entries: Vec<Result<&AnalysisConfig, PanelError>> = entries
            .iter()
            .map(|entry| entry.as_ref().map_err(Clone::clone))
            .collect();
        self.run_slots(&entries)
    }

    fn run_slots(
        &self,
        entries: &[Result<&AnalysisConfig, PanelError>],
    ) -> Result<BatchOutcome, PanelError> {
        let total = entries.len();
        info!(
            total,
            concurrency = self.opts.concurrency,
            min_obs = self.opts.min_obs,
            "running analyses"
        );
        let counters = Counters::default();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.opts.concurrency.max(1))
            .build()
            .map_err(|err| PanelError::Io(ErrorInfo::new("thread-pool", err.to_string())))?;

        let mut ordered: Vec<(usize, String, Result<CompiledRecord, PanelError>)> =
            pool.install(|| {
                entries
                    .par_iter()
                    .enumerate()
                    .map(|(index, entry)| {
                        let (key, outcome) = match entry {
                            Ok(config) => (config.id.clone(), self.run_one(config)),
                            Err(err) => (format!("entry_{index}"), Err(err.clone())),
                        };
                        let attempted = counters.record(&outcome);
                        if self.opts.progress_every > 0 && attempted % self.opts.progress_every == 0
                        {
                            let stats = counters.snapshot();
                            info!(
                                attempted,
                                total,
                                succeeded = stats.succeeded,
                                failed = stats.failed,
                                "progress {:.1}%",
                                100.0 * attempted as f64 / total as f64
                            );
                        }
                        (index, key, outcome)
                    })
                    .collect()
            });
        ordered.sort_by_key(|(index, _, _)| *index);

        let mut records = Vec::new();
        let mut failures = Vec::new();
        for (_, key, outcome) in ordered {
            match outcome {
                Ok(record) => records.push(record),
                Err(err) => failures.push((key, err)),
            }
        }
        let stats = counters.snapshot();
        if stats.fit_failures > 0 {
            warn!(fit_failures = stats.fit_failures, "some regressions failed");
        }
        info!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            config_errors = stats.config_errors,
            insufficient_data = stats.insufficient_data,
            "completed analyses"
        );
        Ok(BatchOutcome {
            records,
            failures,
            stats,
        })
    }

    /// Runs one configuration through filter, preparation, fit and
    /// description.
    pub fn run_one(&self, config: &AnalysisConfig) -> Result<CompiledRecord, PanelError> {
        let request = FilterRequest::from(config);
        let (view, filter_desc) = apply_filters(&PanelView::full(&self.dataset), &request);
        self.ensure_rows(config, "filter", view.len())?;
        let prepared = prepare_outcome(&view, config.outcome);
        self.ensure_rows(config, "prepare", prepared.len())?;

        let fit = self.executor.fit(
            &prepared,
            config.specification,
            config.weighted,
            config.cluster_level,
        );
        let fit = fit.map_err(|failure| {
            debug!(id = %config.id, kind = failure.kind.code(), "fit failed");
            PanelError::Fit(
                ErrorInfo::new(failure.kind.code(), failure.message)
                    .with_context("analysis", config.id.clone()),
            )
        })?;
        let metadata = FitMetadata::new(
            config.outcome,
            config.specification,
            config.weighted,
            config.cluster_level,
        );
        Ok(CompiledRecord {
            config: config.clone(),
            description: describe_config(config, &filter_desc),
            filter_desc,
            result: RegressionResult::from_fit(Ok(fit), metadata),
            embedding: None,
        })
    }

    fn ensure_rows(
        &self,
        config: &AnalysisConfig,
        stage: &str,
        rows: usize,
    ) -> Result<(), PanelError> {
        if rows >= self.opts.min_obs {
            return Ok(());
        }
        debug!(id = %config.id, stage, rows, "skipping analysis below min_obs");
        Err(PanelError::InsufficientData(
            ErrorInfo::new(
                "min-obs",
                format!("{rows} rows after {stage}, need {}", self.opts.min_obs),
            )
            .with_context("analysis", config.id.clone()),
        ))
    }
}
