use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use anyhow::Context;
use tracing::{error, info};
use wrestledraft_ingest::{LoadMode, load_results, load_roster};
use wrestledraft_scoring::{ScoringConfig, ScoringReport, run};

/// Where a scoring run reads its inputs from.
#[derive(Clone, Debug)]
pub struct Sources {
    pub roster_path: PathBuf,
    pub results_path: PathBuf,
    pub load_mode: LoadMode,
}

impl Sources {
    /// Load both inputs from disk and score them from scratch.
    ///
    /// A file that cannot be loaded yields an empty report marked
    /// `cannot_proceed` instead of an error.
    pub fn score(&self, config: &ScoringConfig) -> ScoringReport {
        let start = Instant::now();
        let inputs = load_roster(&self.roster_path, self.load_mode).and_then(|roster| {
            load_results(&self.results_path, self.load_mode)
                .with_context(|| format!("results for {} drafted wrestlers", roster.len()))
                .map(|text| (roster, text))
        });
        let (roster, text) = match inputs {
            Ok(inputs) => inputs,
            Err(err) => {
                error!("cannot load scoring inputs: {err:#}");
                return ScoringReport::cannot_proceed(format!("{err:#}"));
            }
        };

        let report = run(&roster, &text, config);
        info!(
            "scored {} wrestlers across {} teams in {} ms",
            report.wrestlers.len(),
            report.standings.len(),
            start.elapsed().as_millis()
        );
        report
    }
}

#[derive(Clone)]
pub struct AppState {
    pub report: Arc<RwLock<Arc<ScoringReport>>>,
    pub sources: Arc<Sources>,
    pub config: Arc<ScoringConfig>,
}

impl AppState {
    pub fn new(sources: Sources, config: ScoringConfig, report: ScoringReport) -> Self {
        Self {
            report: Arc::new(RwLock::new(Arc::new(report))),
            sources: Arc::new(sources),
            config: Arc::new(config),
        }
    }

    /// Score the configured sources once and wrap the result.
    pub fn load(sources: Sources, config: ScoringConfig) -> Self {
        let report = sources.score(&config);
        Self::new(sources, config, report)
    }

    /// The current report. Readers hold their own `Arc`, so a concurrent
    /// update never waits on them.
    pub fn snapshot(&self) -> Arc<ScoringReport> {
        let guard = self
            .report
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    pub fn replace(&self, report: ScoringReport) -> Arc<ScoringReport> {
        let report = Arc::new(report);
        let mut guard = self
            .report
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::clone(&report);
        report
    }
}
