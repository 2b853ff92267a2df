//! Check orchestration.
//!
//! A [`HealthPipeline`] runs its checks one after another over a read-only
//! [`DatasetTree`], merges each result into the report, sums the penalties
//! into the health score and stamps the scan duration. Concurrency lives
//! inside the checks; the pipeline itself is sequential.

mod builder;

pub use builder::PipelineBuilder;

use crate::checks::{CheckContext, CheckKind};
use crate::config::HealthConfig;
use crate::errors::Result;
use crate::observability::{
    increment_checks_completed, set_checks_total, set_phase, PerfSpan, ScanPhase,
};
use crate::pool::Pools;
use crate::progress::{ProgressManager, TEMPLATE_CHECKS};
use crate::report::{HealthReport, ScanSummary};
use crate::tree::{DatasetTree, TreeOptions};
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running { index: usize, check: CheckKind },
    Finalized,
}

pub struct HealthPipeline {
    checks: Vec<CheckKind>,
    config: HealthConfig,
    pools: Pools,
    progress: Option<ProgressManager>,
    report_name: String,
    state: PipelineState,
}

impl HealthPipeline {
    pub(crate) fn new(
        checks: Vec<CheckKind>,
        config: HealthConfig,
        pools: Pools,
        progress: Option<ProgressManager>,
        report_name: String,
    ) -> Self {
        Self {
            checks,
            config,
            pools,
            progress,
            report_name,
            state: PipelineState::Idle,
        }
    }

    pub fn checks(&self) -> &[CheckKind] {
        &self.checks
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Run every check over `tree` and return the finished report.
    ///
    /// A pipeline can run again; each run starts a fresh report.
    pub fn run(&mut self, tree: &DatasetTree) -> HealthReport {
        let started = Instant::now();
        let mut report = HealthReport::new(&self.report_name, tree.root().path.clone());
        report.set_summary(ScanSummary {
            scan_duration_sec: None,
            total_files: tree.file_count(),
            total_directories: tree.directory_count(),
            checks_run: self.checks.clone(),
        });

        set_checks_total(self.checks.len());
        let bar = self.progress.as_ref().map_or_else(ProgressBar::hidden, |p| {
            p.create_bar(self.checks.len() as u64, TEMPLATE_CHECKS)
        });

        let ctx = CheckContext {
            config: &self.config,
            pools: &self.pools,
        };
        let max_examples = self.config.output.max_examples;
        let mut penalties = BTreeMap::new();

        for (index, &check) in self.checks.iter().enumerate() {
            self.state = PipelineState::Running { index, check };
            let _phase = set_phase(ScanPhase::Check(check));
            bar.set_message(check.display_name());
            log::info!(
                "[{}/{}] Running {}",
                index + 1,
                self.checks.len(),
                check.display_name()
            );

            let span = PerfSpan::start(check.display_name());
            let outcome = check.execute(tree, &ctx);
            report.push_perf_entry(span.finish());

            log::info!("{} done, penalty {}", check.display_name(), outcome.penalty);
            penalties.insert(check, outcome.penalty);
            report.apply_outcome(outcome, max_examples);

            increment_checks_completed();
            bar.inc(1);
        }
        bar.finish_and_clear();

        report.set_health_score(penalties);
        report.finalize_scan(started.elapsed());
        self.state = PipelineState::Finalized;

        if let Some(score) = &report.health_score {
            log::info!("Health score {} ({:?})", score.score, score.status);
        }
        report
    }
}

/// Build the tree for `root` and run `pipeline` over it.
pub fn scan(root: &Path, pipeline: &mut HealthPipeline) -> Result<(DatasetTree, HealthReport)> {
    let options = TreeOptions::from_config(&pipeline.config().tree)?;
    let spinner = pipeline
        .progress
        .as_ref()
        .map(|p| p.create_spinner("Building dataset tree"));
    let tree = {
        let _phase = set_phase(ScanPhase::TreeBuilding);
        DatasetTree::build_with_options(root, &options)
    };
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let tree = tree?;
    log::info!(
        "Dataset tree: {} files in {} directories",
        tree.file_count(),
        tree.directory_count()
    );
    let report = pipeline.run(&tree);
    Ok((tree, report))
}
