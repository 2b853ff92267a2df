//! Fluent construction of a [`HealthPipeline`].

use super::HealthPipeline;
use crate::checks::CheckKind;
use crate::config::{validate_config, HealthConfig};
use crate::errors::Result;
use crate::pool::Pools;
use crate::progress::{ProgressConfig, ProgressManager};
use crate::report::DEFAULT_REPORT_NAME;

/// Builder for [`HealthPipeline`].
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = PipelineBuilder::new(config)
///     .check(CheckKind::Duplicate)
///     .when(args.quality, |p| p.check(CheckKind::Quality))
///     .with_progress()
///     .build()?;
/// ```
pub struct PipelineBuilder {
    checks: Vec<CheckKind>,
    config: HealthConfig,
    progress_enabled: bool,
    report_name: String,
}

impl PipelineBuilder {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            checks: Vec::new(),
            config,
            progress_enabled: false,
            report_name: DEFAULT_REPORT_NAME.to_string(),
        }
    }

    /// Start from the checks named in the config, if any.
    pub fn from_config(config: HealthConfig) -> Result<Self> {
        let selected = match &config.checks {
            Some(names) => CheckKind::from_names(names.iter().map(String::as_str))?,
            None => Vec::new(),
        };
        Ok(Self::new(config).checks(selected))
    }

    /// Append a check. Repeats are ignored.
    pub fn check(mut self, kind: CheckKind) -> Self {
        if self.checks.contains(&kind) {
            log::debug!("Check '{}' already scheduled, ignoring repeat", kind);
        } else {
            self.checks.push(kind);
        }
        self
    }

    pub fn checks(self, kinds: impl IntoIterator<Item = CheckKind>) -> Self {
        kinds.into_iter().fold(self, Self::check)
    }

    pub fn with_default_checks(self) -> Self {
        self.checks(CheckKind::ALL)
    }

    /// Apply `f` only when `condition` holds.
    pub fn when<F>(self, condition: bool, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if condition {
            f(self)
        } else {
            self
        }
    }

    pub fn with_progress(mut self) -> Self {
        self.progress_enabled = true;
        self
    }

    pub fn report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = name.into();
        self
    }

    /// Validate the config and create the worker pools.
    ///
    /// With no checks selected, every check runs in default order.
    pub fn build(self) -> Result<HealthPipeline> {
        validate_config(&self.config)?;
        let pools = Pools::from_config(&self.config.parallel)?;

        let checks = if self.checks.is_empty() {
            CheckKind::ALL.to_vec()
        } else {
            self.checks
        };

        let progress = self
            .progress_enabled
            .then(|| ProgressManager::new(ProgressConfig::from_env(false)));

        Ok(HealthPipeline::new(
            checks,
            self.config,
            pools,
            progress,
            self.report_name,
        ))
    }
}
