//! Progress feedback for pipeline runs, built on `indicatif`.
//!
//! - **Quiet mode**: no progress output (`--no-progress` or the
//!   `DATASET_HEALTH_QUIET` environment variable)
//! - **Non-TTY**: bars are hidden when stderr is not a terminal, so CI logs
//!   and piped output stay clean

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

pub const TEMPLATE_CHECKS: &str = "🩺 {msg} [{bar:30}] {pos}/{len} checks - {elapsed}";
pub const TEMPLATE_SPINNER: &str = "{spinner} {msg}";

pub const QUIET_ENV_VAR: &str = "DATASET_HEALTH_QUIET";

#[derive(Debug, Clone, Default)]
pub struct ProgressConfig {
    pub quiet_mode: bool,
}

impl ProgressConfig {
    pub fn from_env(quiet: bool) -> Self {
        Self {
            quiet_mode: quiet || std::env::var_os(QUIET_ENV_VAR).is_some(),
        }
    }

    pub fn should_show_progress(&self) -> bool {
        !self.quiet_mode && std::io::stderr().is_terminal()
    }
}

/// Creates bars that share one terminal region.
#[derive(Clone)]
pub struct ProgressManager {
    multi: Arc<MultiProgress>,
    config: ProgressConfig,
}

impl ProgressManager {
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            multi: Arc::new(MultiProgress::new()),
            config,
        }
    }

    /// A bar of `len` steps, hidden when progress should not be shown.
    pub fn create_bar(&self, len: u64, template: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  ");
        let pb = self.multi.add(ProgressBar::new(len));
        pb.set_style(style);
        pb
    }

    pub fn create_spinner(&self, msg: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_spinner()
            .template(TEMPLATE_SPINNER)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

impl std::fmt::Debug for ProgressManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressManager")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_quiet_flag() {
        let config = ProgressConfig::from_env(true);
        assert!(!config.should_show_progress());
    }

    #[test]
    fn test_quiet_manager_creates_hidden_bars() {
        let manager = ProgressManager::new(ProgressConfig { quiet_mode: true });
        assert!(manager.create_bar(4, TEMPLATE_CHECKS).is_hidden());
        assert!(manager.create_spinner("Building tree").is_hidden());
    }

    #[test]
    fn test_templates_parse() {
        assert!(ProgressStyle::default_bar().template(TEMPLATE_CHECKS).is_ok());
        assert!(ProgressStyle::default_spinner().template(TEMPLATE_SPINNER).is_ok());
    }
}
