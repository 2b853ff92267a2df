// Export modules for library usage
pub mod checks;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod observability;
pub mod pipeline;
pub mod pool;
pub mod progress;
pub mod report;
pub mod tree;

// Re-export commonly used types
pub use crate::checks::{
    Check, CheckContext, CheckKind, CheckOutcome, CheckOutput, ClassDistribution, ClassStatus,
    CorruptFile, CorruptReason, DuplicateGroup, DuplicateReport, IssueCategory, QualityIssue,
};

pub use crate::cleaner::{CleanSummary, Cleaner, QuarantineBucket};

pub use crate::config::HealthConfig;

pub use crate::errors::{HealthError, Result};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::pipeline::{scan, HealthPipeline, PipelineBuilder, PipelineState};

pub use crate::report::{HealthReport, HealthScore, HealthStatus};

pub use crate::tree::{DatasetTree, Node};
