use super::{Check, CheckContext, CheckKind};
use crate::config::{
    weighted_penalty, HealthConfig, CRITICAL_SHARE, IMBALANCED_SHARE, LOW_COUNT_SHARE,
};
use crate::tree::{DatasetTree, Node};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Separator used when joining directory names into a class path.
pub const CLASS_PATH_SEPARATOR: &str = " > ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    Critical,
    LowCount,
    Imbalanced,
    Ok,
}

impl ClassStatus {
    /// Classify a population share given in percent. Bounds are exclusive.
    pub fn from_share(percentage: f64) -> Self {
        if percentage < CRITICAL_SHARE {
            Self::Critical
        } else if percentage < LOW_COUNT_SHARE {
            Self::LowCount
        } else if percentage < IMBALANCED_SHARE {
            Self::Imbalanced
        } else {
            Self::Ok
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "❌ Critical",
            Self::LowCount => "⚠ Low Count",
            Self::Imbalanced => "⚠ Imbalanced",
            Self::Ok => "OK",
        }
    }
}

/// One leaf directory treated as a labeled class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    /// Directory names from the root down to this class, joined with ` > `.
    pub path: String,
    pub count: usize,
    pub percentage: f64,
    pub status: ClassStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDistribution {
    /// Sorted by descending count; ties keep discovery order.
    pub classes: Vec<ClassEntry>,
    /// `max / min` count, absent when there are no classes.
    pub imbalance_ratio: Option<f64>,
}

impl ClassDistribution {
    pub fn total_files(&self) -> usize {
        self.classes.iter().map(|c| c.count).sum()
    }

    pub fn count_with_status(&self, status: ClassStatus) -> usize {
        self.classes.iter().filter(|c| c.status == status).count()
    }
}

pub struct ClassImbalanceCheck {
    low_count_weight: u32,
}

impl ClassImbalanceCheck {
    pub fn new(low_count_weight: u32) -> Self {
        Self { low_count_weight }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        Self::new(config.penalties.low_count_class)
    }
}

impl Check for ClassImbalanceCheck {
    type Output = ClassDistribution;

    fn kind(&self) -> CheckKind {
        CheckKind::ClassImbalance
    }

    fn run(&self, tree: &DatasetTree, _ctx: &CheckContext<'_>) -> ClassDistribution {
        let counts = collect_class_counts(tree.root());
        log::debug!("Found {} classes", counts.len());
        score_distribution(counts)
    }

    fn penalty(&self, output: &ClassDistribution) -> u32 {
        weighted_penalty(
            output.count_with_status(ClassStatus::LowCount),
            self.low_count_weight,
            None,
        )
    }
}

/// Breadth-first walk emitting `(name, class_path, file_count)` for every
/// leaf directory holding at least one file.
pub fn collect_class_counts(root: &Node) -> Vec<(String, String, usize)> {
    let mut classes = Vec::new();
    let mut seen = HashSet::new();
    let mut queue: VecDeque<(&Node, Vec<&str>)> = VecDeque::from([(root, Vec::new())]);

    while let Some((node, mut path)) = queue.pop_front() {
        path.push(&node.name);

        let mut has_subdirectories = false;
        let mut file_count = 0;
        for child in &node.children {
            if child.is_file {
                file_count += 1;
            } else {
                has_subdirectories = true;
                queue.push_back((child, path.clone()));
            }
        }

        if !has_subdirectories && file_count > 0 {
            let class_path = path.join(CLASS_PATH_SEPARATOR);
            if !seen.insert(class_path.clone()) {
                log::warn!("Class path '{}' appears more than once", class_path);
            }
            classes.push((node.name.clone(), class_path, file_count));
        }
    }

    classes
}

/// Sort classes by size and assign shares and statuses.
pub fn score_distribution(mut counts: Vec<(String, String, usize)>) -> ClassDistribution {
    if counts.is_empty() {
        return ClassDistribution::default();
    }

    counts.sort_by(|a, b| b.2.cmp(&a.2));
    let total: usize = counts.iter().map(|(_, _, n)| n).sum();
    let max = counts.first().map_or(0, |c| c.2);
    let min = counts.last().map_or(0, |c| c.2);
    let imbalance_ratio = (min > 0).then(|| max as f64 / min as f64);

    let classes = counts
        .into_iter()
        .map(|(name, path, count)| {
            let percentage = count as f64 / total as f64 * 100.0;
            ClassEntry {
                name,
                path,
                count,
                percentage,
                status: ClassStatus::from_share(percentage),
            }
        })
        .collect();

    ClassDistribution {
        classes,
        imbalance_ratio,
    }
}
