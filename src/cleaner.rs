//! Quarantine of files flagged by a report.
//!
//! Flagged files are moved, never deleted, into
//! `<dataset>/_quarantine/{corrupt,duplicates,suspicious}/<relative path>`.
//! The first file of every duplicate group stays in place. A file flagged by
//! several checks is moved once, into the first bucket that names it.

use crate::errors::{HealthError, Result};
use crate::report::HealthReport;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const QUARANTINE_DIR: &str = "_quarantine";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineBucket {
    Corrupt,
    Duplicates,
    Suspicious,
}

impl QuarantineBucket {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Corrupt => "corrupt",
            Self::Duplicates => "duplicates",
            Self::Suspicious => "suspicious",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bucket: QuarantineBucket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedMove {
    pub source: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub moved: Vec<MoveRecord>,
    /// Flagged files that no longer exist.
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<FailedMove>,
}

impl CleanSummary {
    pub fn moved_count(&self, bucket: QuarantineBucket) -> usize {
        self.moved.iter().filter(|m| m.bucket == bucket).count()
    }

    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
    }
}

pub struct Cleaner<'a> {
    dataset_root: PathBuf,
    quarantine_dir: PathBuf,
    report: &'a HealthReport,
}

impl<'a> Cleaner<'a> {
    pub fn new(dataset_root: impl AsRef<Path>, report: &'a HealthReport) -> Result<Self> {
        let root = dataset_root.as_ref();
        let dataset_root = fs::canonicalize(root).map_err(|e| {
            HealthError::filesystem_with_source("Cannot resolve dataset root", root, e)
        })?;
        let quarantine_dir = dataset_root.join(QUARANTINE_DIR);
        Ok(Self {
            dataset_root,
            quarantine_dir,
            report,
        })
    }

    pub fn quarantine_dir(&self) -> &Path {
        &self.quarantine_dir
    }

    /// Move every flagged file into quarantine.
    ///
    /// Only failing to create the quarantine folder is an error. Individual
    /// failed moves are logged and listed in the summary.
    pub fn clean(&self) -> Result<CleanSummary> {
        fs::create_dir_all(&self.quarantine_dir).map_err(|e| {
            HealthError::io_with_path("Failed to create quarantine folder", &self.quarantine_dir, e)
        })?;
        log::info!("Cleaning dataset, quarantine folder: {}", self.quarantine_dir.display());

        let mut summary = CleanSummary::default();
        let mut handled = HashSet::new();

        for (bucket, path) in self.flagged() {
            if !handled.insert(path.to_path_buf()) {
                continue;
            }
            if !path.exists() {
                log::warn!("Skipped (not found): {}", path.display());
                summary.skipped.push(path.to_path_buf());
                continue;
            }

            let destination = self.destination_for(path, bucket);
            match move_file(path, &destination) {
                Ok(()) => {
                    log::info!("Moved {} -> {}", path.display(), destination.display());
                    summary.moved.push(MoveRecord {
                        source: path.to_path_buf(),
                        destination,
                        bucket,
                    });
                }
                Err(e) => {
                    log::warn!("Error moving {}: {}", path.display(), e);
                    summary.failed.push(FailedMove {
                        source: path.to_path_buf(),
                        error: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Moved {} extra duplicate files",
            summary.moved_count(QuarantineBucket::Duplicates)
        );
        Ok(summary)
    }

    fn flagged(&self) -> impl Iterator<Item = (QuarantineBucket, &Path)> + '_ {
        let sections = &self.report.sections;
        let corrupt = sections
            .corrupt_files
            .iter()
            .flatten()
            .map(|c| (QuarantineBucket::Corrupt, c.path.as_path()));
        let duplicates = sections
            .duplicates
            .iter()
            .flat_map(|d| d.examples.iter())
            .flat_map(|g| g.extras().iter())
            .map(|p| (QuarantineBucket::Duplicates, p.as_path()));
        let suspicious = sections
            .suspicious_samples
            .iter()
            .flat_map(|s| s.details.iter())
            .map(|i| (QuarantineBucket::Suspicious, i.path.as_path()));
        corrupt.chain(duplicates).chain(suspicious)
    }

    /// `<quarantine>/<bucket>/<path relative to the dataset root>`, or the
    /// bare file name when the file lies outside the root.
    fn destination_for(&self, path: &Path, bucket: QuarantineBucket) -> PathBuf {
        let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let relative = match resolved.strip_prefix(&self.dataset_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => PathBuf::from(path.file_name().unwrap_or(path.as_os_str())),
        };
        self.quarantine_dir.join(bucket.dir_name()).join(relative)
    }
}

/// Rename, falling back to copy and delete across filesystems.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            log::debug!(
                "Rename of {} failed ({}), copying instead",
                source.display(),
                rename_err
            );
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CorruptFile, CorruptReason, DuplicateGroup, DuplicateReport, IssueCategory, QualityIssue};
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_moves_into_buckets_preserving_layout() {
        let dir = TempDir::new().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        let bad = root.join("cats/bad.png");
        let keep = root.join("cats/1.png");
        let dup = root.join("dogs/1.png");
        let dark = root.join("dogs/dark.png");
        for p in [&bad, &keep, &dup, &dark] {
            touch(p);
        }

        let mut report = HealthReport::new("r", &root);
        report.set_corrupt_files(vec![CorruptFile {
            path: bad.clone(),
            reason: CorruptReason::ImageCorrupted,
            detail: None,
        }]);
        report.set_duplicates(DuplicateReport {
            groups_found: 1,
            total_duplicates: 1,
            examples: vec![DuplicateGroup {
                hash: "h".into(),
                files: vec![keep.clone(), dup.clone()],
            }],
            unreadable: Vec::new(),
        });
        report.set_suspicious_samples(
            vec![QualityIssue {
                path: dark.clone(),
                issue: "Low-quality image (mean=1.0, std=0.0)".into(),
                category: IssueCategory::VeryDark,
            }],
            5,
        );

        let summary = Cleaner::new(&root, &report).unwrap().clean().unwrap();

        assert_eq!(summary.moved.len(), 3);
        assert!(keep.exists());
        assert!(!bad.exists() && !dup.exists() && !dark.exists());
        assert!(root.join("_quarantine/corrupt/cats/bad.png").exists());
        assert!(root.join("_quarantine/duplicates/dogs/1.png").exists());
        assert!(root.join("_quarantine/suspicious/dogs/dark.png").exists());
        assert_eq!(summary.moved_count(QuarantineBucket::Duplicates), 1);
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let mut report = HealthReport::new("r", dir.path());
        report.set_corrupt_files(vec![CorruptFile {
            path: dir.path().join("gone.png"),
            reason: CorruptReason::EmptyFile,
            detail: None,
        }]);

        let summary = Cleaner::new(dir.path(), &report).unwrap().clean().unwrap();
        assert!(summary.moved.is_empty());
        assert_eq!(summary.skipped.len(), 1);
        assert!(dir.path().join(QUARANTINE_DIR).is_dir());
    }

    #[test]
    fn test_file_flagged_twice_moves_once() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a/empty.txt");
        touch(&file);

        let mut report = HealthReport::new("r", dir.path());
        report.set_corrupt_files(vec![CorruptFile {
            path: file.clone(),
            reason: CorruptReason::EmptyFile,
            detail: None,
        }]);
        report.set_suspicious_samples(
            vec![QualityIssue {
                path: file.clone(),
                issue: "Empty text file".into(),
                category: IssueCategory::EmptyText,
            }],
            5,
        );

        let summary = Cleaner::new(dir.path(), &report).unwrap().clean().unwrap();
        assert_eq!(summary.moved.len(), 1);
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.moved[0].bucket, QuarantineBucket::Corrupt);
    }

    #[test]
    fn test_file_outside_root_uses_file_name() {
        let dataset = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let outside = elsewhere.path().join("stray.txt");
        touch(&outside);

        let report = HealthReport::new("r", dataset.path());
        let cleaner = Cleaner::new(dataset.path(), &report).unwrap();
        let dest = cleaner.destination_for(&outside, QuarantineBucket::Suspicious);
        assert_eq!(
            dest,
            cleaner.quarantine_dir().join("suspicious").join("stray.txt")
        );
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let report = HealthReport::new("r", dir.path());
        assert!(Cleaner::new(dir.path().join("nope"), &report).is_err());
    }
}
