//! Readable but low-value samples: near-blank or saturated images, empty or
//! gibberish text.
//!
//! Text files are checked on the I/O pool, images on the CPU pool. Every rule
//! tags its finding with an [`IssueCategory`] next to the human-readable
//! message, so nothing downstream has to parse the message.

use super::decode::{decode_image, DecodeError};
use super::file_kind::{quality_kind, QualityKind};
use super::{Check, CheckContext, CheckKind};
use crate::config::{weighted_penalty, HealthConfig, QualityThresholds};
use crate::pool::{TaskFailure, TaskOutcome, WorkerPool};
use crate::report::lossy_path;
use crate::tree::DatasetTree;
use image::imageops::{self, FilterType};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    VeryDark,
    VeryBright,
    LowQuality,
    EmptyText,
    GibberishText,
    OtherIssues,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 6] = [
        Self::VeryDark,
        Self::VeryBright,
        Self::LowQuality,
        Self::EmptyText,
        Self::GibberishText,
        Self::OtherIssues,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::VeryDark => "very_dark",
            Self::VeryBright => "very_bright",
            Self::LowQuality => "low_quality",
            Self::EmptyText => "empty_text",
            Self::GibberishText => "gibberish_text",
            Self::OtherIssues => "other_issues",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VeryDark => "Very Dark",
            Self::VeryBright => "Very Bright",
            Self::LowQuality => "Low Quality",
            Self::EmptyText => "Empty Text",
            Self::GibberishText => "Gibberish Text",
            Self::OtherIssues => "Other Issues",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    #[serde(rename = "file_path", serialize_with = "lossy_path::serialize")]
    pub path: PathBuf,
    pub issue: String,
    pub category: IssueCategory,
}

impl QualityIssue {
    fn new(path: PathBuf, category: IssueCategory, issue: impl Into<String>) -> Self {
        Self {
            path,
            issue: issue.into(),
            category,
        }
    }
}

/// Intensity statistics of a downscaled grayscale image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageStats {
    pub mean: f64,
    pub std: f64,
}

impl ImageStats {
    pub fn from_image(image: &DynamicImage, size: u32) -> Self {
        let gray = image.to_luma8();
        let small = imageops::resize(&gray, size, size, FilterType::CatmullRom);
        Self::from_pixels(small.as_raw())
    }

    /// Mean and population standard deviation.
    pub fn from_pixels(pixels: &[u8]) -> Self {
        if pixels.is_empty() {
            return Self { mean: 0.0, std: 0.0 };
        }
        let n = pixels.len() as f64;
        let mean = pixels.iter().map(|&p| f64::from(p)).sum::<f64>() / n;
        let variance = pixels
            .iter()
            .map(|&p| (f64::from(p) - mean).powi(2))
            .sum::<f64>()
            / n;
        Self {
            mean,
            std: variance.sqrt(),
        }
    }

    /// Category for a flagged image, `None` when the image looks fine.
    pub fn classify(&self, thresholds: &QualityThresholds) -> Option<IssueCategory> {
        if self.mean <= thresholds.dark_threshold {
            Some(IssueCategory::VeryDark)
        } else if self.mean >= thresholds.bright_threshold {
            Some(IssueCategory::VeryBright)
        } else {
            None
        }
    }
}

pub struct QualityCheck {
    thresholds: QualityThresholds,
    weight: u32,
    cap: Option<u32>,
}

impl QualityCheck {
    pub fn new(thresholds: QualityThresholds, weight: u32, cap: Option<u32>) -> Self {
        Self {
            thresholds,
            weight,
            cap,
        }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        Self::new(
            config.quality.clone(),
            config.penalties.suspicious_sample,
            config.penalties.suspicious_cap,
        )
    }
}

impl Check for QualityCheck {
    type Output = Vec<QualityIssue>;

    fn kind(&self) -> CheckKind {
        CheckKind::Quality
    }

    fn run(&self, tree: &DatasetTree, ctx: &CheckContext<'_>) -> Vec<QualityIssue> {
        let mut images = Vec::new();
        let mut texts = Vec::new();
        for node in tree.files_dfs() {
            match quality_kind(node) {
                Some(QualityKind::Image) => images.push(node.path.clone()),
                Some(QualityKind::Text) => texts.push(node.path.clone()),
                None => {}
            }
        }
        log::debug!("Quality check: {} text files, {} images", texts.len(), images.len());

        let ratio = self.thresholds.printable_ratio;
        let text_outcomes = ctx
            .pools
            .io
            .run_batch(texts, |path| check_text_file(path, ratio));
        let image_outcomes = ctx
            .pools
            .cpu
            .run_batch(images, |path| check_image_file(path, &self.thresholds));

        let mut issues: Vec<QualityIssue> = text_outcomes
            .into_iter()
            .chain(image_outcomes)
            .filter_map(collect_issue)
            .collect();
        issues.sort_by(|a, b| a.path.cmp(&b.path));
        issues
    }

    fn penalty(&self, output: &Vec<QualityIssue>) -> u32 {
        weighted_penalty(output.len(), self.weight, self.cap)
    }
}

fn collect_issue(
    outcome: TaskOutcome<PathBuf, Option<QualityIssue>>,
) -> Option<QualityIssue> {
    match outcome.result {
        Ok(issue) => issue,
        Err(failure) => Some(failed_task(outcome.item, &failure)),
    }
}

fn failed_task(path: PathBuf, failure: &TaskFailure) -> QualityIssue {
    log::warn!("Quality check of {} failed: {}", path.display(), failure);
    QualityIssue::new(path, IssueCategory::OtherIssues, format!("Corrupt image: {failure}"))
}

/// ASCII graphic characters plus the six ASCII whitespace characters.
fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Classify already-decoded text content.
///
/// Undecodable bytes must already be stripped; the content is trimmed here.
pub fn classify_text(content: &str, min_printable_ratio: f64) -> Option<(IssueCategory, &'static str)> {
    let content = content.trim();
    if content.is_empty() {
        return Some((IssueCategory::EmptyText, "Empty text file"));
    }

    let (printable, total) = content
        .chars()
        .fold((0usize, 0usize), |(p, t), c| (p + usize::from(is_printable(c)), t + 1));
    let ratio = printable as f64 / total.max(1) as f64;

    (ratio < min_printable_ratio).then_some((IssueCategory::GibberishText, "Gibberish text file"))
}

/// Decode UTF-8, dropping only the byte sequences that fail to decode, and
/// translate `\r\n` and lone `\r` line endings to `\n`.
pub fn decode_text(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

pub fn check_text_file(path: &Path, min_printable_ratio: f64) -> Option<QualityIssue> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return Some(QualityIssue::new(
                path.to_path_buf(),
                IssueCategory::OtherIssues,
                format!("Unreadable text file: {e}"),
            ))
        }
    };

    classify_text(&decode_text(&bytes), min_printable_ratio)
        .map(|(category, message)| QualityIssue::new(path.to_path_buf(), category, message))
}

pub fn check_image_file(path: &Path, thresholds: &QualityThresholds) -> Option<QualityIssue> {
    let image = match decode_image(path) {
        Ok(image) => image,
        Err(DecodeError::TooLarge(limit)) => {
            log::warn!("Skipping quality check of {}: {}", path.display(), limit);
            return None;
        }
        Err(e) => {
            return Some(QualityIssue::new(
                path.to_path_buf(),
                IssueCategory::OtherIssues,
                format!("Corrupt image: {e}"),
            ))
        }
    };

    let stats = ImageStats::from_image(&image, thresholds.thumbnail_size);
    stats.classify(thresholds).map(|category| {
        QualityIssue::new(
            path.to_path_buf(),
            category,
            format!("Low-quality image (mean={:.1}, std={:.1})", stats.mean, stats.std),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParallelConfig;
    use crate::pool::Pools;
    use image::{GrayImage, Luma};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_stats_from_pixels() {
        let stats = ImageStats::from_pixels(&[0, 0, 10, 10]);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std, 5.0);
    }

    #[test]
    fn test_classify_stats_boundaries() {
        let t = QualityThresholds::default();
        let at = |mean| ImageStats { mean, std: 0.0 }.classify(&t);
        assert_eq!(at(2.0), Some(IssueCategory::VeryDark));
        assert_eq!(at(5.0), Some(IssueCategory::VeryDark));
        assert_eq!(at(5.1), None);
        assert_eq!(at(249.9), None);
        assert_eq!(at(250.0), Some(IssueCategory::VeryBright));
    }

    #[test]
    fn test_dark_image_is_flagged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dark.png");
        GrayImage::from_pixel(128, 128, Luma([2])).save(&path).unwrap();

        let issue = check_image_file(&path, &QualityThresholds::default()).unwrap();
        assert_eq!(issue.category, IssueCategory::VeryDark);
        assert_eq!(issue.issue, "Low-quality image (mean=2.0, std=0.0)");
    }

    #[test]
    fn test_midtone_image_passes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mid.png");
        GrayImage::from_pixel(16, 16, Luma([128])).save(&path).unwrap();
        assert_eq!(check_image_file(&path, &QualityThresholds::default()), None);
    }

    #[test]
    fn test_undecodable_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not an image").unwrap();
        let issue = check_image_file(&path, &QualityThresholds::default()).unwrap();
        assert_eq!(issue.category, IssueCategory::OtherIssues);
        assert!(issue.issue.starts_with("Corrupt image: "));
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(
            classify_text("  \n\t ", 0.8),
            Some((IssueCategory::EmptyText, "Empty text file"))
        );
        assert_eq!(classify_text("label,value\ncat,1\n", 0.8), None);
        assert_eq!(
            classify_text("ÄÖÜßäöü€ab", 0.8),
            Some((IssueCategory::GibberishText, "Gibberish text file"))
        );
    }

    #[test]
    fn test_invalid_utf8_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bytes.txt");
        fs::write(&path, [0xff, 0xfe, 0xfd]).unwrap();
        let issue = check_text_file(&path, 0.8).unwrap();
        assert_eq!(issue.category, IssueCategory::EmptyText);
    }

    #[test]
    fn test_decode_text_keeps_real_replacement_characters() {
        assert_eq!(
            decode_text(b"a\r\nb\xffc\r\xef\xbf\xbd"),
            "a\nbc\n\u{FFFD}"
        );
    }

    #[test]
    fn test_printable_ratio_uses_decoded_characters() {
        let dir = TempDir::new().unwrap();
        // 3 of 4 characters printable; counting `\r\n` twice would give 4 of 5.
        let path = dir.path().join("crlf.txt");
        fs::write(&path, "a\r\nb\u{e9}").unwrap();
        let issue = check_text_file(&path, 0.8).unwrap();
        assert_eq!(issue.category, IssueCategory::GibberishText);

        let path = dir.path().join("fffd.txt");
        fs::write(&path, "abc\u{FFFD}").unwrap();
        let issue = check_text_file(&path, 0.8).unwrap();
        assert_eq!(issue.category, IssueCategory::GibberishText);
    }

    #[test]
    fn test_run_collects_sorted_issues() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("cls")).unwrap();
        fs::write(dir.path().join("cls/b.txt"), b"").unwrap();
        fs::write(dir.path().join("cls/c.csv"), b"a,b\n1,2\n").unwrap();
        fs::write(dir.path().join("cls/ignored.gif"), b"").unwrap();
        GrayImage::from_pixel(8, 8, Luma([255]))
            .save(dir.path().join("cls/a.png"))
            .unwrap();

        let tree = DatasetTree::build(dir.path()).unwrap();
        let config = HealthConfig::default();
        let pools = Pools::from_config(&ParallelConfig::sequential()).unwrap();
        let ctx = CheckContext {
            config: &config,
            pools: &pools,
        };
        let check = QualityCheck::from_config(&config);
        let issues = check.run(&tree, &ctx);

        let categories: Vec<_> = issues.iter().map(|i| i.category).collect();
        assert_eq!(
            categories,
            vec![IssueCategory::VeryBright, IssueCategory::EmptyText]
        );
        assert_eq!(check.penalty(&issues), 4);
    }

    #[test]
    fn test_penalty_cap() {
        let issues = vec![
            QualityIssue::new("x".into(), IssueCategory::EmptyText, "Empty text file");
            15
        ];
        assert_eq!(QualityCheck::new(QualityThresholds::default(), 2, Some(20)).penalty(&issues), 20);
    }
}
