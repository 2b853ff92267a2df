//! End-to-end pipeline runs over generated datasets.

mod common;

use common::{test_config, DatasetFixture};
use dataset_health::checks::{CheckKind, ClassStatus, CorruptReason, IssueCategory};
use dataset_health::config::HealthConfig;
use dataset_health::pipeline::{scan, PipelineBuilder};
use dataset_health::report::{HealthReport, HealthStatus};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn run(fixture: &DatasetFixture, checks: &[CheckKind], config: HealthConfig) -> HealthReport {
    let mut pipeline = PipelineBuilder::new(config)
        .checks(checks.iter().copied())
        .build()
        .unwrap();
    let (_, report) = scan(fixture.root(), &mut pipeline).unwrap();
    report
}

#[test]
fn test_class_distribution_96_3_1() {
    let fixture = DatasetFixture::new();
    fixture.class_with_samples("A", 96);
    fixture.class_with_samples("B", 3);
    fixture.class_with_samples("C", 1);

    let report = run(&fixture, &[CheckKind::ClassImbalance], test_config());
    let distribution = report.sections.class_distribution.as_ref().unwrap();

    let summary: Vec<_> = distribution
        .classes
        .iter()
        .map(|c| (c.name.as_str(), c.count, c.status))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("A", 96, ClassStatus::Ok),
            ("B", 3, ClassStatus::LowCount),
            ("C", 1, ClassStatus::LowCount),
        ]
    );
    assert_eq!(distribution.imbalance_ratio, Some(96.0));
    assert_eq!(distribution.total_files(), report.sections.summary.total_files);

    let score = report.health_score.as_ref().unwrap();
    assert_eq!(score.penalties[&CheckKind::ClassImbalance], 10);
    assert_eq!(score.score, 90);
    assert_eq!(score.status, HealthStatus::Healthy);
}

#[test]
fn test_class_paths_include_root() {
    let fixture = DatasetFixture::new();
    fixture.class_with_samples("train/cats", 2);
    fixture.class_with_samples("train/dogs", 2);

    let report = run(&fixture, &[CheckKind::ClassImbalance], test_config());
    let root_name = fixture.root().file_name().unwrap().to_string_lossy().to_string();
    let paths: Vec<_> = report
        .sections
        .class_distribution
        .unwrap()
        .classes
        .into_iter()
        .map(|c| c.path)
        .collect();
    assert_eq!(
        paths,
        vec![
            format!("{root_name} > train > cats"),
            format!("{root_name} > train > dogs"),
        ]
    );
}

#[test]
fn test_duplicate_keeps_first_discovered() {
    let fixture = DatasetFixture::new();
    let kept = fixture.bytes("x/1.png", b"same bytes");
    let extra = fixture.bytes("y/1.png", b"same bytes");
    fixture.bytes("y/2.png", b"different");

    let report = run(&fixture, &[CheckKind::Duplicate], test_config());
    let duplicates = report.sections.duplicates.as_ref().unwrap();

    assert_eq!(duplicates.groups_found, 1);
    assert_eq!(duplicates.total_duplicates, 1);
    assert_eq!(duplicates.examples[0].files, vec![kept, extra]);
    assert_eq!(report.score(), Some(98));
}

#[test]
fn test_corrupt_files_are_reported_sorted() {
    let fixture = DatasetFixture::new();
    fixture.image("imgs/good.png", 1);
    let broken = fixture.bytes("imgs/broken.png", b"definitely not a png");
    let empty = fixture.bytes("docs/a.csv", b"");

    let report = run(&fixture, &[CheckKind::CorruptFile], test_config());
    let corrupt = report.sections.corrupt_files.as_ref().unwrap();

    let found: Vec<(PathBuf, CorruptReason)> =
        corrupt.iter().map(|c| (c.path.clone(), c.reason)).collect();
    assert_eq!(
        found,
        vec![
            (empty, CorruptReason::EmptyFile),
            (broken, CorruptReason::ImageCorrupted),
        ]
    );
    // Corrupt files are informational by default.
    assert_eq!(report.score(), Some(100));
}

#[test]
fn test_quality_findings_carry_categories() {
    let fixture = DatasetFixture::new();
    fixture.flat_image("imgs/dark.png", 2);
    fixture.flat_image("imgs/bright.png", 254);
    fixture.image("imgs/fine.png", 3);
    fixture.text("txt/empty.txt", "  \n\t ");
    fixture.text("txt/noise.txt", "\u{1}\u{2}\u{3}\u{4}\u{5}\u{6}abc");
    fixture.text("txt/ok.txt", "a perfectly ordinary sentence");

    let report = run(&fixture, &[CheckKind::Quality], test_config());
    let samples = report.sections.suspicious_samples.as_ref().unwrap();

    assert_eq!(samples.total(), 4);
    assert_eq!(samples.count(IssueCategory::VeryDark), 1);
    assert_eq!(samples.count(IssueCategory::VeryBright), 1);
    assert_eq!(samples.count(IssueCategory::EmptyText), 1);
    assert_eq!(samples.count(IssueCategory::GibberishText), 1);

    let dark = samples
        .details
        .iter()
        .find(|i| i.category == IssueCategory::VeryDark)
        .unwrap();
    assert!(dark.issue.starts_with("Low-quality image (mean=2.0"));

    assert_eq!(report.score(), Some(92));
}

#[test]
fn test_all_checks_on_clean_dataset() {
    let fixture = DatasetFixture::new();
    for i in 0..4 {
        fixture.image(&format!("cats/{i}.png"), i);
        fixture.image(&format!("dogs/{i}.png"), i + 10);
    }

    let report = run(&fixture, &[], test_config());

    assert_eq!(report.sections.summary.checks_run, CheckKind::ALL.to_vec());
    assert_eq!(report.score(), Some(100));
    assert!(report.sections.recommendations.is_empty());
    assert_eq!(report.sections.performance_log.len(), 4);
    assert!(report.flagged_files().is_empty());
}

#[test]
fn test_score_never_goes_below_zero() {
    let fixture = DatasetFixture::new();
    for i in 0..6 {
        fixture.bytes(&format!("d/{i}.bin"), b"clone");
    }
    let mut config = test_config();
    config.penalties.duplicate_file = 50;
    config.penalties.duplicate_cap = None;

    let report = run(&fixture, &[CheckKind::Duplicate], config);
    assert_eq!(report.score(), Some(0));
    assert_eq!(report.health_score.unwrap().status, HealthStatus::Critical);
}

#[test]
fn test_sorted_runs_are_reproducible() {
    let fixture = DatasetFixture::new();
    for name in ["zeta", "alpha", "mid"] {
        fixture.bytes(&format!("{name}/copy.bin"), b"dup");
    }

    let first = run(&fixture, &[CheckKind::Duplicate], test_config());
    let second = run(&fixture, &[CheckKind::Duplicate], test_config());

    let files = |r: &HealthReport| r.sections.duplicates.clone().unwrap().examples[0].files.clone();
    assert_eq!(files(&first), files(&second));
    assert_eq!(files(&first)[0], fixture.path("alpha/copy.bin"));
}

#[test]
fn test_missing_dataset_is_fatal() {
    let fixture = DatasetFixture::new();
    let mut pipeline = PipelineBuilder::new(test_config()).build().unwrap();
    let err = scan(&fixture.path("missing"), &mut pipeline).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.category(), "Filesystem");
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_file_names_still_serialize() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fixture = DatasetFixture::new();
    fixture.bytes("cls/a.bin", b"same bytes");
    let odd = fixture.dir("cls").join(OsStr::from_bytes(b"b\xff.bin"));
    std::fs::write(&odd, b"same bytes").unwrap();

    let report = run(&fixture, &[CheckKind::Duplicate], test_config());
    assert_eq!(report.sections.duplicates.as_ref().unwrap().total_duplicates, 1);

    let json = report.to_json().unwrap();
    assert!(json.contains("b\u{FFFD}.bin"));
}

#[test]
fn test_report_json_roundtrip() {
    let fixture = DatasetFixture::new();
    fixture.class_with_samples("a", 2);
    fixture.bytes("a/empty.txt", b"");

    let report = run(&fixture, &[], test_config());
    let parsed = HealthReport::from_json(&report.to_json().unwrap()).unwrap();
    assert_eq!(parsed.sections.corrupt_files, report.sections.corrupt_files);
    assert_eq!(parsed.sections.duplicates, report.sections.duplicates);
    assert_eq!(parsed.sections.recommendations, report.sections.recommendations);
    assert_eq!(parsed.health_score, report.health_score);
}
