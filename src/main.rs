use anyhow::{Context, Result};
use dataset_health::cleaner::{CleanSummary, Cleaner, QuarantineBucket};
use dataset_health::cli::{parse_args, Cli};
use dataset_health::config::{load_config, load_config_from_path};
use dataset_health::io::output::{
    create_file_writer, create_writer, save_report_in_dataset, OutputFormat,
};
use dataset_health::observability::{append_perf_log, install_panic_hook, set_phase, ScanPhase};
use dataset_health::pipeline::{scan, PipelineBuilder};
use dataset_health::report::HealthReport;

fn main() -> Result<()> {
    install_panic_hook();
    let cli = parse_args();
    init_logging(&cli);
    run(cli)
}

fn init_logging(cli: &Cli) {
    // RUST_LOG, when set, wins over -v.
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => load_config(),
    };
    cli.apply_overrides(&mut config);

    let builder = match cli.selected_checks()? {
        Some(checks) => PipelineBuilder::new(config).checks(checks),
        None => PipelineBuilder::from_config(config)?,
    };
    let mut pipeline = builder.when(!cli.no_progress, |b| b.with_progress()).build()?;

    let (tree, report) = scan(&cli.folder, &mut pipeline)?;

    {
        let _phase = set_phase(ScanPhase::Reporting);
        let format: OutputFormat = cli.format.into();
        let mut writer = match &cli.output {
            Some(path) => create_file_writer(format, path)?,
            None => create_writer(format),
        };
        writer.write_tree(&tree)?;
        writer.write_report(&report)?;
        if let Some(path) = &cli.output {
            eprintln!("Report written to {}", path.display());
        }

        for (enabled, format) in [(cli.md, OutputFormat::Markdown), (cli.json, OutputFormat::Json)] {
            if enabled {
                let path = save_report_in_dataset(&report, format)?;
                eprintln!("Saved report to {}", path.display());
            }
        }

        if cli.perf_log {
            let path = &pipeline.config().output.perf_log_path;
            append_perf_log(
                path,
                report.sections.summary.scan_duration_sec,
                &report.sections.performance_log,
            )?;
            log::info!("Performance log appended to {}", path.display());
        }
    }

    if cli.clean {
        let _phase = set_phase(ScanPhase::Cleaning);
        let summary = clean(&cli, &report)?;
        print_clean_summary(&summary);
    }

    Ok(())
}

fn clean(cli: &Cli, report: &HealthReport) -> Result<CleanSummary> {
    let cleaner = Cleaner::new(&cli.folder, report)?;
    eprintln!(
        "Cleaning dataset... Quarantine folder: {}",
        cleaner.quarantine_dir().display()
    );
    cleaner
        .clean()
        .with_context(|| format!("Failed to clean {}", cli.folder.display()))
}

fn print_clean_summary(summary: &CleanSummary) {
    for record in &summary.moved {
        eprintln!("moved: {} -> {}", record.source.display(), record.destination.display());
    }
    for path in &summary.skipped {
        eprintln!("skipped (not found): {}", path.display());
    }
    for failure in &summary.failed {
        eprintln!("error moving {}: {}", failure.source.display(), failure.error);
    }
    eprintln!(
        "Quarantined {} corrupt, {} duplicate and {} suspicious files.",
        summary.moved_count(QuarantineBucket::Corrupt),
        summary.moved_count(QuarantineBucket::Duplicates),
        summary.moved_count(QuarantineBucket::Suspicious)
    );
}
