//! Command implementations for the race_telemetry CLI
//!
//! This module contains the command execution logic, console summaries and
//! export output for the `inspect`, `predict` and `export` subcommands.

use crate::cli::args::{Args, Commands, ExportArgs, InspectArgs, PredictArgs};
use crate::config::TelemetryConfig;
use crate::export::{self, ExportFormat};
use crate::models::{Category, IngestionStats, RaceResultRecord};
use crate::pipeline::IngestionPipeline;
use crate::pipeline::discovery::resolve_inputs;
use crate::registry::{IngestionRegistry, RegistryHandle};
use crate::service::HttpPredictionService;
use crate::session::PredictionSession;
use crate::{Result, TelemetryError};
use colored::*;
use indicatif::HumanDuration;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Main command runner
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args);
    debug!("Command line arguments: {:?}", args);

    let config = TelemetryConfig::load(args.config.as_deref())?;
    debug!("Loaded configuration: {:?}", config);

    match args.command {
        Commands::Inspect(cmd) => run_inspect(&cmd, cmd.apply_overrides(config)).await,
        Commands::Predict(cmd) => run_predict(&cmd, cmd.apply_overrides(config)).await,
        Commands::Export(cmd) => run_export(&cmd, &config),
    }
}

/// Set up structured logging on stderr
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("race_telemetry={}", log_level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();

    debug!("Logging initialized at level: {}", log_level);
}

async fn run_inspect(cmd: &InspectArgs, config: TelemetryConfig) -> Result<()> {
    let (registry, stats) = ingest(&cmd.inputs, &config).await?;
    let snapshot = registry.snapshot().await;

    print_registry(&snapshot);
    print_stats(&stats);
    print_readiness(&snapshot);
    Ok(())
}

async fn run_predict(cmd: &PredictArgs, config: TelemetryConfig) -> Result<()> {
    cmd.validate()?;
    config.validate()?;

    let (registry, stats) = ingest(&cmd.inputs, &config).await?;
    print_registry(&registry.snapshot().await);
    print_stats(&stats);

    let service = HttpPredictionService::from_config(&config)?;
    println!(
        "{} {}",
        "Requesting prediction from".bright_white(),
        service.endpoint().bright_cyan()
    );

    let session = PredictionSession::new(service, registry);
    let records = session.run_prediction(&config.race).await?;

    let filter = cmd.filter();
    let shown = filter.apply(&records);
    print_result_summary(records.len(), &shown);

    emit(&shown, cmd.format, cmd.output.as_deref(), &config)
}

fn run_export(cmd: &ExportArgs, config: &TelemetryConfig) -> Result<()> {
    if !cmd.results.exists() {
        return Err(TelemetryError::InputNotFound {
            path: cmd.results.clone(),
        });
    }

    let text = std::fs::read_to_string(&cmd.results)?;
    let records = export::from_json(&text)?;
    info!(records = records.len(), "Loaded results from {}", cmd.results.display());

    let shown = cmd.filter().apply(&records);
    emit(&shown, cmd.format, cmd.output.as_deref(), config)
}

/// Resolve inputs and run them through the ingestion pipeline
async fn ingest(
    inputs: &[String],
    config: &TelemetryConfig,
) -> Result<(RegistryHandle, IngestionStats)> {
    let paths = resolve_inputs(inputs)?;
    if paths.is_empty() {
        return Err(TelemetryError::configuration(
            "No .json or .csv uploads found in the given inputs",
        ));
    }

    info!("Ingesting {} uploads", paths.len());
    let registry = RegistryHandle::default();
    let stats = IngestionPipeline::new(config.clone())
        .ingest_all(&paths, &registry)
        .await;
    Ok((registry, stats))
}

/// Print or write the selected export renderings
fn emit(
    records: &[RaceResultRecord],
    format: ExportFormat,
    output: Option<&Path>,
    config: &TelemetryConfig,
) -> Result<()> {
    if let Some(dir) = output {
        let written = export::write_exports(
            records,
            format,
            dir,
            &config.export_stem,
            &config.report_title,
        )?;
        println!("\n{}", "Output Files:".bright_green().bold());
        for path in written {
            println!("   • {}", path.display());
        }
        return Ok(());
    }

    if format.includes(ExportFormat::Json) {
        println!("{}", export::to_json(records)?);
    }
    if format.includes(ExportFormat::Csv) {
        match export::to_csv(records) {
            Some(csv) => println!("{csv}"),
            None => println!("{}", "No results to export as CSV".yellow()),
        }
    }
    if format.includes(ExportFormat::Report) {
        let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        print!(
            "{}",
            export::to_report(records, &generated_at, &config.report_title)
        );
    }
    Ok(())
}

fn print_registry(registry: &IngestionRegistry) {
    println!("\n{}", "Uploads:".bright_green().bold());
    for (i, file) in registry.files().iter().enumerate() {
        let status = if file.is_valid() {
            "valid".green()
        } else {
            "flagged".red()
        };
        println!(
            "  {}. {} {} {} {}",
            (i + 1).to_string().bright_yellow().bold(),
            file.name().bright_cyan(),
            format!("[{}]", category_label(file.category())).bright_white(),
            status,
            format!("({} entries)", file.entry_count()).bright_black()
        );
        if let Some(defect) = file.defects().first() {
            println!("       {}", defect.yellow());
        }
    }
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Practice => "Practice",
        Category::Qualifying => "Qualifying",
        Category::RaceResults => "Race Results",
        Category::Unknown => "Unknown",
        Category::Invalid => "Invalid",
    }
}

fn print_stats(stats: &IngestionStats) {
    let elapsed = Duration::from_millis(stats.processing_time_ms.min(u64::MAX as u128) as u64);
    println!(
        "\n   • Files: {} ({} valid, {} flagged, {} undecodable)",
        stats.files_seen, stats.files_valid, stats.files_flagged, stats.files_undecodable
    );
    println!("   • Entries decoded: {}", stats.entries_decoded);
    println!("   • Ingestion time: {}\n", HumanDuration(elapsed));
}

fn print_readiness(registry: &IngestionRegistry) {
    if registry.has_valid_data() {
        println!("{}", "Ready: at least one valid upload".green());
    } else {
        println!("{}", "Not ready: no valid uploads".red());
    }

    match registry.check_eligibility() {
        Ok(uploads) => println!(
            "{} practice={} qualifying={}",
            "Eligible for prediction:".green().bold(),
            uploads.practice.name(),
            uploads.qualifying.name()
        ),
        Err(e) => println!("{}", e.user_message().yellow()),
    }
}

fn print_result_summary(total: usize, shown: &[RaceResultRecord]) {
    println!(
        "\n{} {} cars predicted, {} shown",
        "Prediction complete:".bright_green().bold(),
        total,
        shown.len()
    );
    if shown.is_empty() {
        println!("{}", "No results match the current filter".yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ingest_reports_missing_uploads() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();

        let inputs = vec![temp_dir.path().display().to_string()];
        let result = ingest(&inputs, &TelemetryConfig::default().without_progress()).await;
        assert!(matches!(result, Err(TelemetryError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_ingest_registers_uploads() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("practice.json"), r#"[{"Team":"X"}]"#).unwrap();

        let inputs = vec![temp_dir.path().display().to_string()];
        let (registry, stats) = ingest(&inputs, &TelemetryConfig::default().without_progress())
            .await
            .unwrap();
        assert_eq!(stats.files_valid, 1);
        assert_eq!(registry.snapshot().await.len(), 1);
    }

    #[test]
    fn test_emit_writes_into_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = TelemetryConfig::default().with_export_stem("le-mans");

        emit(&[], ExportFormat::Json, Some(temp_dir.path()), &config).unwrap();
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("le-mans.json")).unwrap(),
            "[]"
        );
    }

    #[test]
    fn test_export_missing_results_file() {
        let args = ExportArgs {
            results: "/nonexistent/results.json".into(),
            class: "all".into(),
            search: None,
            format: ExportFormat::Json,
            output: None,
        };
        let result = run_export(&args, &TelemetryConfig::default());
        assert!(matches!(result, Err(TelemetryError::InputNotFound { .. })));
    }
}
