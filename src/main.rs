//! CLI entry point for the exam rate analyzer.
//!
//! Provides subcommands for the monthly pass-rate pivot, the yearly exam
//! analysis, or both from a single load of the input file.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use exam_rate_analyzer::config::{OutputFormat, ReportConfig};
use exam_rate_analyzer::output::{print_json, print_pretty, sink_for};
use exam_rate_analyzer::pipeline::{run_all, run_monthly, run_yearly};
use exam_rate_analyzer::report::{MONTHLY_REPORT_STEM, ReportTable, YEARLY_REPORT_STEM};
use exam_rate_analyzer::source::FileSource;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "exam_rate_analyzer")]
#[command(about = "Compute exam pass rate reports from spreadsheet records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly pass rate per exam type (monthly_pass_rates_by_exam_type)
    Monthly {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Yearly totals, missed exams, averages and pass/fail rates per exam (exam_analysis_results)
    Yearly {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Both reports from one read of the input
    All {
        #[command(flatten)]
        args: ReportArgs,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// Spreadsheet (.xlsx, .xlsm, .xls, .ods) or CSV file with exam records
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Worksheet to read instead of the first one
    #[arg(long)]
    sheet: Option<String>,

    /// Directory to write reports to (default: $EXAM_REPORT_OUTPUT_DIR or ".")
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Report file format (default: $EXAM_REPORT_FORMAT or xlsx)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Also log the finished tables as JSON
    #[arg(long, default_value_t = false)]
    print_json: bool,
}

impl ReportArgs {
    fn config(&self) -> Result<ReportConfig> {
        Ok(ReportConfig::from_env()?.with_overrides(self.output_dir.clone(), self.format))
    }

    fn source(&self) -> FileSource {
        FileSource::new(&self.input).with_sheet(self.sheet.clone())
    }

    fn show(&self, table: &ReportTable) -> Result<()> {
        if self.print_json {
            print_json(table)?;
        } else {
            print_pretty(table);
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _log_guard = init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Monthly { args } => {
            let config = args.config()?;
            let sink = sink_for(config.format, &config.output_dir, MONTHLY_REPORT_STEM);
            let table = run_monthly(&args.source(), sink.as_ref()).with_context(|| {
                format!("monthly report for {} failed", args.input.display())
            })?;
            args.show(&table)?;
            info!(output = %sink.location(), "Analysis complete");
        }
        Commands::Yearly { args } => {
            let config = args.config()?;
            let sink = sink_for(config.format, &config.output_dir, YEARLY_REPORT_STEM);
            let table = run_yearly(&args.source(), sink.as_ref()).with_context(|| {
                format!("yearly report for {} failed", args.input.display())
            })?;
            args.show(&table)?;
            info!(output = %sink.location(), "Analysis complete");
        }
        Commands::All { args } => {
            let config = args.config()?;
            let monthly_sink = sink_for(config.format, &config.output_dir, MONTHLY_REPORT_STEM);
            let yearly_sink = sink_for(config.format, &config.output_dir, YEARLY_REPORT_STEM);
            let (monthly, yearly) =
                run_all(&args.source(), monthly_sink.as_ref(), yearly_sink.as_ref())
                    .with_context(|| format!("reports for {} failed", args.input.display()))?;
            args.show(&monthly)?;
            args.show(&yearly)?;
            info!(
                monthly = %monthly_sink.location(),
                yearly = %yearly_sink.location(),
                "Analysis complete"
            );
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer on drop and must outlive the run.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/exam_rate_analyzer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("exam_rate_analyzer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}
