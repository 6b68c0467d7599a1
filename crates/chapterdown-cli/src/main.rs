//! convert - Batch converter from XHTML chapters to Markdown

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{Level, LevelFilter};

use chapterdown::{convert_directory, BatchError, ChapterService};

#[derive(Parser)]
#[command(name = "convert")]
#[command(version, about = "Convert XHTML book chapters to Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    convert                     Convert ./*.xhtml into the current directory
    convert OEBPS/xhtml docs    Convert OEBPS/xhtml/*.xhtml into docs/
    RUST_LOG=debug convert      Also trace every rewrite pass")]
struct Cli {
    /// Directory holding the .xhtml chapters
    #[arg(value_name = "INPUT_DIR", default_value = ".")]
    input_dir: PathBuf,

    /// Directory the .md files are written to (created if missing)
    #[arg(value_name = "OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Only report warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| match record.level() {
            Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(
                buf,
                "{}: {}",
                level.as_str().to_lowercase(),
                record.args()
            ),
        })
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let service = ChapterService::new();

    match convert_directory(&service, &cli.input_dir, &cli.output_dir) {
        Ok(report) => {
            if !report.is_complete() {
                log::warn!(
                    "{} of {} files failed",
                    report.failures.len(),
                    report.total()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ (BatchError::DirectoryNotFound(_) | BatchError::NoInputFiles { .. })) => {
            log::error!("{e}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).with_context(|| {
            format!(
                "converting {} into {}",
                cli.input_dir.display(),
                cli.output_dir.display()
            )
        }),
    }
}
