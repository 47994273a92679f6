use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use vgsales_report::app::{ExportUseCase, ReportUseCase};
use vgsales_report::config::ReportConfig;
use vgsales_report::logging;
use vgsales_report::report::format_summary;

#[derive(Parser)]
#[command(name = "vgsales_report")]
#[command(about = "Clean a video-game sales CSV and chart releases per year and genre share")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML configuration file (defaults to ./vgsales_report.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Input CSV file
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, aggregate and render the charts
    Run {
        /// Directory for charts and the JSON summary
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Draw the rolled-up small genres as their own pie slice
        #[arg(long)]
        show_rolled_up: bool,
        /// Fail when a release year is outside the plausible range
        #[arg(long)]
        strict: bool,
    },
    /// Clean the input and write the cleaned table as CSV
    Clean {
        /// Destination CSV file
        #[arg(long)]
        output: PathBuf,
    },
    /// Clean and aggregate, printing the tables without rendering charts
    Summary,
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = ReportConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(input) = cli.input {
        config.input = input;
    }

    let result = match cli.command {
        Commands::Run {
            output_dir,
            show_rolled_up,
            strict,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            config.show_rolled_up_slice |= show_rolled_up;
            config.strict_year_range |= strict;

            println!("🚀 Running report for {}...", config.input.display());
            ReportUseCase::new(config).run().map(|run| {
                print!("{}", format_summary(&run.summary));
                if let Some(path) = run.summary_path {
                    println!("\n💾 Summary: {}", path.display());
                }
            })
        }
        Commands::Clean { output } => {
            println!("🧹 Cleaning {}...", config.input.display());
            ExportUseCase::new().export(&config.input, &output).map(|cleaned| {
                println!(
                    "✅ Wrote {} rows to {}",
                    cleaned.records.len(),
                    output.display()
                );
            })
        }
        Commands::Summary => ReportUseCase::new(config)
            .analyze()
            .map(|summary| print!("{}", format_summary(&summary))),
    };

    match result {
        Ok(()) => {
            info!("Run finished");
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {}", e);
            Err(e).context("❌ report run aborted")
        }
    }
}
