use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use psnr_core::pipeline::compare_sequences_use_case::{CompareOptions, CompareSequencesUseCase};
use psnr_core::pipeline::comparison_logger::{
    ComparisonLogger, NullComparisonLogger, StdoutComparisonLogger,
};
use psnr_core::quality::domain::psnr_report::PsnrReport;
use psnr_core::video::infrastructure::ffmpeg_reader::FfmpegReader;

/// Average PSNR between a reference video and a processed copy.
#[derive(Parser)]
#[command(name = "video-psnr")]
struct Cli {
    /// Reference (original) video file.
    reference: PathBuf,

    /// Candidate (processed) video file.
    candidate: PathBuf,

    /// Print the PSNR of every frame pair.
    #[arg(long)]
    per_frame: bool,

    /// Compare even if the containers report different frame counts.
    #[arg(long)]
    skip_count_check: bool,

    /// Log progress, stage timings and a PSNR range summary to stderr.
    /// Raises the default log level to `info`; `RUST_LOG` still wins.
    #[arg(long)]
    summary: bool,
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(cli.summary)),
    )
    .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Log filter used when `RUST_LOG` is unset.
fn default_log_filter(summary: bool) -> &'static str {
    if summary {
        "info"
    } else {
        "error"
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let logger: Box<dyn ComparisonLogger> = if cli.summary {
        Box::new(StdoutComparisonLogger::default())
    } else {
        Box::new(NullComparisonLogger)
    };
    let options = CompareOptions {
        check_frame_counts: !cli.skip_count_check,
    };

    let mut use_case = CompareSequencesUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(FfmpegReader::new()),
        logger,
        options,
    );
    let report = use_case
        .execute(&cli.reference, &cli.candidate)
        .map_err(|e| format!("Failed to compute PSNR: {e}"))?;
    use_case.logger().summary(&report);

    if cli.per_frame {
        print_frame_scores(&report);
    }
    println!(
        "{}",
        format_average(&cli.reference, &cli.candidate, &report)
    );

    Ok(())
}

fn print_frame_scores(report: &PsnrReport) {
    for (index, psnr) in report.frame_scores().iter().enumerate() {
        println!("frame {index}: {psnr:.2} dB");
    }
}

fn format_average(reference: &Path, candidate: &Path, report: &PsnrReport) -> String {
    format!(
        "Average PSNR between {} and {}: {:.2} dB",
        reference.display(),
        candidate.display(),
        report.average()
    )
}
