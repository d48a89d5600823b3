//! detection-eval - per-class precision/recall/F1 for object detections

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use detection_eval::{evaluate, metrics::write_report, DetectionFileParser, EvaluationConfig, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "detection-eval", author, version, about)]
struct Args {
    /// Path to ground truth file (`image left,top,right,bottom label` per line).
    #[arg(short = 'g', long = "ground-truth", value_name = "FILE")]
    ground_truth: PathBuf,
    /// Path to detection results file (`image left,top,right,bottom label score` per line).
    #[arg(short = 'd', long = "detections", value_name = "FILE")]
    detections: PathBuf,
    /// Overlap (IoU) threshold in [0, 1]; a pair at exactly this IoU matches.
    #[arg(short = 't', long = "threshold", default_value_t = 0.5)]
    threshold: f64,
    /// Output format (text|json).
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,
    /// Write the table here instead of stdout.
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = EvaluationConfig {
        format: args.format,
        ..EvaluationConfig::new(args.threshold)?
    };

    // Parser errors already name the file and line.
    let ground_truth = DetectionFileParser::ground_truth(&args.ground_truth).parse()?;
    let predictions = DetectionFileParser::predictions(&args.detections).parse()?;

    let report = evaluate(&ground_truth, &predictions, &config)?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    write_report(&mut writer, &report, config.format)?;

    Ok(())
}
