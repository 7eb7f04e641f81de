#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{Args, CommandFactory, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process;

use tdscore::config::ScoreConfig;
use tdscore::pipeline::{self, PipelineError, RunPaths, RunSummary};
use tdscore::progress::ConsoleProgress;
use tdscore::types::CancelToken;

#[derive(Parser)]
#[command(
    name = "tdscore",
    version,
    about = "Generate overall target-disease association scores and find target pairs that share disease connections."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ScoringArgs {
    /// Minimum number of shared diseases for a target-target pair to be reported
    #[arg(long = "shared-number", alias = "sharednumber", value_name = "N")]
    shared_number: Option<usize>,

    /// Number of highest evidence scores kept per target-disease pair
    #[arg(long, value_name = "N")]
    top_n: Option<usize>,

    /// TOML file providing `top_n` and `min_shared`; command-line flags win
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl ScoringArgs {
    fn resolve(&self) -> Result<ScoreConfig, PipelineError> {
        let base = match &self.config {
            Some(path) => ScoreConfig::from_toml_file(path)?,
            None => ScoreConfig::default(),
        };
        let config = base.with_overrides(self.top_n, self.shared_number);
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate evidence, join it with reference data and search for target pairs
    #[command(about = "Produce the joint association data set and target overlap pairs")]
    Score {
        /// Directory containing evidence *.json files
        #[arg(short, long, value_name = "EVIDENCE_DIR")]
        evidence: PathBuf,

        /// Directory containing target *.json files
        #[arg(short, long, value_name = "TARGETS_DIR")]
        targets: PathBuf,

        /// Directory containing disease *.json files
        #[arg(short, long, value_name = "DISEASES_DIR")]
        diseases: PathBuf,

        /// Directory for the output *.json files
        #[arg(short, long, value_name = "OUTPUT_DIR")]
        output: PathBuf,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Aggregate evidence and search for target pairs without reference data
    #[command(about = "Find target pairs that share disease connections")]
    Overlaps {
        /// Directory containing evidence *.json files
        #[arg(short, long, value_name = "EVIDENCE_DIR")]
        evidence: PathBuf,

        /// Directory for the output *.json file
        #[arg(short, long, value_name = "OUTPUT_DIR")]
        output: PathBuf,

        #[command(flatten)]
        scoring: ScoringArgs,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let Cli { command } = cli;

    let result = match command {
        Some(Commands::Score {
            evidence,
            targets,
            diseases,
            output,
            scoring,
        }) => run_score(
            RunPaths {
                evidence_dir: evidence,
                targets_dir: targets,
                diseases_dir: diseases,
                output_dir: output,
            },
            &scoring,
        ),
        Some(Commands::Overlaps {
            evidence,
            output,
            scoring,
        }) => run_overlaps(evidence, output, &scoring),
        None => {
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_score(paths: RunPaths, scoring: &ScoringArgs) -> Result<(), PipelineError> {
    let config = scoring.resolve()?;
    info!(
        "Proceeding with evidence '{}', targets '{}', diseases '{}', output '{}', top_n {}, min_shared {}",
        paths.evidence_dir.display(),
        paths.targets_dir.display(),
        paths.diseases_dir.display(),
        paths.output_dir.display(),
        config.top_n,
        config.min_shared
    );

    let mut progress = ConsoleProgress::new();
    let summary = pipeline::run(&paths, &config, &mut progress, &CancelToken::new())?;
    report(&summary, &config);
    Ok(())
}

fn run_overlaps(
    evidence: PathBuf,
    output: PathBuf,
    scoring: &ScoringArgs,
) -> Result<(), PipelineError> {
    let config = scoring.resolve()?;
    let mut progress = ConsoleProgress::new();
    let summary = pipeline::run_overlaps(
        &evidence,
        &output,
        &config,
        &mut progress,
        &CancelToken::new(),
    )?;
    report(&summary, &config);
    Ok(())
}

fn report(summary: &RunSummary, config: &ScoreConfig) {
    if let Some(path) = &summary.joint_dataset_path {
        info!(
            "Wrote {} associations to {}",
            summary.associations,
            path.display()
        );
    }
    info!(
        "Found {} target-target pairs with at least {} shared diseases; written to {}",
        summary.overlap_pairs,
        config.min_shared,
        summary.overlap_pairs_path.display()
    );
}
