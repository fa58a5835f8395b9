use std::{io, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::{
    domain::{city_index, evaluate_scenarios, EvaluationError, Good, ScenarioFilter},
    infra::{
        analysis::{
            AnalysisError, AnalysisRunner, ANALYSIS_SECTIONS, DEFAULT_OUTPUT_DIR, DEFAULT_RUNNER,
        },
        config::{load_config, ConfigError},
        report::{write_reports, OutputFormat, ReportError},
    },
    util::persistence::default_config_file,
};

#[derive(Parser)]
#[command(
    name = "jimi",
    author,
    version,
    about = "jimi - A CLI tool for all personal projects of Jimi."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Commands for a real-estate project
    #[command(subcommand)]
    Immo(ImmoCommands),
}

#[derive(Subcommand)]
pub enum ImmoCommands {
    /// Evaluate different scenarios of a real-estate purchase
    Evaluate(EvaluateArgs),

    /// Analyze a real-estate listing with the AI runner
    Analyze(AnalyzeArgs),

    /// Show the JSON schema of a real-estate offer
    ShowSchema,
}

#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to the YAML configuration
    #[arg(short, long, env = "JIMI_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,

    /// Only evaluate the good with this id
    #[arg(long)]
    good: Option<String>,

    /// Only evaluate the offers of this bank
    #[arg(long)]
    bank: Option<String>,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Identifier of the listing in the runner's store
    listing: String,

    /// Program invoked for every analysis section
    #[arg(long, default_value = DEFAULT_RUNNER)]
    runner: String,

    /// Directory receiving the markdown report
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Only run these sections, e.g. `--sections 1,6`
    #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u8).range(1..=6))]
    sections: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("failed to render schema: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("no scenario matches the given filters")]
    NoScenario,
}

pub fn run(cli: &Cli) -> Result<(), AppError> {
    match &cli.command {
        Commands::Immo(command) => match command {
            ImmoCommands::Evaluate(args) => run_evaluate(args),
            ImmoCommands::Analyze(args) => run_analyze(args),
            ImmoCommands::ShowSchema => run_show_schema(),
        },
    }
}

fn run_evaluate(args: &EvaluateArgs) -> Result<(), AppError> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_file().ok_or(ConfigError::NoConfigDir)?,
    };
    let config = load_config(&path)?;
    let filter = ScenarioFilter {
        good_id: args.good.clone(),
        bank: args.bank.clone(),
    };

    let stats = city_index(&config.city_stats);
    let reports = evaluate_scenarios(
        config.household(),
        &config.goods,
        &config.mortgages,
        &stats,
        &filter,
    )?;
    if reports.is_empty() {
        return Err(AppError::NoScenario);
    }

    for report in &reports {
        for alert in &report.evaluation.alerts {
            tracing::warn!(good = %report.good, bank = %report.bank, "{alert}");
        }
    }

    write_reports(&reports, args.format, io::stdout().lock())?;
    Ok(())
}

fn run_analyze(args: &AnalyzeArgs) -> Result<(), AppError> {
    let mut runner = AnalysisRunner::new(args.runner.as_str(), args.output_dir.as_path());
    if !args.sections.is_empty() {
        let selected = (1u8..)
            .zip(ANALYSIS_SECTIONS)
            .filter(|(number, _)| args.sections.contains(number))
            .map(|(_, section)| section)
            .collect();
        runner = runner.with_sections(selected);
    }
    let path = runner.analyze(&args.listing)?;
    println!("Analysis completed. Visit file for details: {}", path.display());
    Ok(())
}

fn run_show_schema() -> Result<(), AppError> {
    let schema = schemars::schema_for!(Good);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
