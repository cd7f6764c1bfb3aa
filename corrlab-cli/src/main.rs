//! corrlab CLI: run a stratified correlation battery and inspect datasets.
//!
//! Commands:
//! - `run`: correlate an outcome with predictors, optionally per stratum
//! - `columns`: list columns, their type and level count, or resolve a selection

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use corrlab_core::data::resolve_columns;
use corrlab_core::{Alternative, Dataset, Method, MissingPolicy};
use corrlab_runner::{
    export_csv, export_json, generate_report, parse_override_map, run_correlations,
    BonferroniScope, ConfigError, CorrelationConfig, RunReport, StratificationMode,
};

#[derive(Parser)]
#[command(
    name = "corrlab",
    version,
    about = "corrlab CLI: stratified correlation batteries with Bonferroni correction"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a correlation battery and write the result table.
    Run(RunArgs),
    /// List the columns of a dataset, or resolve selection expressions.
    Columns {
        /// CSV or Parquet file.
        #[arg(long)]
        data: PathBuf,

        /// Selection expressions, e.g. `where(is.numeric)` `-mpg`.
        #[arg(long, num_args = 1..)]
        select: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
    Markdown,
}

#[derive(Args)]
struct RunArgs {
    /// CSV or Parquet file.
    #[arg(long)]
    data: PathBuf,

    /// TOML config file. Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Outcome column (required without --config).
    #[arg(long)]
    outcome: Option<String>,

    /// Predictor selection expressions.
    #[arg(long, num_args = 1..)]
    predictors: Vec<String>,

    /// Stratification selection expressions.
    #[arg(long, num_args = 1..)]
    strata: Vec<String>,

    /// separate or crossed.
    #[arg(long)]
    mode: Option<String>,

    /// Default method: pearson, kendall or spearman.
    #[arg(long)]
    method: Option<String>,

    /// Per-predictor methods, e.g. `carb=spearman,hp=kendall`.
    #[arg(long)]
    method_map: Option<String>,

    /// Default alternative: two.sided, less or greater.
    #[arg(long)]
    directionality: Option<String>,

    /// Per-predictor alternatives, e.g. `wt=less`.
    #[arg(long)]
    directionality_map: Option<String>,

    /// everything, all.obs, complete.obs, na.or.complete or pairwise.complete.obs.
    #[arg(long)]
    missing: Option<String>,

    /// Disable Bonferroni correction (drops the p_bonf column).
    #[arg(long, default_value_t = false)]
    no_bonferroni: bool,

    /// Correction scope: both or stratified_only.
    #[arg(long)]
    scope: Option<String>,

    /// Treat missing stratification values as a level of their own.
    #[arg(long, default_value_t = false)]
    keep_missing_strata: bool,

    /// Evaluate tests on the calling thread only.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Write to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Run(args) => run_battery(args, cli.verbose > 0),
        Commands::Columns { data, select } => list_columns(&data, &select),
    }
}

fn run_battery(args: RunArgs, verbose: bool) -> Result<()> {
    let dataset = Dataset::load(&args.data)
        .with_context(|| format!("failed to load {}", args.data.display()))?;
    log::info!(
        "loaded {} ({} rows, {} columns)",
        args.data.display(),
        dataset.n_rows(),
        dataset.n_columns()
    );
    let config = build_config(&args, verbose)?;

    let table = run_correlations(&dataset, &config)?;
    let report = RunReport::new(&table, &config, &dataset);

    let rendered = match args.format {
        OutputFormat::Csv => export_csv(&table)?,
        OutputFormat::Json => export_json(&report)?,
        OutputFormat::Markdown => generate_report(&report, &table),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "{} row(s) written to {} (config {})",
                table.len(),
                path.display(),
                &report.config_hash[..12]
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Start from the config file (if any) and apply command-line overrides.
fn build_config(args: &RunArgs, verbose: bool) -> Result<CorrelationConfig> {
    let mut config = match (&args.config, &args.outcome) {
        (Some(path), _) => CorrelationConfig::from_file(path)?,
        (None, Some(outcome)) => {
            if args.predictors.is_empty() {
                bail!("--predictors is required without --config");
            }
            CorrelationConfig::new(outcome.as_str(), &[])
        }
        (None, None) => bail!("one of --config or --outcome is required"),
    };

    if let Some(outcome) = &args.outcome {
        config.outcome = outcome.clone();
    }
    if !args.predictors.is_empty() {
        config.predictors = args.predictors.clone();
    }
    if !args.strata.is_empty() {
        config.stratification_vars = args.strata.clone();
    }
    if let Some(mode) = &args.mode {
        config.stratification_mode = mode
            .parse::<StratificationMode>()
            .map_err(|e| ConfigError::invalid("stratification_mode", e))?;
    }
    if let Some(method) = &args.method {
        config.method = method
            .parse::<Method>()
            .map_err(|e| ConfigError::invalid("method", e))?;
    }
    if let Some(map) = &args.method_map {
        config.method_map.extend(parse_override_map::<Method>("method_map", map)?);
    }
    if let Some(dir) = &args.directionality {
        config.directionality = dir
            .parse::<Alternative>()
            .map_err(|e| ConfigError::invalid("directionality", e))?;
    }
    if let Some(map) = &args.directionality_map {
        config
            .directionality_map
            .extend(parse_override_map::<Alternative>("directionality_map", map)?);
    }
    if let Some(missing) = &args.missing {
        config.missing = missing
            .parse::<MissingPolicy>()
            .map_err(|e| ConfigError::invalid("missing", e))?;
    }
    if args.no_bonferroni {
        config.bonferroni_correct = false;
    }
    if let Some(scope) = &args.scope {
        config.bonferroni_scope = scope
            .parse::<BonferroniScope>()
            .map_err(|e| ConfigError::invalid("bonferroni_scope", e))?;
    }
    if args.keep_missing_strata {
        config.drop_missing_strata = false;
    }
    if args.sequential {
        config.parallel = false;
    }
    config.verbose |= verbose;

    Ok(config)
}

fn list_columns(path: &Path, select: &[String]) -> Result<()> {
    let dataset = Dataset::load(path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    if !select.is_empty() {
        for name in resolve_columns(select, &dataset)? {
            println!("{name}");
        }
        return Ok(());
    }

    println!("{} rows, {} columns", dataset.n_rows(), dataset.n_columns());
    println!();
    println!("{:<24} {:<8} {:>8} {:>8}", "Column", "Type", "Levels", "Missing");
    println!("{}", "-".repeat(51));
    for column in dataset.columns() {
        let missing = (0..column.len())
            .filter(|&r| column.data.is_missing(r))
            .count();
        println!(
            "{:<24} {:<8} {:>8} {:>8}",
            column.name,
            if column.is_numeric() { "numeric" } else { "text" },
            column.levels(true).len(),
            missing
        );
    }
    Ok(())
}
