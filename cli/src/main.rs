use std::io::Write;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use crd_openapi_core::{Merger, NameNormalizer};
use crd_openapi_source::{GeneratorConfig, load_catalog, load_fallback};
use tracing::{Level, info};

#[derive(Debug, Parser)]
#[command(name = "crd-openapi")]
#[command(about = "Merge generated CRD definitions with a reference OpenAPI document")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the merged OpenAPI document and write it to stdout.
    Generate(GenerateArgs),
    /// Print the public definition name for qualified type names.
    Normalize(NormalizeArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fallback OpenAPI document (default: swagger.json).
    #[arg(long)]
    fallback: Option<PathBuf>,
    /// Primary definition catalog (JSON, or YAML by extension).
    #[arg(long)]
    primary: Option<PathBuf>,
    /// Root resource qualified name; repeat for several. Replaces the configured roots.
    #[arg(long = "root")]
    roots: Vec<String>,
    /// Document title.
    #[arg(long)]
    title: Option<String>,
    /// Document API version.
    #[arg(long)]
    api_version: Option<String>,
    /// Drop definitions no root reaches.
    #[arg(long)]
    prune: bool,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    /// Qualified type names (e.g. k8s.io/api/core/v1.Pod).
    #[arg(required = true)]
    names: Vec<String>,
    /// YAML configuration file providing API kinds.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Normalize(args) => run_normalize(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<GeneratorConfig, String> {
    match path {
        Some(path) => GeneratorConfig::load(path).map_err(|err| err.to_string()),
        None => Ok(GeneratorConfig::default()),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(fallback) = args.fallback {
        config.fallback = fallback;
    }
    if let Some(primary) = args.primary {
        config.primary = Some(primary);
    }
    if !args.roots.is_empty() {
        config.roots = args.roots;
    }
    if let Some(title) = args.title {
        config.title = title;
    }
    if let Some(version) = args.api_version {
        config.version = version;
    }
    config.prune_unreachable |= args.prune;
    let primary_path = config.validate().map_err(|err| err.to_string())?;

    let fallback = load_fallback(&config.fallback).map_err(|err| err.to_string())?;
    info!(path = %config.fallback.display(), definitions = fallback.len(), "fallback loaded");

    let catalog = load_catalog(primary_path).map_err(|err| err.to_string())?;
    info!(path = %primary_path.display(), definitions = catalog.len(), "primary catalog loaded");

    let document = Merger::with_namer(config.namer())
        .with_options(config.merge_options())
        .merge(&catalog, &fallback, config.roots.as_slice())
        .map_err(|err| format!("cannot build openapi definitions: {err}"))?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .map_err(|err| format!("cannot marshal: {err}"))?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").map_err(|err| err.to_string())?;
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> Result<(), String> {
    let config = load_config(args.config.as_ref())?;
    let namer = config.namer();

    let mut stdout = std::io::stdout().lock();
    for name in &args.names {
        writeln!(stdout, "{name}\t{}", namer.normalized_name(name)).map_err(|err| err.to_string())?;
    }
    Ok(())
}
