//! Unity Asset Graph CLI
//!
//! Command-line interface for parsing Unity text assets, listing their
//! dependencies and running the deconstruct/reconstruct workflow.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use unity_asset_graph::loader::DEFAULT_MAX_FILE_SIZE;
use unity_asset_graph::{
    DeconstructedComponent, ExportFormat, LoadedAsset, LoaderConfig, collect_parseable_paths,
    deconstruct, load_asset, load_assets, reconstruct,
};

#[derive(Parser)]
#[command(name = "unity_asset_graph")]
#[command(about = "Parse Unity text assets into GameObject graphs")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides the default of warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Refuse files larger than this many bytes
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_file_size: u64,

    /// Worker threads for batch parsing (0 = one per CPU)
    #[arg(short, long, global = true, default_value_t = 0)]
    jobs: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse prefabs, scenes and materials (directories are searched)
    Parse {
        /// Input files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Debug)]
        format: OutputFormat,
    },

    /// List the asset GUIDs a file references, one per line
    Deps {
        input: PathBuf,

        /// Print each GUID once
        #[arg(long)]
        unique: bool,
    },

    /// Show the editable component records of an asset
    Deconstruct {
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Write a reconstructed artifact for an asset
    Reconstruct {
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Artifact format (json, unitypackage)
        #[arg(long, default_value = "json")]
        export_format: ExportFormat,

        /// Edited component records (JSON array); defaults to a fresh deconstruct
        #[arg(long)]
        components: Option<PathBuf>,

        /// Modified properties (JSON object)
        #[arg(long)]
        modifications: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
    Debug,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = LoaderConfig {
        max_file_size: cli.max_file_size,
        max_concurrent_loads: cli.jobs,
        ..LoaderConfig::default()
    };

    match cli.command {
        Commands::Parse { inputs, format } => parse_command(&inputs, format, &config),
        Commands::Deps { input, unique } => deps_command(&input, unique, &config),
        Commands::Deconstruct { input, format } => deconstruct_command(&input, format, &config),
        Commands::Reconstruct {
            input,
            output,
            export_format,
            components,
            modifications,
        } => reconstruct_command(
            &input,
            &output,
            export_format,
            components.as_deref(),
            modifications.as_deref(),
            &config,
        ),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render<T: Serialize + Debug>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Debug => format!("{:#?}", value),
    })
}

fn parse_command(inputs: &[PathBuf], format: OutputFormat, config: &LoaderConfig) -> Result<()> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(collect_parseable_paths(input)?);
        } else {
            files.push(input.clone());
        }
    }

    let mut failures = 0;
    for (path, result) in load_assets(&files, config) {
        let parsed = result.and_then(|loaded| {
            let parsed = loaded.parsed()?.cloned();
            Ok(parsed)
        });
        match parsed {
            Ok(Some(parsed)) => {
                println!("# {}", path.display());
                println!("{}", render(&parsed, format)?);
            }
            Ok(None) => eprintln!("{}: nothing to parse", path.display()),
            Err(e) => {
                failures += 1;
                eprintln!("{}: {}", path.display(), e);
            }
        }
    }

    if failures > 0 && failures == files.len() {
        bail!("no input could be parsed");
    }
    Ok(())
}

fn deps_command(input: &Path, unique: bool, config: &LoaderConfig) -> Result<()> {
    let config = LoaderConfig {
        dedupe_dependencies: unique,
        ..config.clone()
    };
    let loaded = load_asset(input, &config)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    for guid in &loaded.dependencies {
        println!("{}", guid);
    }
    Ok(())
}

fn load_for_workflow(input: &Path, config: &LoaderConfig) -> Result<LoadedAsset> {
    load_asset(input, config).with_context(|| format!("Failed to load {}", input.display()))
}

fn deconstruct_command(input: &Path, format: OutputFormat, config: &LoaderConfig) -> Result<()> {
    let loaded = load_for_workflow(input, config)?;
    let components = deconstruct(&loaded.source, loaded.parsed.as_ref());
    println!("{}", render(&components, format)?);
    Ok(())
}

fn reconstruct_command(
    input: &Path,
    output: &Path,
    export_format: ExportFormat,
    components: Option<&Path>,
    modifications: Option<&Path>,
    config: &LoaderConfig,
) -> Result<()> {
    let loaded = load_for_workflow(input, config)?;

    let components: Vec<DeconstructedComponent> = match components {
        Some(path) => read_json(path)?,
        None => deconstruct(&loaded.source, loaded.parsed.as_ref()),
    };
    let modifications: Map<String, Value> = match modifications {
        Some(path) => read_json(path)?,
        None => Map::new(),
    };

    let artifact = reconstruct(&loaded.source, &components, &modifications, export_format)?;

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    let target = output.join(artifact.file_name());
    std::fs::write(&target, &artifact.bytes)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!("✓ Wrote {} ({} bytes)", target.display(), artifact.bytes.len());
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}
