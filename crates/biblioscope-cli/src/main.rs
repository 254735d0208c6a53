use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use biblioscope_core::catalogue::extract_links;
use biblioscope_core::tei::{TreeCache, schema};
use biblioscope_core::{
    ExitCode, ReconConfig, ReconError, Reconciler, RuleSetVariant, Sources, SummaryMode,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "biblioscope",
    about = "Compare catalogue metadata with metadata extracted from TEI documents",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format.
    #[arg(long, global = true)]
    json: bool,

    /// Read settings from this TOML file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log progress to stderr (repeat for more detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Score TEI titles against the catalogue export in a directory.
    Compare {
        /// Directory holding one *.seq export and a tei/ subdirectory.
        input_dir: PathBuf,

        /// Catalogue rule set (strict or loose).
        #[arg(long)]
        rules: Option<RuleSetVariant>,

        /// Count each category once instead of once per contiguous run.
        #[arg(long)]
        group_by_category: bool,
    },

    /// List document links recorded in a catalogue export.
    Links { seqfile: PathBuf },

    /// List element and attribute paths used in XML documents.
    Schema {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print each distinct path once, sorted.
        #[arg(long)]
        distinct: bool,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration as TOML.
    Show,
    /// Write the default configuration to a file.
    Init { path: PathBuf },
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli) {
        Ok(()) => ExitCode::Success,
        Err(err) => {
            eprintln!("Error: {err:#}");
            err.downcast_ref::<ReconError>()
                .map(ReconError::exit_code)
                .unwrap_or(ExitCode::GeneralError)
        }
    };
    std::process::exit(code as i32);
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let start = Instant::now();
    let mut config = load_config(cli.config.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Compare {
            input_dir,
            rules,
            group_by_category,
        } => {
            if let Some(variant) = rules {
                config.catalogue.rule_set = variant;
            }
            if group_by_category {
                config.report.summary = SummaryMode::ByCategory;
            }

            let reconciler = Reconciler::new(config)?;
            let sources = reconciler.load(&input_dir)?;
            let report = reconciler.compare(&sources);

            if cli.json {
                print_json(
                    &mut out,
                    &serde_json::json!({
                        "status": "ok",
                        "data": report,
                        "meta": compare_meta(&sources),
                    }),
                )?;
            } else {
                report.write_text(&mut out)?;
            }
        }

        Commands::Links { seqfile } => {
            let bytes = std::fs::read(&seqfile)
                .with_context(|| format!("reading {}", seqfile.display()))?;
            let contents = String::from_utf8_lossy(&bytes);
            let links = extract_links(contents.lines());

            if cli.json {
                print_json(
                    &mut out,
                    &serde_json::json!({
                        "status": "ok",
                        "data": { "items": links, "total": links.len() },
                    }),
                )?;
            } else {
                for link in &links {
                    writeln!(out, "{} {}", link.id, link.url)?;
                }
            }
        }

        Commands::Schema { files, distinct } => {
            let mut cache = TreeCache::new(config.tei.cache_capacity);
            if distinct {
                let paths: BTreeSet<String> = schema::distinct_paths(&mut cache, &files)?;
                if cli.json {
                    print_json(
                        &mut out,
                        &serde_json::json!({
                            "status": "ok",
                            "data": { "items": paths, "total": paths.len() },
                        }),
                    )?;
                } else {
                    for path in &paths {
                        writeln!(out, "{path}")?;
                    }
                }
            } else {
                let pairs = schema::paths_from_files(&mut cache, &files)?;
                if cli.json {
                    let items = schema_items(&pairs);
                    print_json(
                        &mut out,
                        &serde_json::json!({
                            "status": "ok",
                            "data": { "items": items, "total": items.len() },
                        }),
                    )?;
                } else {
                    for (file, path) in &pairs {
                        writeln!(out, "{} {path}", file.display())?;
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if cli.json {
                    print_json(
                        &mut out,
                        &serde_json::json!({ "status": "ok", "data": config }),
                    )?;
                } else {
                    write!(out, "{}", config.to_toml_string()?)?;
                }
            }
            ConfigAction::Init { path } => {
                if path.exists() {
                    bail!("{} already exists", path.display());
                }
                config.save_to(&path)?;
                writeln!(out, "Wrote default config to {}", path.display())?;
            }
        },
    }

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "done");
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<ReconConfig> {
    match path {
        Some(path) if !path.exists() => {
            Err(ReconError::Config(format!("config file not found: {}", path.display())).into())
        }
        Some(path) => Ok(ReconConfig::load_from(path)?),
        None => Ok(ReconConfig::default()),
    }
}

/// Paths go into JSON as display strings; non-UTF-8 paths are rendered lossily.
fn compare_meta(sources: &Sources) -> serde_json::Value {
    serde_json::json!({
        "catalogue": sources.catalogue_file.display().to_string(),
        "tei_dir": sources.tei_dir.display().to_string(),
    })
}

fn schema_items(pairs: &[(PathBuf, String)]) -> Vec<serde_json::Value> {
    pairs
        .iter()
        .map(|(file, path)| serde_json::json!({ "file": file.display().to_string(), "path": path }))
        .collect()
}

fn print_json<W: Write>(out: &mut W, val: &serde_json::Value) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(val)?)?;
    Ok(())
}
