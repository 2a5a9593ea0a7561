//! Threatflow CLI: command-line interface for the threat/attack graph engine
//!
//! Runs components in-process by default; with `--url` (or `THREATFLOW_URL`)
//! they run on a remote executor server instead.

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use serde_json::Value;
use std::path::{Path, PathBuf};
use threatflow_sdk::{
    apply_otm, build_otm, csv_escape, parse_otm, AnalyzeOptions, AttackPath, EmbeddedExecutor, EngineConfig,
    ExecutorClient, GraphSnapshot, OtmDocument, RemoteExecutor, SuggestOptions, TaraRow, TaraTable, ThreatGraph,
};
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "threatflow", version, about = "Threatflow threat/attack graph CLI")]
struct Cli {
    /// Remote executor URL; components run in-process when absent
    #[arg(long, global = true, env = "THREATFLOW_URL")]
    url: Option<String>,

    /// YAML configuration file
    #[arg(long, global = true, env = "THREATFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate attack paths from entry points to targets
    Paths {
        /// Model file: OTM document or graph snapshot (JSON)
        model: PathBuf,

        /// Maximum number of paths
        #[arg(long)]
        k: Option<usize>,

        /// Maximum number of entities per path
        #[arg(long)]
        max_depth: Option<usize>,

        /// Explicit source entity ids
        #[arg(long = "source")]
        sources: Vec<String>,

        /// Explicit target entity ids
        #[arg(long = "target")]
        targets: Vec<String>,

        /// Rank paths by impact and likelihood
        #[arg(long)]
        scored: bool,
    },
    /// Suggest attack methods for the enumerated paths
    Suggest {
        model: PathBuf,

        #[arg(long)]
        k: Option<usize>,

        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Derive TARA risk fields for a JSON array of rows
    Tara {
        rows: PathBuf,
    },
    /// Convert a graph snapshot to an OTM document
    ExportOtm {
        snapshot: PathBuf,

        /// Model name written to the document
        #[arg(long)]
        name: Option<String>,
    },
    /// Convert an OTM document to a graph snapshot
    ImportOtm {
        otm: PathBuf,
    },
    /// Export a model as Threagile YAML
    ExportThreagile {
        model: PathBuf,

        /// Document date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Run a named executor component with a raw JSON op
    Execute {
        component: String,

        /// OTM document or graph snapshot
        #[arg(long)]
        model: Option<PathBuf>,

        /// Op payload as JSON
        #[arg(long, default_value = "{}")]
        op: String,
    },
    /// Get executor status
    Status,
    /// Ping the executor
    Ping,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let client: Box<dyn ExecutorClient> = match &cli.url {
        Some(url) => {
            debug!("Using remote executor at {}", url);
            Box::new(RemoteExecutor::new(url))
        }
        None => Box::new(EmbeddedExecutor::with_config(config.clone())?),
    };
    let format = &cli.format;

    match cli.command {
        Commands::Paths {
            model,
            k,
            max_depth,
            sources,
            targets,
            scored,
        } => {
            let doc = load_model(&model, &config)?;
            let mut options = AnalyzeOptions::default()
                .with_k(k.unwrap_or(config.analysis.k))
                .with_max_depth(max_depth.unwrap_or(config.analysis.max_depth));
            if !sources.is_empty() {
                options = options.with_sources(sources);
            }
            if !targets.is_empty() {
                options = options.with_targets(targets);
            }
            if scored {
                let paths = client.scored_attack_paths(&doc, &options).await?;
                let rows = paths
                    .iter()
                    .enumerate()
                    .map(|(i, p)| vec![(i + 1).to_string(), format!("{:.2}", p.score), p.labels.join(" -> ")])
                    .collect();
                print_rows(format, &["#", "Score", "Path"], rows, &paths)
            } else {
                let paths = client.attack_paths(&doc, &options).await?;
                let rows = path_rows(&paths);
                print_rows(format, &["#", "Hops", "Path"], rows, &paths)
            }
        }
        Commands::Suggest { model, k, max_depth } => {
            let doc = load_model(&model, &config)?;
            let options = SuggestOptions {
                k: k.unwrap_or(config.analysis.k),
                max_depth: max_depth.unwrap_or(config.analysis.suggest_max_depth),
            };
            let methods = client.attack_methods(&doc, &options).await?;
            let rows = methods
                .iter()
                .map(|m| {
                    vec![
                        m.id.clone(),
                        m.title.clone(),
                        m.severity.to_string(),
                        format!("{:.2}", m.confidence),
                        m.matched_path.labels.join(" -> "),
                    ]
                })
                .collect();
            print_rows(format, &["Id", "Title", "Severity", "Confidence", "Path"], rows, &methods)
        }
        Commands::Tara { rows } => {
            let input: Vec<TaraRow> = serde_json::from_str(&std::fs::read_to_string(&rows)?)?;
            let derived = client.derive_tara(&input).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&derived)?),
                OutputFormat::Csv => print!("{}", TaraTable::from_rows(&derived).to_csv()),
                OutputFormat::Table => {
                    let table = TaraTable::from_rows(&derived);
                    print_table(&table.headers, &table.rows);
                }
            }
            Ok(())
        }
        Commands::ExportOtm { snapshot, name } => {
            let graph: ThreatGraph = serde_json::from_str::<GraphSnapshot>(&std::fs::read_to_string(&snapshot)?)?.into();
            let mut options = config.otm_options();
            if let Some(name) = name {
                options.name = name;
            }
            println!("{}", build_otm(&graph, &options)?.to_json_pretty()?);
            Ok(())
        }
        Commands::ImportOtm { otm } => {
            let doc = parse_otm(serde_json::from_str(&std::fs::read_to_string(&otm)?)?)?;
            let snapshot = apply_otm(&doc).snapshot();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        Commands::ExportThreagile { model, date } => {
            let doc = load_model(&model, &config)?;
            let date = date.unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
            print!("{}", client.threagile_yaml(&doc, Some(&date)).await?);
            Ok(())
        }
        Commands::Execute { component, model, op } => {
            let otm = match model {
                Some(path) => Some(serde_json::to_value(load_model(&path, &config)?)?),
                None => None,
            };
            let op: Value = serde_json::from_str(&op)?;
            let result = client.execute(&component, otm, op).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Status => {
            let status = client.status().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
                _ => {
                    println!("Status:     {}", status.status);
                    println!("Version:    {}", status.version);
                    println!("Rules:      {}", status.rules);
                    println!("Components: {}", status.components.join(", "));
                }
            }
            Ok(())
        }
        Commands::Ping => {
            println!("{}", client.ping().await?);
            Ok(())
        }
    }
}

/// Table rows for unscored paths; hops count flows, not entities
fn path_rows(paths: &[AttackPath]) -> Vec<Vec<String>> {
    paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            vec![
                (i + 1).to_string(),
                p.len().saturating_sub(1).to_string(),
                p.labels.join(" -> "),
            ]
        })
        .collect()
}

/// Read an OTM document, or a graph snapshot converted to OTM
fn load_model(path: &Path, config: &EngineConfig) -> Result<OtmDocument, Box<dyn std::error::Error>> {
    let value: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    if value.get("otmVersion").is_some() {
        return Ok(parse_otm(value)?);
    }
    let graph: ThreatGraph = serde_json::from_value::<GraphSnapshot>(value)?.into();
    debug!(entities = graph.entity_count(), "Loaded graph snapshot");
    Ok(build_otm(&graph, &config.otm_options())?)
}

fn print_rows<T: serde::Serialize>(
    format: &OutputFormat,
    headers: &[&str],
    rows: Vec<Vec<String>>,
    raw: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(raw)?),
        OutputFormat::Csv => {
            println!("{}", headers.join(","));
            for row in &rows {
                let cells: Vec<String> = row.iter().map(|c| csv_escape(c)).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("(no results)");
                return Ok(());
            }
            let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
            print_table(&headers, &rows);
            println!("{} row(s)", rows.len());
        }
    }
    Ok(())
}

fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers);
    for row in rows {
        table.add_row(row);
    }
    println!("{}", table);
}
