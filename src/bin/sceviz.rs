//! sceviz CLI
//!
//! Converts schema and evolution documents into graph elements or DOT.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use sceviz::config::OutputFormat;
use sceviz::graph::Severity;
use sceviz::{loader, parse_evolution, Pipeline, PipelineOptions, VizConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sceviz")]
#[command(about = "Render JSON Schema documents and schema evolution as graphs")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a schema document into a node/edge graph
    Graph {
        /// Schema document (JSON)
        file: PathBuf,

        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reject numeric property names instead of folding them into arrays
        #[arg(long)]
        strict: bool,
    },

    /// Convert an evolution document into a version graph
    Evolution {
        /// Evolution document (JSON)
        file: PathBuf,

        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Schema document to resolve edge subjects against
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// View and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "sceviz.toml")]
        output: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Dot,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = VizConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Graph {
            file,
            format,
            output,
            strict,
        } => {
            let doc = loader::load_document(&file, &cfg.input)
                .with_context(|| format!("failed to load {}", file.display()))?;

            let mut options = PipelineOptions::from(&cfg);
            options.strict_array_indices |= strict;
            let graph = Pipeline::new(options).run(&doc)?;

            for item in graph.diagnostics() {
                match item.severity() {
                    Severity::Warning => eprintln!("⚠️  {}", item),
                    Severity::Info => eprintln!("ℹ️  {}", item),
                }
            }

            let rendered = match format {
                ExportFormat::Json => render_json(&graph.to_value()?, cfg.output.format)?,
                ExportFormat::Dot => graph.to_dot(),
            };
            emit(&rendered, output.as_deref())?;
            eprintln!(
                "✅ {} nodes, {} edges",
                graph.node_count(),
                graph.edge_count()
            );
        }

        Commands::Evolution {
            file,
            format,
            output,
            schema,
        } => {
            let doc = loader::load_document(&file, &cfg.input)
                .with_context(|| format!("failed to load {}", file.display()))?;
            let evolution = parse_evolution(doc)?;

            if let Some(schema_path) = schema {
                let schema_doc = loader::load_document(&schema_path, &cfg.input)
                    .with_context(|| format!("failed to load {}", schema_path.display()))?;
                let schema_graph = Pipeline::new(PipelineOptions::from(&cfg)).run(&schema_doc)?;

                for (edge, node) in evolution.subjects_in(&schema_graph) {
                    match (&edge.subject, node) {
                        (Some(subject), None) => {
                            eprintln!("⚠️  '{}' names {} which is not in the schema", edge.operation, subject)
                        }
                        (Some(_), Some(node)) => eprintln!("   {} → {}", edge.operation, node.label),
                        (None, _) => {}
                    }
                }
            }

            let rendered = match format {
                ExportFormat::Json => render_json(&evolution.to_value()?, cfg.output.format)?,
                ExportFormat::Dot => evolution.to_dot(),
            };
            emit(&rendered, output.as_deref())?;
            eprintln!(
                "✅ {} versions, {} operations",
                evolution.nodes.len(),
                evolution.edges.len()
            );
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show { toml, json } => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&cfg)?);
                } else if toml {
                    println!("{}", ::toml::to_string_pretty(&cfg)?);
                } else {
                    println!("📋 sceviz Configuration\n");
                    println!("Pipeline:");
                    println!("  Max depth: {}", cfg.pipeline.max_depth);
                    println!("  Strict array indices: {}", cfg.pipeline.strict_array_indices);

                    println!("\nInput:");
                    println!("  Max bytes: {}", cfg.input.max_bytes);
                    println!("  Extensions: {}", cfg.input.allowed_extensions.join(", "));

                    println!("\nOutput:");
                    println!("  Format: {:?}", cfg.output.format);
                    println!("  Grabbable nodes: {}", cfg.output.grabbable_nodes);
                }
            }

            ConfigCommands::Init { output } => {
                if Path::new(&output).exists() {
                    bail!("{} already exists", output);
                }
                VizConfig::default().save(&output)?;
                println!("✅ Created config file: {}", output);
            }
        },
    }

    Ok(())
}

fn render_json<T: Serialize>(value: &T, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
        OutputFormat::Compact => serde_json::to_string(value),
    }
}

fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("📝 Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
