use crate::adapters::render::renderer_for;
use crate::app::dto::QueryRequest;
use crate::app::engine::CartographerEngine;
use crate::domain::edge::RelationshipType;
use crate::domain::namespace::NamespaceScheme;
use anyhow::{Context as _, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cartographer")]
#[command(about = "Map the package/module/class structure of a codebase and query it", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Syntax index: a JSON index file or a directory of *.syntax.json files
    pub input: PathBuf,

    #[command(subcommand)]
    pub command: Commands,

    /// JSON config file (namespace settings)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Package prefixed to every FQN
    #[arg(long, global = true)]
    pub root_package: Option<String>,

    /// File stem standing for its directory's package (repeatable)
    #[arg(long = "init-stem", global = true)]
    pub init_stems: Vec<String>,

    /// Path prefix stripped before mapping files to packages (repeatable)
    #[arg(long = "source-root", global = true)]
    pub source_roots: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the view around one or more root units
    Query(QueryArgs),

    /// List build diagnostics (unresolved references, ambiguous members)
    Diagnostics(DiagnosticsArgs),

    /// List every unit with its kind
    Units,

    /// Serve the HTTP API
    Serve(ServeArgs),

    /// Serve MCP tools over stdio
    Mcp,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Root FQN (repeatable); `.` means the whole project
    #[arg(long = "root", required = true)]
    pub roots: Vec<String>,

    /// Relationship hops to follow from the roots
    #[arg(long, default_value_t = 1)]
    pub depth: u32,

    /// Relationship type to leave out (repeatable)
    #[arg(long = "exclude", value_parser = parse_relationship_type)]
    pub exclude: Vec<RelationshipType>,

    /// Expand packages and modules into their contents
    #[arg(long)]
    pub children: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DiagnosticsArgs {
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print JSON instead of one line per finding
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8000)]
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Dot,
    Json,
}

impl OutputFormat {
    fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Dot => "dot",
            OutputFormat::Json => "json",
        }
    }
}

fn parse_relationship_type(value: &str) -> Result<RelationshipType, String> {
    RelationshipType::parse(value).ok_or_else(|| {
        let known: Vec<_> = RelationshipType::ALL.iter().map(|t| t.as_str()).collect();
        format!("unknown relationship type '{value}' (expected one of {})", known.join(", "))
    })
}

/// Settings file contents; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub namespace: NamespaceScheme,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Config file first, command-line flags on top.
pub fn resolve_scheme(cli: &Cli) -> Result<NamespaceScheme> {
    let mut scheme = match &cli.config {
        Some(path) => ConfigFile::load(path)?.namespace,
        None => NamespaceScheme::default(),
    };
    if let Some(root) = &cli.root_package {
        scheme.root_package = Some(root.clone());
    }
    if !cli.init_stems.is_empty() {
        scheme.init_stems = cli.init_stems.clone();
    }
    if !cli.source_roots.is_empty() {
        scheme.source_roots = cli.source_roots.clone();
    }
    Ok(scheme)
}

pub fn run_query(engine: &CartographerEngine, args: &QueryArgs) -> Result<()> {
    let request = QueryRequest {
        roots: args.roots.clone(),
        depth: args.depth,
        exclude: args.exclude.clone(),
        include_children: args.children,
    };
    let view = engine.query(request)?;

    let renderer = renderer_for(args.format.as_str())
        .ok_or_else(|| anyhow!("No renderer for format: {}", args.format.as_str()))?;
    let rendered = renderer.render(&view)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            eprintln!(
                "Wrote {} nodes, {} edges to {}",
                view.nodes.len(),
                view.edges.len(),
                path.display()
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

pub fn display_diagnostics(engine: &CartographerEngine, args: &DiagnosticsArgs) -> Result<()> {
    let result = engine.diagnostics(args.limit);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} diagnostic(s): {} unresolved, {} ambiguous",
        result.total, result.unresolved, result.ambiguous
    );
    println!("{}", "=".repeat(60));
    for d in &result.items {
        println!(
            "{}:{}:{} [{:?}] {} (in {})",
            d.location.path,
            d.location.line + 1,
            d.location.column + 1,
            d.kind,
            d.message,
            d.enclosing_fqn
        );
    }
    if result.items.len() < result.total {
        println!("... {} more", result.total - result.items.len());
    }
    Ok(())
}

pub fn display_units(engine: &CartographerEngine) -> Result<()> {
    for unit in engine.units() {
        println!("{:<10} {}", unit.kind.as_str(), unit.fqn);
    }
    Ok(())
}
