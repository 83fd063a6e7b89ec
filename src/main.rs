//! CLI entry point for the legal document retrieval core.
//!
//! Provides commands for configuring, indexing and querying a local corpus of
//! legal documents. Main components: Cli parser, Commands enum and the
//! synchronous command dispatch.

use anyhow::Context;
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use console::style;
use legalrag::agents::{
    Agent, EmptyReason, ExcerptSummarizer, QueryAgent, QueryOutcome, SummarizationAgent,
};
use legalrag::display::with_spinner;
use legalrag::io::{ExitCode, JsonResponse, OutputFormat};
use legalrag::{DatabaseError, Settings, VectorDatabase};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Legal document retrieval
#[derive(Parser)]
#[command(
    name = "legalrag",
    version = env!("CARGO_PKG_VERSION"),
    about = "Semantic search over legal documents",
    long_about = "Extract, embed and index legal documents, then retrieve the sections most relevant to a question.",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = "Quick Start:\n  $ legalrag init\n  $ legalrag index docs/civil_procedure.pdf docs/compliance.pdf\n  $ legalrag ask \"how do I start a lawsuit\""
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .legalrag directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings")]
    Config,

    /// Index documents
    #[command(about = "Extract, embed and index documents")]
    Index {
        /// Documents to index (defaults to ingest.documents from settings)
        #[arg(num_args = 0..)]
        paths: Vec<PathBuf>,

        /// Delete the existing index and rebuild it
        #[arg(short, long)]
        force: bool,
    },

    /// Search indexed sections
    #[command(about = "Find the sections closest to a query")]
    Search {
        query: String,

        /// Number of sections to return (overrides config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer a question from indexed sections
    #[command(about = "Retrieve relevant sections and summarize them")]
    Ask {
        question: String,

        /// Number of sections to consider (overrides config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(config_path) => Settings::load_from(config_path).unwrap_or_else(|e| {
            eprintln!(
                "Configuration error loading from {}: {e}",
                config_path.display()
            );
            std::process::exit(ExitCode::ConfigError.into());
        }),
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        }),
    };

    init_tracing(&settings, cli.verbose);

    let code = match run(cli.command, settings) {
        Ok(code) => code,
        Err(e) => report_error(&e),
    };
    std::process::exit(code.into());
}

/// Install the stderr log subscriber. `LEGALRAG_LOG` takes precedence.
fn init_tracing(settings: &Settings, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        settings.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_env("LEGALRAG_LOG")
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn report_error(error: &anyhow::Error) -> ExitCode {
    eprintln!("{} {error:#}", style("Error:").red().bold());

    match error.downcast_ref::<DatabaseError>() {
        Some(db_error) => {
            let suggestions = db_error.recovery_suggestions();
            if !suggestions.is_empty() {
                eprintln!("\nSuggestions:");
                for suggestion in suggestions {
                    eprintln!("  - {suggestion}");
                }
            }
            ExitCode::from_error(db_error)
        }
        None => ExitCode::GeneralError,
    }
}

fn run(command: Commands, settings: Settings) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("Created configuration file at: {}", path.display());
            println!("Edit this file to customize your settings.");
            Ok(ExitCode::Success)
        }

        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            let toml_str =
                toml::to_string_pretty(&settings).context("Failed to render configuration")?;
            println!("{toml_str}");
            Ok(ExitCode::Success)
        }

        Commands::Index { paths, force } => run_index(&settings, paths, force),

        Commands::Search { query, top_k, json } => {
            let top_k = top_k.unwrap_or(settings.retrieval.top_k);
            run_search(&settings, &query, top_k, OutputFormat::from_json_flag(json))
        }

        Commands::Ask { question, top_k } => {
            let top_k = top_k.unwrap_or(settings.retrieval.top_k);
            run_ask(&settings, &question, top_k)
        }
    }
}

fn open_database(settings: &Settings) -> Result<VectorDatabase, DatabaseError> {
    with_spinner("Loading embedding model...", || {
        VectorDatabase::from_settings(settings)
    })
}

fn run_index(settings: &Settings, paths: Vec<PathBuf>, force: bool) -> anyhow::Result<ExitCode> {
    let paths = if paths.is_empty() {
        settings.ingest.documents.clone()
    } else {
        paths
    };
    if paths.is_empty() {
        anyhow::bail!(
            "No documents to index. Pass paths or set ingest.documents in .legalrag/settings.toml"
        );
    }

    let mut db = open_database(settings)?;
    if force {
        db.reset()?;
    } else if !db.is_empty() {
        println!(
            "Index already contains {} sections. Use --force to rebuild.",
            db.section_count()
        );
        return Ok(ExitCode::Success);
    }

    let report = with_spinner("Extracting and embedding documents...", || {
        db.load_documents(&paths)
    })?;

    for skipped in &report.documents_skipped {
        eprintln!(
            "{} {}: {}",
            style("Skipped").yellow(),
            skipped.path.display(),
            skipped.reason
        );
    }
    if report.sections_skipped > 0 {
        eprintln!(
            "{} {} pages with no embeddable text",
            style("Skipped").yellow(),
            report.sections_skipped
        );
    }
    println!(
        "Indexed {} sections from {} documents into {}",
        report.sections_indexed,
        report.documents_processed,
        db.base_path().display()
    );

    if report.sections_indexed == 0 {
        return Ok(ExitCode::NotFound);
    }
    Ok(ExitCode::Success)
}

fn run_search(
    settings: &Settings,
    query: &str,
    top_k: usize,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let db = open_database(settings)?;
    let hits = db.search_hits(query, top_k).map_err(DatabaseError::from)?;
    let code = ExitCode::from_results(&hits);

    if format.is_json() {
        let response = if code.is_success() {
            JsonResponse::success(hits)
        } else {
            JsonResponse::not_found(hits, format!("No sections matched '{query}'"))
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(code);
    }

    if hits.is_empty() {
        println!("No sections matched '{query}'");
        return Ok(code);
    }

    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{} {} {}",
            style(format!("{}.", rank + 1)).bold(),
            style(format!("[section {}]", hit.section_id)).cyan(),
            style(format!("distance {:.4}", hit.distance)).dim()
        );
        println!("   {}\n", hit.text);
    }
    Ok(code)
}

fn run_ask(settings: &Settings, question: &str, top_k: usize) -> anyhow::Result<ExitCode> {
    let db = open_database(settings)?;
    let query_agent = QueryAgent::new(&db, top_k);

    let sections = match query_agent.process(question) {
        QueryOutcome::Found(sections) => sections,
        QueryOutcome::Empty(reason) => {
            println!("No answer: {reason}");
            let code = match reason {
                EmptyReason::NothingIndexed | EmptyReason::NoMatches => ExitCode::NotFound,
                EmptyReason::InvalidQuery(_) => ExitCode::InvalidQuery,
                EmptyReason::SearchFailed(_) => ExitCode::GeneralError,
            };
            return Ok(code);
        }
    };

    let summarizer = SummarizationAgent::new(ExcerptSummarizer::default());
    let answer = summarizer.process(&sections);

    println!("{}", style("Answer:").cyan().bold());
    println!("{answer}\n");
    println!("{}", style("Sources:").cyan().bold());
    for section in &sections {
        let preview: String = section.chars().take(80).collect();
        println!("  - {preview}");
    }
    Ok(ExitCode::Success)
}
