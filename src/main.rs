//! deepscout - Multi-Source Research Evidence Pipeline
//!
//! Aggregates web and academic evidence for a research subject, filters it
//! for quality, removes near-duplicates and synthesises a cited report.
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! deepscout research "solid state batteries" --general-rounds 3 --academic-rounds 2
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! deepscout serve --port 3000
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use deepscout::{
    config::Config,
    gemini::GeminiClient,
    keywords, pipeline,
    record::{Record, SourceMeta},
    report, search::Sources,
    synthesis,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Multi-Source Research Evidence Pipeline
#[derive(Parser)]
#[command(name = "deepscout")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the research pipeline for a subject
    Research {
        /// Research subject
        subject: String,

        /// Number of general web search queries to issue
        #[arg(long, default_value_t = 3)]
        general_rounds: usize,

        /// Number of academic search queries to issue
        #[arg(long, default_value_t = 3)]
        academic_rounds: usize,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Research {
            subject,
            general_rounds,
            academic_rounds,
            output,
        } => run_research_pipeline(subject, general_rounds, academic_rounds, output).await,
        Commands::Serve { port, host } => run_server(host, port).await,
    }
}

// ============================================================================
// Research Pipeline
// ============================================================================

async fn run_research_pipeline(
    subject: String,
    general_rounds: usize,
    academic_rounds: usize,
    output_dir: PathBuf,
) -> Result<()> {
    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let safe_subject: String = subject
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .replace(' ', "_");
    let output_folder = output_dir.join(format!("{}_{}", timestamp, safe_subject));
    std::fs::create_dir_all(&output_folder).context("Failed to create output directory")?;

    println!("Output folder: {}", output_folder.display());

    let gemini = GeminiClient::new(&config.gemini_key);

    // ===========================================
    // STAGE 1: Query Generation
    // ===========================================
    println!("\n--- Stage 1: Query Generation ---");

    let queries = keywords::generate_keywords(&gemini, &subject, general_rounds, academic_rounds).await;
    println!(
        "Generated {} general and {} academic queries.",
        queries.general.len(),
        queries.academic.len()
    );

    // ===========================================
    // STAGE 2: Source Fan-out
    // ===========================================
    println!("\n--- Stage 2: Source Fan-out ---");

    let sources = Sources::new(&config, gemini.clone());
    let records = sources.search_all(&queries, &subject).await;

    if records.is_empty() {
        println!("No records retrieved.");
        return Ok(());
    }
    println!("Retrieved {} candidate records.", records.len());

    // ===========================================
    // STAGE 3: Quality Filtering & Deduplication
    // ===========================================
    println!("\n--- Stage 3: Quality Filtering & Deduplication ---");

    let mut records = pipeline::filter_records(
        records,
        config.max_tokens_per_url,
        config.max_snippets_to_keep,
    );
    println!("{} records survived filtering.", records.len());

    if records.is_empty() {
        println!("Nothing left after filtering.");
        return Ok(());
    }

    // ===========================================
    // STAGE 4: Bibliometrics
    // ===========================================
    println!("\n--- Stage 4: Bibliometrics ---");

    let biblio_path = report::save_bibliometrics(&records, &output_folder)
        .context("Failed to save bibliometrics report")?;
    println!("Saved: {:?}", biblio_path);

    // ===========================================
    // STAGE 5: Synthesis
    // ===========================================
    println!("\n--- Stage 5: Synthesis ---");

    let final_report = synthesis::synthesise(&gemini, &mut records, &subject).await;
    if final_report.is_empty() {
        println!("Synthesis produced no report.");
    } else {
        let report_path = output_folder.join("report.md");
        std::fs::write(&report_path, &final_report).context("Failed to write report")?;
        println!("Saved: {:?}", report_path);
    }

    let csv_path = output_folder.join("records.csv");
    save_csv(&csv_path, &records)?;

    println!("\n✓ Pipeline complete. Results in: {}", output_folder.display());
    Ok(())
}

/// Flat row for CSV export; the tagged metadata does not serialise to CSV.
#[derive(Debug, Serialize)]
struct RecordRow {
    reference_number: String,
    title: String,
    url: String,
    source_kind: String,
    venue: String,
    year: String,
    citations: String,
    authors: String,
    body: String,
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        let (venue, year, authors) = match &record.meta {
            SourceMeta::Academic {
                venue,
                year,
                authors,
                ..
            } => (
                venue.clone().unwrap_or_default(),
                year.map(|y| y.to_string()).unwrap_or_default(),
                authors.join("; "),
            ),
            SourceMeta::Web { .. } => (String::new(), String::new(), String::new()),
        };
        Self {
            reference_number: record
                .reference_number
                .map(|n| n.to_string())
                .unwrap_or_default(),
            title: record.title.clone(),
            url: record.url.clone(),
            source_kind: match record.source_kind {
                deepscout::record::SourceKind::Web => "web".to_string(),
                deepscout::record::SourceKind::Academic => "academic".to_string(),
            },
            venue,
            year,
            citations: record.citations().to_string(),
            authors,
            body: record.body.clone(),
        }
    }
}

/// Save the final records to CSV.
fn save_csv(path: &std::path::Path, records: &[Record]) -> Result<()> {
    if records.is_empty() {
        println!("No data to save to {:?}", path);
        return Ok(());
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context("Failed to create CSV writer")?;

    for record in records {
        wtr.serialize(RecordRow::from(record))
            .context("Failed to write CSV record")?;
    }

    wtr.flush().context("Failed to flush CSV")?;
    println!("Saved: {:?}", path);
    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(host: String, port: u16) -> Result<()> {
    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;

    info!(host = %host, port = port, "Starting HTTP server");
    println!("Starting server at http://{}:{}", host, port);

    let gemini = GeminiClient::new(&config.gemini_key);
    let sources = Sources::new(&config, gemini.clone());
    let app_state = Arc::new(AppState {
        config,
        gemini,
        sources,
    });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/search", post(search_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

struct AppState {
    config: Config,
    gemini: GeminiClient,
    sources: Sources,
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Search request body
#[derive(Debug, Deserialize)]
struct SearchRequest {
    subject: String,
    #[serde(default = "default_rounds")]
    general_rounds: usize,
    #[serde(default = "default_rounds")]
    academic_rounds: usize,
}

fn default_rounds() -> usize {
    3
}

/// Search response
#[derive(Debug, Serialize)]
struct SearchResponse {
    status: String,
    count: usize,
    records: Vec<Record>,
}

/// Search endpoint handler: runs retrieval and filtering, no synthesis.
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<SearchResponse> {
    info!(subject = %req.subject, "Search request");

    if req.subject.trim().is_empty() {
        error!("Empty subject in search request");
        return Json(SearchResponse {
            status: "error: empty subject".to_string(),
            count: 0,
            records: vec![],
        });
    }

    let queries = keywords::generate_keywords(
        &state.gemini,
        &req.subject,
        req.general_rounds,
        req.academic_rounds,
    )
    .await;
    let records = state.sources.search_all(&queries, &req.subject).await;
    let records = pipeline::filter_records(
        records,
        state.config.max_tokens_per_url,
        state.config.max_snippets_to_keep,
    );

    Json(SearchResponse {
        status: "success".to_string(),
        count: records.len(),
        records,
    })
}
