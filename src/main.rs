use anyhow::Context;
use clap::Parser;
use memsearch::api::{create_router, AppState, SharedState};
use memsearch::{paginate, DocId, DocumentStatus, SearchEngine};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "In-memory ranked full-text search engine", long_about = None)]
struct Args {
    /// Whitespace-separated stop words excluded from indexing and queries
    #[arg(short, long, default_value = "")]
    stop_words: String,

    /// JSON file with seed documents to index at startup
    #[arg(short, long)]
    docs: Option<PathBuf>,

    /// Run a single query against the seeded index and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Page size used when printing query results
    #[arg(long, default_value_t = 5)]
    page_size: usize,

    /// Listen address for the HTTP API
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    addr: String,
}

// Seed corpus entry
#[derive(Debug, Deserialize)]
struct SeedDocument {
    id: DocId,
    text: String,
    #[serde(default = "default_status")]
    status: DocumentStatus,
    ratings: Vec<i32>,
}

fn default_status() -> DocumentStatus {
    DocumentStatus::Actual
}

fn load_seed_documents(engine: &mut SearchEngine, path: &Path) -> anyhow::Result<usize> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let documents: Vec<SeedDocument> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let count = documents.len();
    for document in documents {
        engine
            .add_document(document.id, &document.text, document.status, &document.ratings)
            .with_context(|| format!("failed to index seed document {}", document.id))?;
    }
    Ok(count)
}

fn run_query(engine: &SearchEngine, query: &str, page_size: usize) -> anyhow::Result<()> {
    let start = Instant::now();
    let documents = engine.find_top_documents(query)?;
    let duration = start.elapsed();

    println!("Found {} documents in {:?}", documents.len(), duration);
    for (page_number, page) in paginate(&documents, page_size).iter().enumerate() {
        println!("Page {}:", page_number + 1);
        for document in page {
            println!("  {document}");
        }
    }
    Ok(())
}

async fn serve(engine: SearchEngine, addr: &str) -> anyhow::Result<()> {
    let state: SharedState = Arc::new(RwLock::new(AppState::new(engine)));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut engine = SearchEngine::from_text(&args.stop_words)?;
    if let Some(path) = &args.docs {
        let start = Instant::now();
        let count = load_seed_documents(&mut engine, path)?;
        tracing::info!("indexed {} documents in {:?}", count, start.elapsed());
    }

    match &args.query {
        Some(query) => run_query(&engine, query, args.page_size),
        None => serve(engine, &args.addr).await,
    }
}
