use article_search_core::{
    ArticleStore, Document, EmbeddingProvider, HashEmbedder, HttpEmbeddingClient, IndexError, Indexer,
    MemoryStore, RetrievalEngine, TextExtractor, DEFAULT_SEMANTIC_THRESHOLD,
};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "article-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Folder containing documents.json plus one extracted text file per
    /// page image reference.
    #[arg(long, default_value = "corpus")]
    corpus: String,

    /// Embedding endpoint; the offline hash embedder is used when unset.
    #[arg(long, env = "EMBEDDINGS_ENDPOINT")]
    embeddings_endpoint: Option<String>,

    /// Embedding model name.
    #[arg(long, default_value = "text-embedding-3-small")]
    embeddings_model: String,
}

#[derive(Subcommand)]
enum Command {
    /// Index every document in the corpus and print chunk counts.
    Index,
    /// Index the corpus in memory, then run a query against it.
    Search {
        /// Search query
        #[arg(long)]
        query: String,
        /// Number of results to return.
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Which search branch to exercise.
        #[arg(long, value_enum, default_value_t = Mode::Hybrid)]
        mode: Mode,
        /// Minimum cosine similarity for standalone semantic search.
        #[arg(long, default_value_t = DEFAULT_SEMANTIC_THRESHOLD)]
        threshold: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Lexical,
    Semantic,
    Hybrid,
}

/// Resolves a page-image reference to `<corpus>/<ref>.txt` and reads the
/// extracted text from disk. Stands in for the OCR collaborator.
struct FileTextExtractor {
    corpus: PathBuf,
}

#[async_trait::async_trait]
impl TextExtractor for FileTextExtractor {
    async fn extract_text(&self, image_ref: &str) -> Result<String, IndexError> {
        let path = self.corpus.join(format!("{image_ref}.txt"));
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let embedder: Arc<dyn EmbeddingProvider> = match &cli.embeddings_endpoint {
        Some(endpoint) => Arc::new(HttpEmbeddingClient::new(endpoint, &cli.embeddings_model)?),
        None => Arc::new(HashEmbedder::default()),
    };

    let store = Arc::new(MemoryStore::new());
    let corpus = PathBuf::from(&cli.corpus);

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        corpus = %corpus.display(),
        "article-search boot"
    );

    let indexed = index_corpus(&corpus, store.clone(), embedder.clone()).await?;

    match cli.command {
        Command::Index => {
            let total: usize = indexed.iter().map(|row| row.chunk_count).sum();
            for row in &indexed {
                println!(
                    "indexed article_id={} title={:?} chunks={}",
                    row.article_id, row.title, row.chunk_count
                );
            }
            println!(
                "{} chunks across {} documents at {}",
                total,
                indexed.len(),
                Utc::now().to_rfc3339()
            );
        }
        Command::Search {
            query,
            limit,
            mode,
            threshold,
        } => {
            let engine = RetrievalEngine::new(store, embedder);

            let results = match mode {
                Mode::Lexical => engine.lexical_search(&query, limit).await?,
                Mode::Semantic => engine.semantic_search(&query, limit, threshold).await?,
                Mode::Hybrid => engine.hybrid_search(&query, limit).await?,
            };

            println!("query: {query}");
            if results.is_empty() {
                println!("no results");
            }

            for hit in results {
                println!(
                    "[{:?}] score={} article_id={} title={:?} category={}",
                    hit.kind, hit.relevance, hit.article_id, hit.title, hit.category
                );
                if let Some(page) = hit.page_number {
                    println!("  page={page}");
                }
                if let Some(snippet) = &hit.snippet {
                    println!("  snippet: {snippet}");
                }
            }
        }
    }

    Ok(())
}

struct IndexedRow {
    article_id: i64,
    title: String,
    chunk_count: usize,
}

async fn index_corpus(
    corpus: &Path,
    store: Arc<MemoryStore>,
    embedder: Arc<dyn EmbeddingProvider>,
) -> anyhow::Result<Vec<IndexedRow>> {
    let documents = load_manifest(corpus)?;

    let extractor = FileTextExtractor {
        corpus: corpus.to_path_buf(),
    };
    let indexer = Indexer::new(store.clone(), extractor, embedder);

    let mut rows = Vec::new();
    for document in documents {
        let article_id = document.id;
        let title = document.title.clone();
        store.upsert_document(document).await?;

        let outcome = indexer.index_document(article_id).await?;
        rows.push(IndexedRow {
            article_id,
            title,
            chunk_count: outcome.chunk_count,
        });
    }

    Ok(rows)
}

fn load_manifest(corpus: &Path) -> anyhow::Result<Vec<Document>> {
    use anyhow::Context;

    let manifest = corpus.join("documents.json");
    let raw = std::fs::read_to_string(&manifest)
        .with_context(|| format!("reading {}", manifest.display()))?;
    let documents: Vec<Document> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", manifest.display()))?;
    Ok(documents)
}
