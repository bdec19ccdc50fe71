use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use corpus_chunker::{DocumentChunker, SyntaxChunker, DEFAULT_CODE_BUDGET, DEFAULT_DOC_BUDGET};
use corpus_indexer::{source_kind, CorpusIndexer, SourceKind};
use corpus_vector_store::{EmbeddingStore, HashEmbedding};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "corpus-embed")]
#[command(about = "Chunk and embed a metadata corpus for semantic search", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a corpus directory into the embedding store
    Index(IndexArgs),

    /// Chunk a single file and print the chunks
    Chunk(ChunkArgs),

    /// Show statistics for an existing store
    Stats(StatsArgs),
}

#[derive(Args)]
struct IndexArgs {
    /// Corpus directory to index
    path: PathBuf,

    /// Path of the embedding store file
    #[arg(long, default_value = "corpus_store.json")]
    store: PathBuf,

    /// Byte budget for code record batches
    #[arg(long, default_value_t = DEFAULT_CODE_BUDGET)]
    code_budget: usize,

    /// Byte budget for document chunks
    #[arg(long, default_value_t = DEFAULT_DOC_BUDGET)]
    doc_budget: usize,

    /// Embedding vector dimension
    #[arg(long, default_value_t = HashEmbedding::DEFAULT_DIMENSION)]
    dimension: usize,
}

#[derive(Args)]
struct ChunkArgs {
    /// File to chunk (.py/.pyw or .md/.markdown/.rst/.txt)
    file: PathBuf,

    /// Byte budget, defaults to the per-path default
    #[arg(long)]
    budget: Option<usize>,

    /// Print one JSON record per line instead of readable output
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StatsArgs {
    /// Path of the embedding store file
    store: PathBuf,

    /// Embedding vector dimension the store was built with
    #[arg(long, default_value_t = HashEmbedding::DEFAULT_DIMENSION)]
    dimension: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Index(args) => run_index(args).await,
        Commands::Chunk(args) => run_chunk(&args),
        Commands::Stats(args) => run_stats(args).await,
    }
}

async fn run_index(args: IndexArgs) -> Result<()> {
    let indexer = CorpusIndexer::new(&args.path, &args.store, HashEmbedding::new(args.dimension))
        .with_code_budget(args.code_budget)
        .with_doc_budget(args.doc_budget);

    let stats = indexer
        .index()
        .await
        .with_context(|| format!("failed to index {}", args.path.display()))?;

    println!("{stats}");
    for error in &stats.errors {
        eprintln!("error: {error}");
    }
    Ok(())
}

fn run_chunk(args: &ChunkArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match source_kind(&args.file) {
        Some(SourceKind::Code) => {
            let chunker = SyntaxChunker::new(&content, &name)
                .with_budget(args.budget.unwrap_or(DEFAULT_CODE_BUDGET));

            if args.json {
                for chunk in chunker.chunk_records()? {
                    println!("{}", chunk.to_record()?);
                }
            } else {
                for (idx, batch) in chunker.create_chunks()?.iter().enumerate() {
                    println!("Batch {} ({} bytes):", idx + 1, batch.len());
                    println!("{batch}");
                    println!("---");
                }
            }
        }
        Some(SourceKind::Document) => {
            let chunks = DocumentChunker::new(content, name)
                .with_budget(args.budget.unwrap_or(DEFAULT_DOC_BUDGET))
                .create_chunks();

            if args.json {
                for chunk in &chunks {
                    println!("{}", chunk.to_record()?);
                }
            } else {
                for (idx, chunk) in chunks.iter().enumerate() {
                    println!("Chunk {}:", idx + 1);
                    println!("Title: {}", chunk.title);
                    println!("Content: {}", chunk.content);
                    println!("---");
                }
            }
        }
        None => bail!("unsupported file type: {}", args.file.display()),
    }

    Ok(())
}

async fn run_stats(args: StatsArgs) -> Result<()> {
    let store = EmbeddingStore::load(&args.store, args.dimension)
        .await
        .with_context(|| format!("failed to load store {}", args.store.display()))?;

    println!("store:     {}", store.path().display());
    println!("dimension: {}", store.dimension());
    println!("records:   {}", store.len());
    println!("files:     {}", store.file_count());
    Ok(())
}
