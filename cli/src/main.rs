use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use passage_core::corpus_dir::CorpusDir;
use passage_core::speller::{NoCorrection, SpellCorrector, VocabularyCorrector, DEFAULT_MAX_DISTANCE};
use passage_core::tokenizer::{EnglishNormalizer, Normalizer};
use passage_core::{DocId, DocIdLayout, EngineConfig, MatchMode, PassageStore, Query, RepeatedTerms, SearchEngine};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "passage-search")]
#[command(about = "Build an in-memory passage index and rank passages with BM25", long_about = None)]
struct Cli {
    #[command(flatten)]
    corpus: CorpusArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct CorpusArgs {
    /// Directory of normalized unit files
    #[arg(long, default_value = "./Normal")]
    normalized: PathBuf,
    /// Directory of original unit files, same file names
    #[arg(long, default_value = "./Unnormal")]
    original: PathBuf,
    /// JSON engine config; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// BM25 term-frequency saturation
    #[arg(long)]
    k1: Option<f64>,
    /// BM25 length normalization
    #[arg(long)]
    b: Option<f64>,
    /// Maximum passages per unit file
    #[arg(long)]
    passages_per_unit: Option<u32>,
    /// Weight each distinct query term once instead of once per occurrence
    #[arg(long, default_value_t = false)]
    distinct_terms: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank passages for a free-text query
    Search {
        /// Raw query text
        query: String,
        /// Number of results to print
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Candidate set: any query term (OR) or all of them (AND)
        #[arg(long, value_enum, default_value_t = Mode::Any)]
        mode: Mode,
        /// Drop passages containing these words
        #[arg(long)]
        exclude: Vec<String>,
        /// Correct out-of-vocabulary terms before searching
        #[arg(long, default_value_t = false)]
        spell_check: bool,
    },
    /// Print corpus statistics
    Stats,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Any,
    All,
}

impl From<Mode> for MatchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Any => MatchMode::Any,
            Mode::All => MatchMode::All,
        }
    }
}

#[derive(Serialize)]
struct SearchOutput {
    query: String,
    terms: Vec<String>,
    corrected: bool,
    total_hits: usize,
    results: Vec<Hit>,
}

#[derive(Serialize)]
struct Hit {
    doc_id: DocId,
    score: f64,
    /// `None` when the passage's original text could not be read back.
    filename: Option<String>,
    content: Option<String>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let config = resolve_config(&cli.corpus)?;
    let (corpus, engine) = build_engine(&cli.corpus.normalized, &cli.corpus.original, &config)?;

    match cli.command {
        Commands::Search { query, top, mode, exclude, spell_check } => {
            let out = run_search(&corpus, &engine, &query, top, mode.into(), &exclude, spell_check)?;
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&engine.stats())?);
        }
    }
    Ok(())
}

fn resolve_config(args: &CorpusArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(k1) = args.k1 { config.ranking.k1 = k1; }
    if let Some(b) = args.b { config.ranking.b = b; }
    if let Some(cap) = args.passages_per_unit { config.passages_per_unit = cap; }
    if args.distinct_terms { config.ranking.repeated_terms = RepeatedTerms::Distinct; }
    config.validate()?;
    Ok(config)
}

fn build_engine(normalized: &Path, original: &Path, config: &EngineConfig) -> Result<(CorpusDir, SearchEngine)> {
    let layout = DocIdLayout::new(config.passages_per_unit)?;
    let corpus = CorpusDir::open(normalized, original, layout)
        .with_context(|| format!("opening corpus {}", normalized.display()))?;
    let mut store = PassageStore::new();
    corpus.load(&mut store)?;
    let engine = SearchEngine::build(store, config.ranking)?;
    Ok((corpus, engine))
}

fn run_search(
    corpus: &CorpusDir,
    engine: &SearchEngine,
    raw: &str,
    top: usize,
    mode: MatchMode,
    exclude: &[String],
    spell_check: bool,
) -> Result<SearchOutput> {
    let terms = EnglishNormalizer.normalize(raw);
    let correction = if spell_check {
        VocabularyCorrector::new(engine.index(), DEFAULT_MAX_DISTANCE).correct(&terms)
    } else {
        NoCorrection.correct(&terms)
    };
    let excluded: Vec<String> = exclude.iter().flat_map(|w| EnglishNormalizer.normalize(w)).collect();
    let query = Query::new(correction.terms.clone()).with_mode(mode).excluding(excluded);

    let ranked = engine.search(&query)?;
    tracing::info!(query = raw, hits = ranked.len(), "search complete");
    let total_hits = ranked.len();
    let mut results = Vec::with_capacity(top.min(total_hits));
    for hit in ranked.into_iter().take(top) {
        let filename = corpus.source_label(hit.doc_id).ok().map(str::to_string);
        let content = match corpus.content(hit.doc_id) {
            Ok(content) => Some(content.text),
            Err(e) => {
                tracing::warn!(doc_id = hit.doc_id, error = %e, "passage text unavailable");
                None
            }
        };
        results.push(Hit { doc_id: hit.doc_id, score: hit.score, filename, content });
    }
    Ok(SearchOutput { query: raw.to_string(), terms: correction.terms, corrected: correction.corrected, total_hits, results })
}
