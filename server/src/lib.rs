use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, response::{IntoResponse, Response}, routing::get, Json, Router};
use passage_core::corpus_dir::CorpusDir;
use passage_core::speller::{SpellCorrector, VocabularyCorrector, DEFAULT_MAX_DISTANCE};
use passage_core::tokenizer::{EnglishNormalizer, Normalizer};
use passage_core::{DocId, DocIdLayout, EngineConfig, EngineStats, MatchMode, PassageStore, SearchEngine, SearchError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub normalized_dir: PathBuf,
    pub original_dir: PathBuf,
    pub engine: EngineConfig,
}

#[derive(Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ModeParam {
    #[default]
    Any,
    All,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub mode: ModeParam,
    /// Comma separated words that must not appear in a hit
    #[serde(default)]
    pub exclude: Option<String>,
    #[serde(default)]
    pub spell: bool,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub terms: Vec<String>,
    pub corrected: bool,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    /// `None` when the passage's original text could not be read back.
    pub source: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc_id: DocId,
    pub source: String,
    pub text: String,
    pub term_count: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub corpus: Arc<CorpusDir>,
    pub speller: Arc<VocabularyCorrector>,
}

/// Core errors surfaced as JSON with a matching status code.
pub struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self { ApiError(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            SearchError::NotFound(_) => StatusCode::NOT_FOUND,
            SearchError::EmptyCorpus => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Builds the engine from the corpus directories; the build phase finishes
/// before the router is returned.
pub fn build_app(config: ServerConfig) -> Result<Router> {
    config.engine.validate()?;
    let layout = DocIdLayout::new(config.engine.passages_per_unit)?;
    let corpus = CorpusDir::open(&config.normalized_dir, &config.original_dir, layout)?;
    let mut store = PassageStore::new();
    corpus.load(&mut store)?;
    let engine = SearchEngine::build(store, config.engine.ranking)?;
    let speller = VocabularyCorrector::new(engine.index(), DEFAULT_MAX_DISTANCE);
    let app_state = AppState { engine: Arc::new(engine), corpus: Arc::new(corpus), speller: Arc::new(speller) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let terms = EnglishNormalizer.normalize(&params.q);
    let correction = if params.spell {
        state.speller.correct(&terms)
    } else {
        passage_core::speller::Correction { terms, corrected: false }
    };
    let excluded: Vec<String> = params
        .exclude
        .as_deref()
        .unwrap_or("")
        .split(',')
        .flat_map(|w| EnglishNormalizer.normalize(w))
        .collect();
    let mode = match params.mode {
        ModeParam::Any => MatchMode::Any,
        ModeParam::All => MatchMode::All,
    };
    let query = passage_core::Query::new(correction.terms.clone()).with_mode(mode).excluding(excluded);

    let ranked = state.engine.search(&query)?;
    let total_hits = ranked.len();
    let k = params.k.clamp(1, 100);

    // Capture raw query words for highlighting
    let raw_terms: Vec<String> = params
        .q
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();
    let mut results: Vec<SearchHit> = Vec::with_capacity(k.min(total_hits));
    for hit in ranked.into_iter().take(k) {
        let source = state.corpus.source_label(hit.doc_id).ok().map(str::to_string);
        let snippet = match state.corpus.content(hit.doc_id) {
            Ok(content) => Some(highlight_terms(&content.text, &raw_terms)),
            Err(e) => {
                tracing::warn!(doc_id = hit.doc_id, error = %e, "passage text unavailable");
                None
            }
        };
        results.push(SearchHit { doc_id: hit.doc_id, score: hit.score, source, snippet });
    }

    let elapsed = start.elapsed();
    tracing::debug!(q = %params.q, total_hits, took_s = elapsed.as_secs_f64(), "search");
    Ok(Json(SearchResponse {
        query: params.q,
        terms: correction.terms,
        corrected: correction.corrected,
        took_s: elapsed.as_secs_f64(),
        total_hits,
        results,
    }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<DocResponse>, ApiError> {
    let passage = state.engine.passage(doc_id)?;
    let content = state.corpus.content(doc_id)?;
    Ok(Json(DocResponse { doc_id, source: content.source_label, text: content.text, term_count: passage.term_count }))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.stats())
}

/// Wraps every match of any term in `<em>` in a single pass, so markup
/// inserted for one term is never matched by another.
fn highlight_terms(text: &str, terms: &[String]) -> String {
    let mut words: Vec<&str> = terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
    if words.is_empty() {
        return text.to_string();
    }
    // longest first so an alternation prefers "dogs" over "dog"
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    words.dedup();
    let alternation = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
    let Ok(pat) = regex::RegexBuilder::new(&alternation).case_insensitive(true).build() else {
        return text.to_string();
    };
    pat.replace_all(text, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_case_insensitively() {
        let out = highlight_terms("Dogs chase dogs.", &["dogs".to_string()]);
        assert_eq!(out, "<em>Dogs</em> chase <em>dogs</em>.");
    }

    #[test]
    fn markup_is_never_rehighlighted() {
        let terms = ["dog".to_string(), "em".to_string()];
        assert_eq!(highlight_terms("A dog.", &terms), "A <em>dog</em>.");
        let terms = ["e".to_string(), "m".to_string(), "<".to_string()];
        assert_eq!(highlight_terms("me", &terms), "<em>m</em><em>e</em>");
    }

    #[test]
    fn longer_term_wins_over_its_prefix() {
        let terms = ["dog".to_string(), "dogs".to_string(), " ".to_string()];
        assert_eq!(highlight_terms("dogs and a dog", &terms), "<em>dogs</em> and a <em>dog</em>");
        assert_eq!(highlight_terms("dogs", &[]), "dogs");
    }
}
