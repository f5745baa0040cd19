use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use hyper::body::Bytes;
use passage_core::EngineConfig;
use passage_server::{build_app, ServerConfig};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_corpus(dir: &Path) -> ServerConfig {
    let normal = dir.join("Normal");
    let original = dir.join("Unnormal");
    fs::create_dir_all(&normal).unwrap();
    fs::create_dir_all(&original).unwrap();

    // passages 0, 1, 2 in unit 0; passage 500 in unit 1
    fs::write(normal.join("00-animals.txt"), "cat cat dog$$$dog dog dog$$$bird").unwrap();
    fs::write(original.join("00-animals.txt"), "Cats, cats and a dog.$$$Dog dog DOG!$$$A bird.").unwrap();
    fs::write(normal.join("01-more.txt"), "fish dog").unwrap();
    fs::write(original.join("01-more.txt"), "A fish and a dog.").unwrap();

    ServerConfig { normalized_dir: normal, original_dir: original, engine: EngineConfig::default() }
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    let app = build_app(build_tiny_corpus(dir.path())).unwrap();

    let (status, body) = call(app, "/search?q=dogs&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"].as_u64().unwrap(), 3);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 1);
    assert_eq!(arr[0]["source"].as_str().unwrap(), "00-animals.txt");
    let first = arr[0]["score"].as_f64().unwrap();
    let second = arr[1]["score"].as_f64().unwrap();
    assert!(first >= second);
}

#[tokio::test]
async fn stopword_only_query_is_empty_not_an_error() {
    let dir = tempdir().unwrap();
    let app = build_app(build_tiny_corpus(dir.path())).unwrap();

    let (status, body) = call(app, "/search?q=the%20and").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"].as_u64().unwrap(), 0);
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn and_mode_with_exclusion() {
    let dir = tempdir().unwrap();
    let app = build_app(build_tiny_corpus(dir.path())).unwrap();

    let (_, body) = call(app.clone(), "/search?q=cat%20dog&mode=all").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    let ids: Vec<u64> = json["results"].as_array().unwrap().iter().map(|h| h["doc_id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![0]);

    let (_, body) = call(app, "/search?q=dog&exclude=cat,fish").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    let ids: Vec<u64> = json["results"].as_array().unwrap().iter().map(|h| h["doc_id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn spell_flag_corrects_unknown_terms() {
    let dir = tempdir().unwrap();
    let app = build_app(build_tiny_corpus(dir.path())).unwrap();

    let (_, body) = call(app, "/search?q=birt&spell=true").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["corrected"].as_bool().unwrap());
    assert_eq!(json["terms"][0].as_str().unwrap(), "bird");
    assert_eq!(json["results"][0]["doc_id"].as_u64().unwrap(), 2);
}

#[tokio::test]
async fn doc_lookup_and_missing_doc() {
    let dir = tempdir().unwrap();
    let app = build_app(build_tiny_corpus(dir.path())).unwrap();

    let (status, body) = call(app.clone(), "/doc/500").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["text"].as_str().unwrap(), "A fish and a dog.");
    assert_eq!(json["term_count"].as_u64().unwrap(), 2);

    let (status, _) = call(app, "/doc/3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_report_corpus_shape() {
    let dir = tempdir().unwrap();
    let app = build_app(build_tiny_corpus(dir.path())).unwrap();

    let (_, body) = call(app, "/stats").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["num_passages"].as_u64().unwrap(), 4);
    assert_eq!(json["num_terms"].as_u64().unwrap(), 4);
    assert!((json["average_length"].as_f64().unwrap() - 2.25).abs() < 1e-9);
}

#[tokio::test]
async fn short_original_file_keeps_ranked_hits() {
    let dir = tempdir().unwrap();
    let normal = dir.path().join("Normal");
    let original = dir.path().join("Unnormal");
    fs::create_dir_all(&normal).unwrap();
    fs::create_dir_all(&original).unwrap();
    fs::write(normal.join("a.txt"), "dog dog$$$dog cat").unwrap();
    fs::write(original.join("a.txt"), "Dog dog.").unwrap();
    let config = ServerConfig { normalized_dir: normal, original_dir: original, engine: EngineConfig::default() };
    let app = build_app(config).unwrap();

    let (status, body) = call(app, "/search?q=dog%20em").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"].as_u64().unwrap(), 2);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    let readable = arr.iter().find(|h| h["doc_id"].as_u64() == Some(0)).unwrap();
    assert_eq!(readable["snippet"].as_str().unwrap(), "<em>Dog</em> <em>dog</em>.");
    let unreadable = arr.iter().find(|h| h["doc_id"].as_u64() == Some(1)).unwrap();
    assert!(unreadable["snippet"].is_null());
    assert_eq!(unreadable["source"].as_str().unwrap(), "a.txt");
}
