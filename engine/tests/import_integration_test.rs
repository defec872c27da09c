//! Integration tests for IMPORT fetchers and knowledge upload
//!
//! HTTP paths run against a local wiremock server; file paths use a
//! temporary directory.

use folio_engine::compiler::{compile, CompileOptions};
use folio_engine::import::{CompositeImportFetcher, FileImportFetcher, HttpImportFetcher};
use folio_engine::knowledge::{is_inline_knowledge, HttpKnowledgeUploader};
use folio_sdk::{EngineError, ImportFetcher, KnowledgeUploader};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_http_fetcher_downloads_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/faq.book"))
        .respond_with(ResponseTemplate::new(200).set_body_string("RULE Ship within 2 days"))
        .mount(&server)
        .await;

    let fetcher = HttpImportFetcher::new(5).unwrap();
    let text = fetcher
        .fetch(&format!("{}/books/faq.book", server.uri()))
        .await
        .unwrap();
    assert_eq!(text, "RULE Ship within 2 days");
}

#[tokio::test]
async fn test_http_fetcher_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpImportFetcher::new(5).unwrap();
    let err = fetcher
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    match err {
        EngineError::Import { reason, .. } => assert!(reason.contains("404")),
        other => panic!("Expected import error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_fetcher_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpImportFetcher::new(1).unwrap();
    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Timeout(1)));
}

#[tokio::test]
async fn test_file_fetcher_reads_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("shared.book"), "Be concise.").unwrap();

    let fetcher = FileImportFetcher::new(dir.path());
    assert_eq!(fetcher.fetch("shared.book").await.unwrap(), "Be concise.");

    let absolute = dir.path().join("shared.book");
    let text = fetcher
        .fetch(&format!("file://{}", absolute.display()))
        .await
        .unwrap();
    assert_eq!(text, "Be concise.");
}

#[tokio::test]
async fn test_compile_with_composite_fetcher() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tone.book"), "Speak like a pirate.").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/policy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Refunds within 30 days."))
        .mount(&server)
        .await;

    let fetcher = CompositeImportFetcher::new()
        .with_files(FileImportFetcher::new(dir.path()))
        .with_http(HttpImportFetcher::new(5).unwrap());
    let options = CompileOptions::new().with_import_fetcher(Arc::new(fetcher));

    let source = format!(
        "Agent\nPERSONA Store clerk\nIMPORT tone.book\nIMPORT {}/policy",
        server.uri()
    );
    let req = compile(&source, &options).await;

    assert_eq!(
        req.system_message,
        "Store clerk\n\nSpeak like a pirate.\n\nRefunds within 30 days."
    );
    assert_eq!(req.imports.len(), 2);
}

#[tokio::test]
async fn test_failed_import_leaves_requirements_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = CompositeImportFetcher::new().with_files(FileImportFetcher::new(dir.path()));
    let options = CompileOptions::new().with_import_fetcher(Arc::new(fetcher));

    let req = compile("Agent\nPERSONA Clerk\nIMPORT missing.book\nRULE Smile", &options).await;
    assert_eq!(req.system_message, "Clerk\n\nRule: Smile");
    assert!(req.imports.is_empty());
}

#[tokio::test]
async fn test_knowledge_uploader_posts_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string("Opening hours: 9-17"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "url": "https://files.example/k/42" })),
        )
        .mount(&server)
        .await;

    let uploader = HttpKnowledgeUploader::new(format!("{}/upload", server.uri()), 5).unwrap();
    let url = uploader
        .upload_inline_knowledge("Opening hours: 9-17")
        .await
        .unwrap();
    assert_eq!(url, "https://files.example/k/42");

    let options = CompileOptions::new().with_knowledge_uploader(Arc::new(uploader));
    let req = compile("Agent\nKNOWLEDGE Opening hours: 9-17", &options).await;
    assert_eq!(req.knowledge_sources, vec!["https://files.example/k/42"]);
}

#[tokio::test]
async fn test_failed_upload_falls_back_to_inline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let uploader = HttpKnowledgeUploader::new(format!("{}/upload", server.uri()), 5).unwrap();
    let options = CompileOptions::new().with_knowledge_uploader(Arc::new(uploader));
    let req = compile("Agent\nKNOWLEDGE Opening hours: 9-17", &options).await;

    assert_eq!(req.knowledge_sources.len(), 1);
    assert!(is_inline_knowledge(&req.knowledge_sources[0]));
}
