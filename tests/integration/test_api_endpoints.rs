//! HTTP-level tests for the full application router.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{BrokenLog, ScriptedProvider, reply};
use serde_json::{Value, json};
use snapchart_api::config::Config;
use snapchart_api::models::{DiagramRecord, DiagramType, ProviderKind};
use snapchart_api::routes::{AppState, create_app};
use snapchart_api::services::{DiagramGenerator, PromptCatalog, RetryPolicy};
use snapchart_api::storage::{DiagramLog, SqliteDiagramLog};
use std::sync::Arc;
use std::time::Duration;

const PIE_REPLY: &str = "```mermaid\npie title 매출\n  \"1월\" : 25\n```";

fn fast_generator(provider: &Arc<ScriptedProvider>) -> DiagramGenerator {
    DiagramGenerator::new(PromptCatalog::builtin(), provider.clone()).with_retry_policy(
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(5),
        },
    )
}

fn create_test_server(config: Config, log: Arc<dyn DiagramLog>, generator: Option<DiagramGenerator>) -> TestServer {
    let app_state = AppState::from_parts(config, log, generator);
    TestServer::new(create_app(app_state)).unwrap()
}

fn server_with(provider: &Arc<ScriptedProvider>) -> TestServer {
    create_test_server(
        Config::default(),
        Arc::new(SqliteDiagramLog::open_in_memory().unwrap()),
        Some(fast_generator(provider)),
    )
}

#[tokio::test]
async fn test_generate_then_serve_from_cache() {
    let provider = Arc::new(ScriptedProvider::new(ProviderKind::Gemini, [reply(PIE_REPLY)]));
    let server = server_with(&provider);

    let request_body = json!({"type": "pie", "prompt": "월별 매출 비중"});

    let response = server.post("/api/diagrams/generate").json(&request_body).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let first: Value = response.json();
    assert_eq!(first["type"], "pie");
    assert_eq!(first["code"], "pie title 매출\n\"1월\" : 25");
    assert_eq!(first["provider"], "gemini");
    assert_eq!(first["attempts"], 1);
    assert_eq!(first["cached"], false);
    assert!(first["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(first["duration"].is_u64());
    assert!(first["timestamp"].is_string());

    // Whitespace around the prompt maps to the same cache entry
    let response = server
        .post("/api/diagrams/generate")
        .json(&json!({"type": "pie", "prompt": "  월별 매출 비중 "}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let second: Value = response.json();
    assert_eq!(second["cached"], true);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["code"], first["code"]);
    assert_eq!(provider.calls(), 1);

    let recent: Value = server.get("/api/diagrams/recent").await.json();
    let diagrams = recent["diagrams"].as_array().unwrap();
    assert_eq!(diagrams.len(), 1);
    assert_eq!(diagrams[0]["id"], first["id"]);
    assert_eq!(diagrams[0]["type"], "pie");

    let stats: Value = server.get("/api/diagrams/stats").await.json();
    assert_eq!(stats["period"], "7 days");
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["by_type"][0]["type"], "pie");
    assert_eq!(stats["by_type"][0]["count"], 1);
}

#[tokio::test]
async fn test_generate_rejects_empty_prompt() {
    let provider = Arc::new(ScriptedProvider::always_failing(ProviderKind::Gemini));
    let server = server_with(&provider);

    let response = server
        .post("/api/diagrams/generate")
        .json(&json!({"type": "flowchart", "prompt": ""}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"][0]["field"], "prompt");
    assert_eq!(body["details"][0]["message"], "Prompt cannot be empty");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_generate_prompt_length_limit() {
    let provider = Arc::new(ScriptedProvider::new(ProviderKind::Gemini, [reply(PIE_REPLY)]));
    let server = server_with(&provider);

    let response = server
        .post("/api/diagrams/generate")
        .json(&json!({"type": "pie", "prompt": "a".repeat(2001)}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["details"][0]["message"], "Prompt cannot exceed 2000 characters");

    let response = server
        .post("/api/diagrams/generate")
        .json(&json!({"type": "pie", "prompt": "a".repeat(2000)}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_generate_rejects_bad_type_and_prompt_shape() {
    let provider = Arc::new(ScriptedProvider::always_failing(ProviderKind::Gemini));
    let server = server_with(&provider);

    let response = server
        .post("/api/diagrams/generate")
        .json(&json!({"type": "FLOWCHART", "prompt": 7}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["details"],
        json!([
            {"field": "type", "message": "Invalid diagram type 'FLOWCHART'"},
            {"field": "prompt", "message": "Prompt must be a non-empty string"}
        ])
    );
}

#[tokio::test]
async fn test_generate_rejects_non_json_body() {
    let provider = Arc::new(ScriptedProvider::always_failing(ProviderKind::Gemini));
    let server = server_with(&provider);

    let response = server.post("/api/diagrams/generate").text("type=pie").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"][0]["field"], "body");
}

#[tokio::test]
async fn test_generate_without_credentials_is_server_error() {
    let server = create_test_server(
        Config::default(),
        Arc::new(SqliteDiagramLog::open_in_memory().unwrap()),
        None,
    );

    let response = server
        .post("/api/diagrams/generate")
        .json(&json!({"type": "pie", "prompt": "매출"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Generation failed");
    assert_eq!(body["message"], "Gemini API key not configured");
}

#[tokio::test]
async fn test_generate_exhaustion_is_server_error() {
    let provider = Arc::new(ScriptedProvider::always_failing(ProviderKind::Gemini));
    let server = server_with(&provider);

    let response = server
        .post("/api/diagrams/generate")
        .json(&json!({"type": "gantt", "prompt": "프로젝트 일정"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Generation failed");
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("All generation attempts failed")
    );
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_generate_succeeds_when_log_is_down() {
    let provider = Arc::new(ScriptedProvider::new(ProviderKind::Gemini, [reply(PIE_REPLY)]));
    let server = create_test_server(
        Config::default(),
        Arc::new(BrokenLog),
        Some(fast_generator(&provider)),
    );

    let response = server
        .post("/api/diagrams/generate")
        .json(&json!({"type": "pie", "prompt": "매출"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.get("/api/diagrams/stats").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to fetch stats");
    assert!(body["message"].as_str().unwrap().contains("disk I/O error"));
}

#[tokio::test]
async fn test_generate_is_rate_limited() {
    let provider = Arc::new(ScriptedProvider::always_failing(ProviderKind::Gemini));
    let config = Config {
        rate_limit_per_minute: 2,
        ..Config::default()
    };
    let server = create_test_server(
        config,
        Arc::new(SqliteDiagramLog::open_in_memory().unwrap()),
        Some(fast_generator(&provider)),
    );

    let invalid = json!({"type": "pie", "prompt": ""});
    for _ in 0..2 {
        let response = server.post("/api/diagrams/generate").json(&invalid).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    let response = server.post("/api/diagrams/generate").json(&invalid).await;
    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"], "Too Many Requests");

    // Reporting endpoints are not limited
    let response = server.get("/api/diagrams/recent").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_recent_limit_is_clamped() {
    let log = Arc::new(SqliteDiagramLog::open_in_memory().unwrap());
    for i in 0..3 {
        log.append(&DiagramRecord {
            id: format!("d{}", i),
            diagram_type: DiagramType::Graph,
            prompt: "조직도".to_string(),
            code: "graph TD\nA --> B".to_string(),
            provider: ProviderKind::Claude,
            attempts: 1,
            duration: 100 + i,
            cached: false,
            created_at: chrono::Utc::now() - chrono::Duration::minutes(10 - i as i64),
        })
        .await
        .unwrap();
    }
    let server = create_test_server(Config::default(), log, None);

    let body: Value = server
        .get("/api/diagrams/recent")
        .add_query_param("limit", 0)
        .await
        .json();
    assert_eq!(body["diagrams"].as_array().unwrap().len(), 1);
    assert_eq!(body["diagrams"][0]["id"], "d2");

    let body: Value = server
        .get("/api/diagrams/recent")
        .add_query_param("limit", 2)
        .await
        .json();
    assert_eq!(body["diagrams"].as_array().unwrap().len(), 2);

    let body: Value = server.get("/api/diagrams/recent").await.json();
    assert_eq!(body["diagrams"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_health_check() {
    let config = Config {
        environment: "test".to_string(),
        ..Config::default()
    };
    let server = create_test_server(
        config,
        Arc::new(SqliteDiagramLog::open_in_memory().unwrap()),
        None,
    );

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["environment"], "test");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_detailed_health_check() {
    let provider = Arc::new(ScriptedProvider::new(ProviderKind::Gemini, [reply(PIE_REPLY)]));
    let server = server_with(&provider);
    server
        .post("/api/diagrams/generate")
        .json(&json!({"type": "pie", "prompt": "매출"}))
        .await;

    let response = server.get("/health/detailed").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["database"], "ok");
    assert_eq!(body["checks"]["cache"]["status"], "ok");
    assert_eq!(body["checks"]["cache"]["size"], 1);
}

#[tokio::test]
async fn test_detailed_health_check_reports_database_failure() {
    let server = create_test_server(Config::default(), Arc::new(BrokenLog), None);

    let response = server.get("/health/detailed").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("database is locked"));
}

#[tokio::test]
async fn test_unknown_routes_return_json_404() {
    let server = create_test_server(
        Config::default(),
        Arc::new(SqliteDiagramLog::open_in_memory().unwrap()),
        None,
    );

    for path in ["/nope", "/api/diagrams/nope", "/api/unknown"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "path {}", path);
        let body: Value = response.json();
        assert_eq!(body, json!({"error": "Not Found"}));
    }
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let server = create_test_server(
        Config::default(),
        Arc::new(SqliteDiagramLog::open_in_memory().unwrap()),
        None,
    );

    let response = server.get("/api/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/diagrams/generate"));
    assert!(paths.contains_key("/api/diagrams/stats"));
    assert!(paths.contains_key("/api/diagrams/recent"));
    assert!(paths.contains_key("/health/detailed"));
    assert!(body["components"]["schemas"].get("GenerateResponse").is_some());
}

#[tokio::test]
async fn test_frontend_dir_serves_static_files() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("index.html"), "<html>snapchart</html>").unwrap();

    let config = Config {
        frontend_dir: Some(temp_dir.path().to_path_buf()),
        ..Config::default()
    };
    let server = create_test_server(
        config,
        Arc::new(SqliteDiagramLog::open_in_memory().unwrap()),
        None,
    );

    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("snapchart"));

    // API paths keep their JSON 404
    let response = server.get("/api/unknown").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
