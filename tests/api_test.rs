use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use swarm_console::config::{ConsoleConfig, TriggerConfig};
use swarm_console::server::build_router;
use swarm_console::state::AppState;
use tempfile::TempDir;
use tower::ServiceExt;

/// A port that was just bound and released, so nothing listens on it.
fn closed_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let config = ConsoleConfig {
        port: 0,
        data_dir: dir.path().to_path_buf(),
        trigger: TriggerConfig {
            url: format!("http://127.0.0.1:{}/make-calls", closed_port()),
            phone_number: "+15555550100".into(),
            num_calls: 1,
        },
        log_file: None,
    };
    let state = Arc::new(AppState::new(config).unwrap());
    (dir, build_router(state))
}

async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

const PASSWORD: &str = "burger-and-fries";

async fn sign_up(app: &Router, email: &str) -> String {
    let (status, body) = request(
        app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (_dir, app) = app();
    let (status, body) = request(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (_dir, app) = app();
    let (status, body) = request(&app, Method::GET, "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User must be logged in to view the current user");

    let token = sign_up(&app, "ops@example.com").await;
    let (status, body) = request(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ops@example.com");

    let (status, _) = request(
        &app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": "ops@example.com", "password": "not-the-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, again) = request(
        &app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": "ops@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(again["token"], token.as_str());

    let (status, _) = request(
        &app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({ "email": "ops@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = request(&app, Method::POST, "/auth/sign-out", Some(&token), None).await;
    assert_eq!(body["signed_out"], true);
    let (status, _) = request(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_form_apply_and_validate() {
    let (_dir, app) = app();

    let (_, draft) = request(&app, Method::GET, "/form/defaults", None, None).await;
    assert_eq!(draft["basics"]["simultaneous"], 100);

    let (status, draft) = request(
        &app,
        Method::POST,
        "/form/apply",
        None,
        Some(json!({
            "draft": draft,
            "actions": [
                {"type": "set", "path": "basics.name", "value": "Drive-through Test"},
                {"type": "toggle", "path": "customer.accents", "option": "British"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["basics"]["name"], "Drive-through Test");
    assert_eq!(draft["customer"]["accents"], json!(["American", "British"]));

    let (status, body) = request(
        &app,
        Method::POST,
        "/form/apply",
        None,
        Some(json!({ "actions": [{"type": "set", "path": "basics.bogus", "value": 1}] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid request: Unknown field: basics.bogus");

    let (_, body) = request(&app, Method::POST, "/form/validate", None, Some(draft)).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"][0], "Twilio phone number is required");

    let (_, options) = request(&app, Method::GET, "/form/options", None, None).await;
    assert_eq!(options["pace"], json!(["slow", "normal", "fast"]));
}

#[tokio::test]
async fn test_drafts_roundtrip() {
    let (_dir, app) = app();
    let token = sign_up(&app, "ops@example.com").await;

    let (status, _) = request(&app, Method::GET, "/drafts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = request(
        &app,
        Method::PUT,
        "/drafts",
        Some(&token),
        Some(json!({ "basics": { "name": "Later" } })),
    )
    .await;
    assert_eq!(body["saved"], true);

    let (_, draft) = request(&app, Method::GET, "/drafts", Some(&token), None).await;
    assert_eq!(draft["basics"]["name"], "Later");
    assert_eq!(draft["basics"]["duration"], 60);
}

#[tokio::test]
async fn test_submission_reports_trigger_failure() {
    let (_dir, app) = app();
    let token = sign_up(&app, "ops@example.com").await;

    let draft = json!({
        "basics": { "name": "Drive-through Test", "twilioNumber": "+18005551212" },
        "conversation": { "industry": "Restaurant", "maxTurns": 5, "responseThreshold": 500 },
        "scenario": { "template": "Order a burger" }
    });

    let (status, body) = request(
        &app,
        Method::POST,
        "/tests",
        Some(&token),
        Some(json!({ "draft": draft, "confirmation": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"], json!(["Please type \"create test\" to confirm"]));

    let (status, body) = request(
        &app,
        Method::POST,
        "/tests",
        Some(&token),
        Some(json!({ "draft": draft, "confirmation": "create test" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let message = body["errors"][0].as_str().unwrap();
    assert!(message.starts_with("Failed to start test: Execution trigger failed"), "{message}");

    // The configuration was written before the trigger failed
    let (_, configs) = request(&app, Method::GET, "/configurations", Some(&token), None).await;
    assert_eq!(configs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ingest_and_results() {
    let (_dir, app) = app();
    let token = sign_up(&app, "ops@example.com").await;

    let draft = json!({
        "basics": { "name": "Drive-through Test", "twilioNumber": "+18005551212" },
        "conversation": { "industry": "Restaurant" },
        "scenario": { "template": "Order a burger" }
    });
    // Trigger fails, but the simulation row is already written
    let _ = request(
        &app,
        Method::POST,
        "/tests",
        Some(&token),
        Some(json!({ "draft": draft, "confirmation": "create test" })),
    )
    .await;
    let (_, dashboard) = request(&app, Method::GET, "/dashboard", Some(&token), None).await;
    let sim_id = dashboard["simulations"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(dashboard["simulations"][0]["name"], "Drive-through Test");
    assert_eq!(dashboard["simulations"][0]["success_rate"], 0.0);

    let (status, conv) = request(
        &app,
        Method::POST,
        &format!("/simulations/{sim_id}/conversations"),
        Some(&token),
        Some(json!({
            "call_sid": "CA123",
            "status": "completed",
            "transcript": [{"role": "user", "content": "One burger please"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let conv_id = conv["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &app,
        Method::POST,
        &format!("/conversations/{conv_id}/quality-metrics"),
        Some(&token),
        Some(json!({ "overall_quality_score": 0.955 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        &app,
        Method::POST,
        &format!("/conversations/{conv_id}/technical-metrics"),
        Some(&token),
        Some(json!({ "avg_latency_ms": 180.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        &app,
        Method::POST,
        "/conversations/missing/analysis",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, results) = request(
        &app,
        Method::GET,
        &format!("/results?simulation={sim_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["conversations"].as_array().unwrap().len(), 1);
    assert_eq!(results["selected"]["call_sid"], "CA123");
    assert_eq!(results["selected"]["transcript"][0]["content"], "One burger please");

    let (status, detail) = request(
        &app,
        Method::GET,
        &format!("/results/conversations/{conv_id}?tab=overview"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["sections"][0]["cards"][0]["value"], "95.50%");
    assert_eq!(detail["sections"][0]["cards"][2]["value"], "180 ms");

    let (_, status_body) = request(
        &app,
        Method::POST,
        &format!("/simulations/{sim_id}/status"),
        Some(&token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status_body["status"], "completed");
    assert!(status_body["end_time"].is_string());

    let (_, dashboard) = request(&app, Method::GET, "/dashboard", Some(&token), None).await;
    assert_eq!(dashboard["aggregates"]["avg_latency_ms"], 180.0);

    // Another user sees none of it
    let other = sign_up(&app, "other@example.com").await;
    let (status, _) = request(
        &app,
        Method::GET,
        &format!("/results/conversations/{conv_id}"),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
