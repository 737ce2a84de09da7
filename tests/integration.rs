// SPDX-License-Identifier: MPL-2.0
//! End-to-end checks against an in-process analysis service.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use eye_fatigue::analysis::{AnalysisClient, AnalysisParameters, AnalysisRequest, EyeCondition};
use eye_fatigue::capture::{ImageSource, PendingImage};
use eye_fatigue::config::{self, Config};
use eye_fatigue::error::AnalysisError;
use eye_fatigue::flow::{Completion, Phase, Session};
use eye_fatigue::i18n::fluent::I18n;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

/// Serves `router` on an ephemeral port and returns the analyze URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}/analyze")
}

fn client(endpoint: &str, timeout: Duration) -> AnalysisClient {
    AnalysisClient::new(endpoint, timeout).expect("client")
}

fn request() -> AnalysisRequest {
    AnalysisRequest::new(
        "data:image/jpeg;base64,/9j/4A==",
        AnalysisParameters::default(),
    )
}

fn dry_eyes_body() -> Value {
    json!({
        "success": true,
        "redness_score": 3.2,
        "dryness_score": 6.8,
        "fatigue_score": 5.0,
        "final_fatigue": 5.7,
        "emoji": "😐",
        "fatigue_level": "Moderate",
        "screen_time": 10,
        "condition": "Dry Eyes",
        "demo_mode": true,
        "recommendations": ["Use artificial tears", "Follow the 20-20-20 rule"]
    })
}

#[tokio::test]
async fn successful_analysis_posts_expected_body() {
    let received = Arc::new(Mutex::new(None::<Value>));
    let sink = Arc::clone(&received);
    let router = Router::new().route(
        "/analyze",
        post(move |Json(body): Json<Value>| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().expect("lock") = Some(body);
                Json(dry_eyes_body())
            }
        }),
    );
    let endpoint = serve(router).await;

    let request = AnalysisRequest::new(
        "data:image/jpeg;base64,/9j/4A==",
        AnalysisParameters {
            screen_time: eye_fatigue::analysis::ScreenTime::parse_or_default("10"),
            condition: EyeCondition::DryEyes,
        },
    );
    let result = client(&endpoint, Duration::from_secs(5))
        .analyze(&request)
        .await
        .expect("analysis");

    assert_eq!(result.final_fatigue.display(), "5.7/10");
    assert_eq!(result.level_display(), "😐 Moderate");
    assert!(result.demo_mode);
    assert_eq!(result.recommendations.len(), 2);

    let body = received.lock().expect("lock").take().expect("request received");
    assert_eq!(
        body,
        json!({
            "image": "data:image/jpeg;base64,/9j/4A==",
            "screen_time": 10,
            "condition": "Dry Eyes"
        })
    );
}

#[tokio::test]
async fn service_failure_carries_its_message() {
    let router = Router::new().route(
        "/analyze",
        post(|| async { Json(json!({"success": false, "error": "No eye detected"})) }),
    );
    let endpoint = serve(router).await;

    let err = client(&endpoint, Duration::from_secs(5))
        .analyze(&request())
        .await
        .expect_err("service failure");
    assert_eq!(err, AnalysisError::Service(Some("No eye detected".into())));
    assert_eq!(err.detail(), Some("No eye detected"));
}

#[tokio::test]
async fn error_status_keeps_code_and_body_message() {
    let router = Router::new().route(
        "/analyze",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Model not loaded"})),
            )
                .into_response()
        }),
    );
    let endpoint = serve(router).await;

    let err = client(&endpoint, Duration::from_secs(5))
        .analyze(&request())
        .await
        .expect_err("status error");
    assert_eq!(
        err,
        AnalysisError::Status {
            code: 500,
            message: Some("Model not loaded".into()),
        }
    );
}

#[tokio::test]
async fn error_status_without_json_body_has_no_message() {
    let router = Router::new().route(
        "/analyze",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down").into_response() }),
    );
    let endpoint = serve(router).await;

    let err = client(&endpoint, Duration::from_secs(5))
        .analyze(&request())
        .await
        .expect_err("status error");
    assert_eq!(
        err,
        AnalysisError::Status {
            code: 502,
            message: None,
        }
    );
}

#[tokio::test]
async fn unparseable_success_body_is_malformed() {
    let router = Router::new().route("/analyze", post(|| async { "<html>ok</html>" }));
    let endpoint = serve(router).await;

    let err = client(&endpoint, Duration::from_secs(5))
        .analyze(&request())
        .await
        .expect_err("malformed");
    assert!(matches!(err, AnalysisError::Malformed(_)));
}

#[tokio::test]
async fn missing_scores_are_malformed() {
    let router = Router::new().route(
        "/analyze",
        post(|| async { Json(json!({"success": true, "fatigue_level": "Low"})) }),
    );
    let endpoint = serve(router).await;

    let err = client(&endpoint, Duration::from_secs(5))
        .analyze(&request())
        .await
        .expect_err("malformed");
    assert!(matches!(err, AnalysisError::Malformed(_)));
}

#[tokio::test]
async fn slow_service_times_out() {
    let router = Router::new().route(
        "/analyze",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(dry_eyes_body())
        }),
    );
    let endpoint = serve(router).await;

    let err = client(&endpoint, Duration::from_millis(200))
        .analyze(&request())
        .await
        .expect_err("timeout");
    assert_eq!(err, AnalysisError::Timeout);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let err = client(&format!("http://{addr}/analyze"), Duration::from_secs(5))
        .analyze(&request())
        .await
        .expect_err("transport");
    assert!(matches!(err, AnalysisError::Transport(_)));
}

#[tokio::test]
async fn session_runs_capture_analyze_present_export() {
    let router = Router::new().route("/analyze", post(|| async { Json(dry_eyes_body()) }));
    let endpoint = serve(router).await;
    let client = client(&endpoint, Duration::from_secs(5));

    let mut session = Session::new();
    session.accept_image(PendingImage::new(
        vec![0xFF, 0xD8, 0xFF, 0xE0],
        "image/jpeg",
        ImageSource::Dropped(PathBuf::from("eye.jpg")),
    ));
    session.set_screen_time_input("10".into());
    session.set_condition(EyeCondition::DryEyes);

    let ticket = session
        .begin_analysis(session.parameters())
        .expect("analysis starts");
    assert_eq!(session.phase(), Phase::Loading);

    let outcome = client.analyze(&ticket.request).await;
    assert_eq!(
        session.finish_analysis(ticket.generation, outcome),
        Completion::Presented
    );
    assert_eq!(session.phase(), Phase::Results);

    let now = Utc
        .with_ymd_and_hms(2025, 1, 15, 10, 30, 0)
        .single()
        .expect("valid time");
    let report = session.export_report(now).expect("report");
    assert_eq!(report.filename(), "eye-fatigue-report-2025-01-15.json");

    let dir = tempdir().expect("temp dir");
    let path = dir.path().join(report.filename());
    report.write(&path).await.expect("write report");

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read report"))
            .expect("report is JSON");
    assert_eq!(written["final_fatigue_score"], json!("5.7/10"));
    assert_eq!(written["fatigue_level"], json!("Moderate"));
    assert_eq!(written["screen_time"], json!("10 hours"));
    assert_eq!(written["eye_condition"], json!("Dry Eyes"));
    assert_eq!(written["timestamp"], json!("2025-01-15T10:30:00.000Z"));

    session.reset();
    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.export_report(now).is_err());
}

#[test]
fn language_follows_saved_config() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("settings.toml");

    let mut french = Config::default();
    french.general.language = Some("fr".to_string());
    config::save_to_path(&french, &path).expect("save config");

    let loaded = config::load_from_path(&path).expect("load config");
    let i18n = I18n::new(None, &loaded);
    assert_eq!(i18n.current_locale().to_string(), "fr");
    assert_eq!(
        i18n.tr_with_args("results-screen-time-value", &[("hours", "10")]),
        "10 heures"
    );
}
