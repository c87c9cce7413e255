//! `HttpSubmitter` against a local axum endpoint.
//!
//! Each test binds its own endpoint on an ephemeral port and scripts the
//! statuses it answers with.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use kudos_engine::{
    HttpSubmitter, Page, SubmitError, SubmitOutcome, Submitter, Track, WizardConfig,
    WizardController, WizardState, SUBMIT_FAILURE_MESSAGE,
};
use kudos_storage::MemoryStore;

#[derive(Clone, Default)]
struct Endpoint {
    statuses: Arc<Mutex<VecDeque<u16>>>,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
}

async fn collect(
    State(endpoint): State<Endpoint>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    endpoint.received.lock().unwrap().push(body);
    let status = endpoint.statuses.lock().unwrap().pop_front().unwrap_or(200);
    StatusCode::from_u16(status).unwrap()
}

/// Start an endpoint answering with `statuses` in order, then 200.
async fn spawn_endpoint(statuses: &[u16]) -> (String, Endpoint) {
    let endpoint = Endpoint::default();
    endpoint
        .statuses
        .lock()
        .unwrap()
        .extend(statuses.iter().copied());

    let app = Router::new()
        .route("/collect", post(collect))
        .with_state(endpoint.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/collect", addr), endpoint)
}

fn payload(track: Track) -> kudos_engine::SubmissionPayload {
    let mut state = WizardState::default();
    state
        .record
        .insert("name".to_string(), "Ada Lovelace".to_string());
    kudos_engine::build_payload(
        track,
        &state,
        &kudos_engine::ClientContext::default(),
        time::OffsetDateTime::now_utc(),
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn any_2xx_is_success() {
    let (url, endpoint) = spawn_endpoint(&[201, 204]).await;
    let submitter = HttpSubmitter::new(url);

    submitter.submit(&payload(Track::ShortReview)).await.unwrap();
    submitter.submit(&payload(Track::DeepDive)).await.unwrap();

    let received = endpoint.received.lock().unwrap().clone();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0]["formType"], "shortReview");
    assert_eq!(received[0]["name"], "Ada Lovelace");
    assert_eq!(received[1]["formType"], "deepDive");
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_is_rejected_with_status() {
    let (url, _endpoint) = spawn_endpoint(&[500]).await;
    let submitter = HttpSubmitter::new(url);

    let result = submitter.submit(&payload(Track::ShortReview)).await;
    assert!(
        matches!(result, Err(SubmitError::Rejected { status: 500 })),
        "{result:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_route_is_rejected() {
    let (url, _endpoint) = spawn_endpoint(&[]).await;
    let submitter = HttpSubmitter::new(url.replace("/collect", "/elsewhere"));

    let result = submitter.submit(&payload(Track::ShortReview)).await;
    assert!(
        matches!(result, Err(SubmitError::Rejected { status: 404 })),
        "{result:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn wizard_retries_over_http_after_a_500() {
    let (url, endpoint) = spawn_endpoint(&[500]).await;
    let config = WizardConfig {
        endpoint: url,
        referrer: "https://example.com/case-studies".to_string(),
        ..WizardConfig::default()
    };
    let submitter = Arc::new(HttpSubmitter::from_config(&config).unwrap());
    let mut wizard = WizardController::new(config, Arc::new(MemoryStore::new()), submitter);

    wizard.choose(Track::DeepDive).unwrap();
    wizard.edit("name", "Grace Hopper");
    wizard.edit("quote", "Indispensable.");
    wizard.set_rating(5).unwrap();

    let first = wizard.submit().await.unwrap();
    assert!(matches!(
        first,
        SubmitOutcome::Failed(SubmitError::Rejected { status: 500 })
    ));
    assert_eq!(wizard.page(), Page::DeepDive);
    assert_eq!(
        wizard.state().submit_error.as_deref(),
        Some(SUBMIT_FAILURE_MESSAGE)
    );
    assert_eq!(wizard.state().value("quote"), Some("Indispensable."));

    let second = wizard.submit().await.unwrap();
    assert!(second.is_accepted());
    assert_eq!(wizard.page(), Page::Success);

    let received = endpoint.received.lock().unwrap().clone();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1]["quote"], "Indispensable.");
    assert_eq!(received[1]["rating"], 5);
    assert_eq!(received[1]["referrer"], "https://example.com/case-studies");
    assert!(received[1]["userAgent"]
        .as_str()
        .unwrap()
        .starts_with("kudos-engine/"));
}
