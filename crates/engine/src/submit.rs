//! Submission payload and the transport seam.
//!
//! [`HttpSubmitter`] uses `ureq` (sync) wrapped in
//! `tokio::task::spawn_blocking` so the wizard's runtime never blocks on the
//! network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use kudos_storage::FormRecord;

use crate::config::{ConfigError, WizardConfig};
use crate::fields::{Track, FORM_TYPE};
use crate::state::WizardState;
use crate::upload::AttachedFile;

/// Banner shown after any failed submission.
pub const SUBMIT_FAILURE_MESSAGE: &str =
    "Unable to submit. Please check your connection and try again.";

/// Top-level body keys owned by the payload itself. Record entries with
/// these names are dropped rather than sent twice.
const RESERVED_KEYS: [&str; 6] = [
    FORM_TYPE,
    "submittedAt",
    "rating",
    "file",
    "userAgent",
    "referrer",
];

/// Opaque browser context forwarded with every submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    pub user_agent: String,
    pub referrer: String,
}

/// The JSON body POSTed to the collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(flatten)]
    pub answers: FormRecord,
    pub form_type: Track,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub submitted_at: String,
    pub rating: Option<u8>,
    pub file: Option<AttachedFile>,
    pub user_agent: String,
    pub referrer: String,
}

/// Assemble the body for `track` from the current state.
pub fn build_payload(
    track: Track,
    state: &WizardState,
    context: &ClientContext,
    now: OffsetDateTime,
) -> SubmissionPayload {
    let answers = state
        .record
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.iter().any(|reserved| *reserved == key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let submitted_at = now
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    SubmissionPayload {
        answers,
        form_type: track,
        submitted_at,
        rating: state.rating.to_payload(),
        file: state.attachment.clone(),
        user_agent: context.user_agent.clone(),
        referrer: context.referrer.clone(),
    }
}

/// Why a submission did not go through.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The endpoint answered outside 2xx.
    #[error("endpoint answered with HTTP {status}")]
    Rejected { status: u16 },
    /// No usable answer: DNS, connect, TLS, I/O, or a lost task.
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("could not encode submission: {0}")]
    Encode(String),
}

/// Delivers a payload to the collection endpoint.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError>;

    /// Short identifier used in logs.
    fn submitter_id(&self) -> &str;
}

/// POSTs the payload as JSON. Any 2xx is success.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    endpoint: String,
}

impl HttpSubmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpSubmitter {
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &WizardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(HttpSubmitter::new(config.endpoint.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        let body = serde_json::to_value(payload).map_err(|e| SubmitError::Encode(e.to_string()))?;
        let endpoint = self.endpoint.clone();

        tokio::task::spawn_blocking(move || {
            let agent = ureq::Agent::new_with_defaults();
            let response = agent
                .post(&endpoint)
                .send_json(&body)
                .map_err(|e| match e {
                    ureq::Error::StatusCode(status) => SubmitError::Rejected { status },
                    other => SubmitError::Transport(other.to_string()),
                })?;

            let status = response.status().as_u16();
            tracing::debug!(%endpoint, status, "endpoint answered");
            if (200..300).contains(&status) {
                Ok(())
            } else {
                Err(SubmitError::Rejected { status })
            }
        })
        .await
        .map_err(|e| SubmitError::Transport(format!("task join error: {}", e)))?
    }

    fn submitter_id(&self) -> &str {
        "http"
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Rating;
    use crate::upload::{admit, FileCandidate};
    use time::macros::datetime;

    fn context() -> ClientContext {
        ClientContext {
            user_agent: "Mozilla/5.0 (test)".to_string(),
            referrer: "https://example.com/blog".to_string(),
        }
    }

    fn state_with(pairs: &[(&str, &str)]) -> WizardState {
        WizardState::seeded(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn answers_are_flattened_into_the_body() {
        let state = state_with(&[("name", "Ada"), ("quote", "Loved it")]);
        let payload = build_payload(
            Track::DeepDive,
            &state,
            &context(),
            datetime!(2025-02-03 04:05:06 UTC),
        );
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["name"], "Ada");
        assert_eq!(json["quote"], "Loved it");
        assert_eq!(json["formType"], "deepDive");
        assert_eq!(json["submittedAt"], "2025-02-03T04:05:06Z");
        assert_eq!(json["userAgent"], "Mozilla/5.0 (test)");
        assert_eq!(json["referrer"], "https://example.com/blog");
    }

    #[test]
    fn unset_rating_and_missing_file_are_null() {
        let payload = build_payload(
            Track::ShortReview,
            &state_with(&[]),
            &context(),
            OffsetDateTime::UNIX_EPOCH,
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["rating"].is_null());
        assert!(json["file"].is_null());
        assert!(json.as_object().unwrap().contains_key("rating"));
        assert!(json.as_object().unwrap().contains_key("file"));
    }

    #[test]
    fn rating_and_attachment_are_included() {
        let mut state = state_with(&[("name", "Ada")]);
        state.rating = Rating::new(5).unwrap();
        state.attachment =
            Some(admit(FileCandidate::new("logo.png", "image/png", vec![1, 2, 3])).unwrap());

        let json = serde_json::to_value(build_payload(
            Track::ShortReview,
            &state,
            &context(),
            OffsetDateTime::UNIX_EPOCH,
        ))
        .unwrap();
        assert_eq!(json["rating"], 5);
        assert_eq!(json["file"]["name"], "logo.png");
        assert_eq!(json["file"]["encodedData"], "data:image/png;base64,AQID");
    }

    #[test]
    fn reserved_record_keys_are_not_duplicated() {
        let state = state_with(&[("formType", "shortReview"), ("rating", "9"), ("name", "Ada")]);
        let payload = build_payload(
            Track::DeepDive,
            &state,
            &context(),
            OffsetDateTime::UNIX_EPOCH,
        );
        assert!(!payload.answers.contains_key("formType"));
        assert!(!payload.answers.contains_key("rating"));

        let body = serde_json::to_string(&payload).unwrap();
        assert_eq!(body.matches("\"formType\"").count(), 1);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["formType"], "deepDive");
        assert!(json["rating"].is_null());
    }

    #[test]
    fn payload_matches_submission_schema() {
        let schema_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../schema/submission-schema.json");
        let schema_src = std::fs::read_to_string(&schema_path)
            .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
        let schema: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
        let validator = jsonschema::validator_for(&schema)
            .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e));

        let mut with_everything = state_with(&[("name", "Ada"), ("permission", "Yes")]);
        with_everything.rating = Rating::new(3).unwrap();
        with_everything.attachment =
            Some(admit(FileCandidate::new("a.svg", "image/svg+xml", b"<svg/>".to_vec())).unwrap());

        let mut failures = Vec::new();
        for (track, state) in [
            (Track::ShortReview, state_with(&[])),
            (Track::DeepDive, with_everything),
        ] {
            let payload = build_payload(track, &state, &context(), datetime!(2025-01-01 0:00 UTC));
            let instance = serde_json::to_value(&payload).unwrap();
            if let Err(error) = validator.validate(&instance) {
                failures.push(format!("{}: {}", track, error));
            }
        }
        assert!(failures.is_empty(), "{}", failures.join("\n"));
    }

    #[test]
    fn http_submitter_refuses_unconfigured_endpoint() {
        let config = WizardConfig::default();
        assert!(matches!(
            HttpSubmitter::from_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_failure() {
        // Bind then drop a listener so the port is known to be free.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let submitter = HttpSubmitter::new(format!("http://{}/collect", addr));
        let payload = build_payload(
            Track::ShortReview,
            &state_with(&[]),
            &context(),
            OffsetDateTime::UNIX_EPOCH,
        );
        let result = submitter.submit(&payload).await;
        assert!(matches!(result, Err(SubmitError::Transport(_))), "{result:?}");
    }
}
