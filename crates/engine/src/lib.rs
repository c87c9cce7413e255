//! Kudos form wizard engine.
//!
//! A visitor picks one of two survey tracks, answers its questions,
//! optionally attaches an image, and submits. This crate holds everything
//! with state and invariants:
//!
//! - [`validate`](validate::validate): per-field verdicts
//! - [`upload`]: attachment admission and data-URI encoding
//! - [`WizardController`]: navigation, debounced draft saving, submission
//! - [`Submitter`] / [`HttpSubmitter`]: delivery to the collection endpoint
//!
//! Drafts persist through `kudos-storage`.

mod config;
mod controller;
mod debounce;
mod error;
pub mod fields;
mod state;
mod submit;
pub mod upload;
pub mod validate;

pub use config::{read_config, ConfigError, WizardConfig};
pub use controller::{Applied, PendingSubmission, SubmitOutcome, WizardController, WizardEvent};
pub use error::WizardError;
pub use fields::{FieldSpec, Track};
pub use kudos_storage::FormRecord;
pub use state::{Page, Rating, ValidationMap, WizardState};
pub use submit::{
    build_payload, ClientContext, HttpSubmitter, SubmissionPayload, SubmitError, Submitter,
    SUBMIT_FAILURE_MESSAGE,
};
pub use upload::{AttachedFile, FileCandidate, RejectReason};
pub use validate::FieldError;
