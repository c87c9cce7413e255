use std::collections::BTreeMap;

use serde::Serialize;

use kudos_storage::FormRecord;

use crate::fields::Track;
use crate::upload::{AttachedFile, RejectReason};
use crate::validate::FieldError;

/// Field id → verdict of the most recent validation.
///
/// A missing entry means the field was never validated; `Some(None)` means
/// it was validated and is fine.
pub type ValidationMap = BTreeMap<String, Option<FieldError>>;

/// Where the visitor is in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    #[default]
    Landing,
    ShortReview,
    DeepDive,
    Success,
}

impl Page {
    pub fn for_track(track: Track) -> Page {
        match track {
            Track::ShortReview => Page::ShortReview,
            Track::DeepDive => Page::DeepDive,
        }
    }

    /// The track this page collects answers for, if it is a survey page.
    pub fn track(self) -> Option<Track> {
        match self {
            Page::ShortReview => Some(Track::ShortReview),
            Page::DeepDive => Some(Track::DeepDive),
            Page::Landing | Page::Success => None,
        }
    }
}

/// Star rating, 0 meaning unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Rating(u8);

impl Rating {
    pub const UNSET: Rating = Rating(0);
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Option<Rating> {
        (stars <= Self::MAX).then_some(Rating(stars))
    }

    pub fn stars(self) -> u8 {
        self.0
    }

    pub fn is_set(self) -> bool {
        self.0 != 0
    }

    /// `None` for unset, otherwise the star count.
    pub fn to_payload(self) -> Option<u8> {
        self.is_set().then_some(self.0)
    }
}

/// The wizard's single mutable aggregate.
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    pub page: Page,
    pub record: FormRecord,
    pub validation: ValidationMap,
    pub rating: Rating,
    pub attachment: Option<AttachedFile>,
    /// The last upload rejection, until a successful upload or reset.
    pub upload_error: Option<RejectReason>,
    pub submitting: bool,
    pub submit_error: Option<String>,
    /// Raised when a draft write lands; lowered shortly after.
    pub draft_just_saved: bool,
}

impl WizardState {
    /// Fresh state on the landing page with `record` pre-filled.
    pub fn seeded(record: FormRecord) -> Self {
        WizardState {
            record,
            ..WizardState::default()
        }
    }

    pub fn value(&self, field_id: &str) -> Option<&str> {
        self.record.get(field_id).map(String::as_str)
    }

    pub fn error_for(&self, field_id: &str) -> Option<FieldError> {
        self.validation.get(field_id).copied().flatten()
    }

    pub fn has_errors(&self) -> bool {
        self.validation.values().any(Option::is_some)
    }

    /// Back to a blank landing page.
    pub(crate) fn reset(&mut self) {
        *self = WizardState::default();
    }
}
