use crate::state::Page;

/// Requests the wizard refuses.
///
/// State is left untouched whenever one is returned, except for
/// [`WizardError::Incomplete`]: the strict completeness check has already
/// written a verdict for every question into `validation` so the failing
/// fields can be shown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("cannot {action} from the {from:?} page")]
    InvalidTransition { from: Page, action: &'static str },

    #[error("submission is only possible on a survey page, not {page:?}")]
    NotOnTrack { page: Page },

    #[error("a submission is already in flight")]
    AlreadySubmitting,

    #[error("rating must be between 0 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("required answers missing or invalid: {}", .fields.join(", "))]
    Incomplete { fields: Vec<String> },
}
