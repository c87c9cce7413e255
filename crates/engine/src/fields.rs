//! Field catalogue for the two survey tracks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved record key naming the completed track.
pub const FORM_TYPE: &str = "formType";
/// The only field with a format check beyond "required".
pub const EMAIL: &str = "email";
pub const PERMISSION: &str = "permission";

/// One question of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub required: bool,
}

const fn required(id: &'static str) -> FieldSpec {
    FieldSpec { id, required: true }
}

const fn optional(id: &'static str) -> FieldSpec {
    FieldSpec {
        id,
        required: false,
    }
}

const SHORT_REVIEW_FIELDS: &[FieldSpec] = &[
    required("name"),
    required(EMAIL),
    required("company"),
    required("role"),
    required("headline"),
    required("review"),
    required(PERMISSION),
    optional("website"),
];

const DEEP_DIVE_FIELDS: &[FieldSpec] = &[
    required("name"),
    required(EMAIL),
    required("company"),
    required("role"),
    optional("industry"),
    optional("teamSize"),
    required("challenge"),
    required("solution"),
    required("results"),
    optional("metrics"),
    optional("timeline"),
    required("quote"),
    optional("additionalNotes"),
    required(PERMISSION),
];

/// The two survey variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Track {
    /// Quick review: a handful of questions and a rating.
    ShortReview,
    /// Testimonial deep-dive: the long form, auto-saved as a draft.
    DeepDive,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::ShortReview, Track::DeepDive];

    /// Label written to `formType` and sent on submission.
    pub fn label(self) -> &'static str {
        match self {
            Track::ShortReview => "shortReview",
            Track::DeepDive => "deepDive",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Track::ShortReview => SHORT_REVIEW_FIELDS,
            Track::DeepDive => DEEP_DIVE_FIELDS,
        }
    }

    pub fn field(self, id: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.id == id)
    }

    /// Whether `id` must be answered on this track. Unknown fields are optional.
    pub fn is_required(self, id: &str) -> bool {
        self.field(id).map(|f| f.required).unwrap_or(false)
    }

    /// Only the deep-dive track keeps a draft.
    pub fn keeps_draft(self) -> bool {
        matches!(self, Track::DeepDive)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
