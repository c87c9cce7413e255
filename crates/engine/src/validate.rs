//! Per-field validation.

use crate::fields::EMAIL;

/// Why a field value is unacceptable. `Display` is the inline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// Validate one field value.
///
/// Emptiness is exact: a value of spaces is not empty. Only the email field
/// gets a format check, and only when non-empty.
pub fn validate(field_id: &str, value: &str, required: bool) -> Option<FieldError> {
    if required && value.is_empty() {
        return Some(FieldError::Required);
    }
    if field_id == EMAIL && !value.is_empty() && !is_plausible_email(value) {
        return Some(FieldError::InvalidEmail);
    }
    None
}

/// `local@domain` with both parts non-empty, no whitespace, exactly one `@`,
/// and a dot inside the domain with characters on both sides.
pub fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let len = domain.len();
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < len)
}
