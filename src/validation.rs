//! Input validation applied before any persistence attempt.

use crate::glucose::classification::{threshold, FASTING_THRESHOLD};
use crate::glucose::types::GlucoseType;
use thiserror::Error;

/// Lowest plausible glucose value accepted, mg/dL.
pub const MIN_GLUCOSE_VALUE: f64 = 20.0;

/// Highest plausible glucose value accepted, mg/dL.
pub const MAX_GLUCOSE_VALUE: f64 = 600.0;

/// Minimum display-name length after trimming.
pub const MIN_NAME_LEN: usize = 2;

/// Maximum display-name length after trimming.
pub const MAX_NAME_LEN: usize = 50;

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Rejection reasons for user-supplied input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("glucose value {0} mg/dL is outside the expected range ({MIN_GLUCOSE_VALUE}-{MAX_GLUCOSE_VALUE} mg/dL)")]
    ValueOutOfRange(f64),
    #[error("name must be between {MIN_NAME_LEN} and {MAX_NAME_LEN} characters")]
    InvalidName,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} alphanumeric characters with at least one letter and one digit")]
    InvalidPassword,
}

/// Check a glucose value against the clinically plausible range.
pub fn validate_reading_value(value: f64) -> Result<(), ValidationError> {
    if !(MIN_GLUCOSE_VALUE..=MAX_GLUCOSE_VALUE).contains(&value) {
        return Err(ValidationError::ValueOutOfRange(value));
    }
    Ok(())
}

/// Advisory message when a valid value misses its clinical target.
///
/// Returns `None` for in-target values. This is a form hint, not a rejection;
/// out-of-target readings are stored with `is_normal = false`.
pub fn target_exceeded(reading_type: GlucoseType, value: f64) -> Option<String> {
    let max = threshold(reading_type);
    match reading_type {
        GlucoseType::Fasting if value >= FASTING_THRESHOLD => Some(format!(
            "Above the fasting target (target: < {max} mg/dL)"
        )),
        GlucoseType::Fasting => None,
        _ if value > max => Some(format!(
            "Above the {} target (target: <= {max} mg/dL)",
            reading_type.label().to_lowercase()
        )),
        _ => None,
    }
}

/// Check a display name: 2-50 characters after trimming.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(ValidationError::InvalidName);
    }
    Ok(())
}

/// Check an email address for the minimal `local@domain.tld` shape.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }

    // Domain needs a dot with something on both sides
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}

/// Check password format: >= 6 alphanumeric characters, at least one letter
/// and one digit.
pub fn validate_password_format(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::InvalidPassword);
    }
    if !password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidPassword);
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidPassword);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPassword);
    }
    Ok(())
}
