//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs and helpers to extract
//! and validate JSON bodies in handlers. Domain rules (document checksums,
//! the area invariant) stay in the registry; `Validate` only covers what
//! the transport layer can reject on its own, such as field lengths.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Longest accepted free-text field, in characters.
pub const MAX_TEXT_LEN: usize = 255;

/// Trait for request types that can validate their shape
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate the request. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Reject `value` if it is longer than [`MAX_TEXT_LEN`] characters.
pub fn check_length(field: &str, value: &str) -> Result<(), String> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(format!("{field} must not exceed {MAX_TEXT_LEN} characters"));
    }
    Ok(())
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
