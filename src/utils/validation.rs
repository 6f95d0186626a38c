use crate::models::MAX_TEXT_LENGTH;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// A field constraint violation, raised before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, ToSchema)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationErrors> for ValidationError {
    fn from(errors: ValidationErrors) -> Self {
        // Report the first offending field; sorted so the choice is stable.
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first().and_then(|(field, errs)| Some((field, errs.first()?))) {
            Some((field, err)) => Self::new(
                field.to_string(),
                err.code.to_string(),
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{}'", field)),
            ),
            None => Self::new("input", "invalid", "Invalid input"),
        }
    }
}

/// Sanitizes an uploaded file name so it can be used inside the media root.
/// Directory components are dropped and reserved characters replaced.
pub fn sanitize_filename(filename: &str) -> Result<String, ValidationError> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.trim().is_empty() {
        return Err(ValidationError::new(
            "image",
            "INVALID_FILENAME",
            "Filename cannot be empty",
        ));
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path components stripped from upload name: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ';' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    if sanitized.starts_with('.') {
        return Err(ValidationError::new(
            "image",
            "HIDDEN_FILE",
            "Hidden files (starting with '.') are not allowed",
        ));
    }

    // Leave room for the "images/<uuid>-" prefix in the stored reference.
    let budget = MAX_TEXT_LENGTH - "images/".len() - 37;
    Ok(truncate_chars(&sanitized, budget))
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}
