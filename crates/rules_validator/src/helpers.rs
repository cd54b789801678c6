//! Standalone value checks used outside rule chains.
//!
//! Handlers call these directly for query parameters and uploads, where a
//! whole field spec would be overkill. Failures are reported as
//! [`ValidationError::InvalidValue`].

use crate::ValidationError;
use crate::rules::{DATE_FORMAT, parse_date, parse_integer};
use rules_core::RawValue;

/// MIME types accepted for uploaded images.
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/png",
    "image/jpg",
    "image/jpeg",
    "image/gif",
    "image/webp",
];

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_SIZE: u64 = 2 * 1024 * 1024;

/// Validates an integer, optionally within an inclusive range.
///
/// An empty string yields `Ok(None)`.
///
/// ```rust
/// use rules_validator::validate_integer;
///
/// assert_eq!(validate_integer(&"15".into(), Some(1), Some(100)).unwrap(), Some(15));
/// assert_eq!(validate_integer(&"".into(), None, None).unwrap(), None);
/// assert!(validate_integer(&"0".into(), Some(1), None).is_err());
/// ```
pub fn validate_integer(
    raw: &RawValue,
    min_range: Option<i64>,
    max_range: Option<i64>,
) -> Result<Option<i64>, ValidationError> {
    let number = match raw {
        RawValue::String(s) if s.is_empty() => return Ok(None),
        RawValue::String(s) => parse_integer(s),
        RawValue::Int(i) => Some(*i),
        _ => None,
    };

    number
        .filter(|n| min_range.is_none_or(|min| *n >= min))
        .filter(|n| max_range.is_none_or(|max| *n <= max))
        .map(Some)
        .ok_or_else(|| ValidationError::invalid_value("The provided value is not a valid integer."))
}

/// Validates a string. An empty string yields `Ok(None)`.
pub fn validate_string(raw: &RawValue) -> Result<Option<String>, ValidationError> {
    match raw {
        RawValue::String(s) if s.is_empty() => Ok(None),
        RawValue::String(s) => Ok(Some(s.clone())),
        _ => Err(ValidationError::invalid_value(
            "The provided value is not a valid string.",
        )),
    }
}

/// Validates a `YYYY-MM-DD` date and returns it unchanged.
pub fn validate_date(text: &str) -> Result<String, ValidationError> {
    parse_date(text).map(|_| text.to_string()).ok_or_else(|| {
        ValidationError::invalid_value(format!(
            "Invalid date format for {}. Required format: Y-m-d",
            text
        ))
    })
}

/// An uploaded file as described by the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-side file name
    pub name: String,
    /// Declared MIME type
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// Temporary storage location
    pub tmp_name: String,
}

impl UploadedFile {
    /// Reads an upload from its map form: `name`, `type`, `size` and
    /// `tmp_name` keys.
    pub fn from_raw(raw: &RawValue) -> Result<Self, ValidationError> {
        let text = |key: &str| raw.get(key).and_then(RawValue::as_str).map(String::from);
        let size = match raw.get("size") {
            Some(RawValue::Int(n)) => u64::try_from(*n).ok(),
            Some(RawValue::String(s)) => s.parse().ok(),
            _ => None,
        };

        match (text("name"), text("type"), size) {
            (Some(name), Some(mime_type), Some(size)) => Ok(Self {
                name,
                mime_type,
                size,
                tmp_name: text("tmp_name").unwrap_or_default(),
            }),
            _ => Err(ValidationError::invalid_value(
                "The provided value is not a valid file.",
            )),
        }
    }
}

/// Checks that an upload is an image of an accepted type and size.
pub fn validate_file(file: &UploadedFile) -> Result<(), ValidationError> {
    if !ALLOWED_IMAGE_TYPES.contains(&file.mime_type.as_str()) {
        return Err(ValidationError::invalid_value(
            "The provided value is not a valid type.",
        ));
    }

    if file.size > MAX_UPLOAD_SIZE {
        return Err(ValidationError::invalid_value(
            "The uploaded file exceeds the maximum allowed size of 2MB.",
        ));
    }

    Ok(())
}
