use super::FormatError;
use serde::Serialize;

/// Convert a report to pretty-printed JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String, FormatError> {
    serde_json::to_string_pretty(value).map_err(FormatError::from)
}
