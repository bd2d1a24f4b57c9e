//! Extraction of user-facing messages from error response bodies.

use serde_json::Value;

/// Pulls the message out of an error body.
///
/// Looks at `detail` first (a string, or FastAPI's list of validation
/// errors), then `message`. Returns `None` when neither yields text.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    match value.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => {
            return Some(detail.clone());
        }
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }

    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        assert_eq!(
            extract_error_message(r#"{"detail":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
    }

    #[test]
    fn test_detail_validation_list() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error.email"},{"loc":["body","password"],"msg":"field required"}]}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("value is not a valid email address; field required")
        );
    }

    #[test]
    fn test_message_fallback() {
        assert_eq!(
            extract_error_message(r#"{"message":"Rate limited"}"#).as_deref(),
            Some("Rate limited")
        );
        assert_eq!(
            extract_error_message(r#"{"detail":"","message":"Rate limited"}"#).as_deref(),
            Some("Rate limited")
        );
    }

    #[test]
    fn test_no_message() {
        assert_eq!(extract_error_message(""), None);
        assert_eq!(extract_error_message("Internal Server Error"), None);
        assert_eq!(extract_error_message(r#"{"error":true}"#), None);
    }
}
