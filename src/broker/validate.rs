//! Broker object name rules.

use crate::error::ToolError;

/// Longest queue or exchange name the broker accepts.
pub const MAX_NAME_LEN: usize = 255;

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

/// Checks a queue or exchange name before it is sent anywhere.
///
/// `label` names the argument in the error message, e.g. "Queue name".
/// Checks run in order (emptiness, charset, length) and the first violation
/// is reported.
pub fn validate_name(name: &str, label: &str) -> Result<(), ToolError> {
    if name.trim().is_empty() {
        return Err(ToolError::validation(format!("{} cannot be empty", label)));
    }
    if !name.chars().all(is_allowed) {
        return Err(ToolError::validation(format!(
            "{} can only contain letters, digits, hyphen, underscore, period, or colon",
            label
        )));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ToolError::validation(format!(
            "{} must be less than {} characters",
            label, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Message bodies only need to carry something besides whitespace.
pub fn validate_message(message: &str) -> Result<(), ToolError> {
    if message.trim().is_empty() {
        return Err(ToolError::validation("Message cannot be empty"));
    }
    Ok(())
}
