use std::borrow::Cow;

use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use tracing::warn;
use zurich_core::ControlError;

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Rejects `value` when its trimmed form is shorter than `min_chars`.
pub fn required<'a>(value: &'a str, field: &str, min_chars: usize) -> Result<&'a str, ErrorData> {
    let value = value.trim();
    if value.chars().count() < min_chars {
        return Err(mcp_err(
            ErrorCode::INVALID_PARAMS,
            format!("`{field}` must contain at least {min_chars} characters"),
        ));
    }
    Ok(value)
}

/// Rejects `value` when it is longer than `max_chars`.
pub fn at_most<'a>(value: &'a str, field: &str, max_chars: usize) -> Result<&'a str, ErrorData> {
    if value.chars().count() > max_chars {
        return Err(mcp_err(
            ErrorCode::INVALID_PARAMS,
            format!("`{field}` must not exceed {max_chars} characters"),
        ));
    }
    Ok(value)
}

/// Trims an optional text parameter; blank values count as absent.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn clamp(value: Option<u32>, default: u32, min: u32, max: u32) -> u32 {
    value.unwrap_or(default).clamp(min, max)
}

/// Markdown success result, or the failure message for `context`.
pub fn respond<T>(
    result: Result<T, ControlError>,
    context: &str,
    render: impl FnOnce(T) -> String,
) -> CallToolResult {
    match result {
        Ok(value) => CallToolResult::success(vec![Content::text(render(value))]),
        Err(err) => {
            warn!(context, error = %err, "tool call failed");
            CallToolResult::error(vec![Content::text(err.message(context))])
        }
    }
}
