//! Maps backend failures to stable, user-facing messages.

use crate::error::BackendError;

pub const NOT_FOUND: &str = "Ressource nicht gefunden. Bitte ID/Name prüfen.";
pub const FORBIDDEN: &str = "Zugriff verweigert.";
pub const RATE_LIMITED: &str = "Zu viele Anfragen. Bitte warten.";
pub const TIMED_OUT: &str = "Zeitüberschreitung. Bitte erneut versuchen.";

/// Message prefix for a context label such as `Datensatzsuche`.
#[must_use]
pub fn prefix(context: &str) -> String {
    if context.is_empty() {
        "Fehler: ".to_string()
    } else {
        format!("Fehler bei {context}: ")
    }
}

/// Turns `err` into a message prefixed with `context`.
///
/// Status codes 404, 403 and 429 get fixed messages, other statuses a
/// generic one, timeouts a retry hint, and everything else its category
/// name and description. Pure; never fails.
#[must_use]
pub fn classify(err: &BackendError, context: &str) -> String {
    let prefix = prefix(context);
    match err {
        BackendError::Status { status: 404, .. } => format!("{prefix}{NOT_FOUND}"),
        BackendError::Status { status: 403, .. } => format!("{prefix}{FORBIDDEN}"),
        BackendError::Status { status: 429, .. } => format!("{prefix}{RATE_LIMITED}"),
        BackendError::Status { status, .. } => format!("{prefix}HTTP-Fehler {status}"),
        BackendError::Timeout { .. } => format!("{prefix}{TIMED_OUT}"),
        other => format!("{prefix}{}: {other}", other.kind_name()),
    }
}
