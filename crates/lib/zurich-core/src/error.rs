use std::{error::Error, fmt};

/// Failure raised by a backend adapter.
///
/// The variants form a closed set so that [`crate::classify::classify`] can
/// map every failure to a stable message without inspecting strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend answered with a non-2xx status.
    Status { status: u16, url: String },
    /// The request did not complete within the transport timeout.
    Timeout { url: String },
    /// The catalog envelope reported `success = false`, or violated its shape.
    Protocol(String),
    /// The records service returned a body that is not well-formed XML.
    XmlParse(String),
    /// The body could not be decoded into the expected JSON shape.
    Decode(String),
    /// Connection, TLS, redirect, or client construction failure.
    Transport(String),
}

impl BackendError {
    /// Category name used when no specific message applies.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Status { .. } => "HttpStatusError",
            Self::Timeout { .. } => "TimeoutError",
            Self::Protocol(_) => "ProtocolError",
            Self::XmlParse(_) => "XmlParseError",
            Self::Decode(_) => "DecodeError",
            Self::Transport(_) => "TransportError",
        }
    }

    /// HTTP status for [`BackendError::Status`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, url } => write!(f, "HTTP status {status} from {url}"),
            Self::Timeout { url } => write!(f, "request to {url} timed out"),
            Self::Protocol(message) => write!(f, "catalog API error: {message}"),
            Self::XmlParse(message) => write!(f, "XML parse error: {message}"),
            Self::Decode(message) => write!(f, "response decode error: {message}"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
        }
    }
}

impl Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map_or_else(String::new, |url| url.as_str().to_string());
        if err.is_timeout() {
            return Self::Timeout { url };
        }
        if let Some(status) = err.status() {
            return Self::Status {
                status: status.as_u16(),
                url,
            };
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<roxmltree::Error> for BackendError {
    fn from(err: roxmltree::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_distinct() {
        let errors = [
            BackendError::Status {
                status: 500,
                url: String::new(),
            },
            BackendError::Timeout { url: String::new() },
            BackendError::Protocol("x".to_string()),
            BackendError::XmlParse("x".to_string()),
            BackendError::Decode("x".to_string()),
            BackendError::Transport("x".to_string()),
        ];
        let mut names: Vec<_> = errors.iter().map(BackendError::kind_name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), errors.len());
    }

    #[test]
    fn xml_errors_convert_to_parse_failures() {
        let err = roxmltree::Document::parse("<Hits><Hit></Hits>")
            .map(|_| ())
            .expect_err("malformed xml");
        let backend = BackendError::from(err);
        assert_eq!(backend.kind_name(), "XmlParseError");
        assert!(backend.status().is_none());
    }
}
