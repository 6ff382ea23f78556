//! Error types for wasop

use std::fmt;

use thiserror::Error;

/// Result type alias for wasop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the SDK and CLI
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

impl Error {
    /// The API error inside this error, if any.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Body of a failed API response: parsed JSON when possible, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(serde_json::Value),
    Text(String),
}

impl ErrorBody {
    /// Parse a response body, keeping the raw text when it is not JSON.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(value) => ErrorBody::Json(value),
            Err(_) => ErrorBody::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorBody::Json(value) => write!(f, "{}", value),
            ErrorBody::Text(text) if text.is_empty() => write!(f, "<empty body>"),
            ErrorBody::Text(text) => write!(f, "{}", text),
        }
    }
}

/// API-related errors raised by the transport
#[derive(Debug, Error)]
pub enum ApiError {
    /// Any non-429 status of 400 or above. Never retried.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        body: ErrorBody,
        url: String,
    },

    /// 429 persisted past the retry budget.
    #[error("Throttled by API after {attempts} attempts: {url}")]
    Throttled { attempts: u32, url: String },

    #[error("Connection error: {0}")]
    Connection(String),

    /// Raised for a single request past its deadline and for a poll loop past its deadline.
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Throttled { .. } => Some(429),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(format!("request exceeded its deadline: {}", err))
        } else if err.is_connect() {
            ApiError::Connection(format!("failed to connect to API: {}", err))
        } else if err.is_decode() || err.is_body() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Connection(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `wasop init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("API credentials not configured. Run `wasop init` or `wasop config set`.")]
    MissingCredentials,

    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message_includes_status_and_url() {
        let err = ApiError::Status {
            status: 404,
            body: ErrorBody::Text("missing".to_string()),
            url: "https://cloud.tenable.com/was/v2/scans/abc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("/was/v2/scans/abc"));
        assert!(msg.contains("missing"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_throttled_is_distinct_from_status() {
        let err = ApiError::Throttled {
            attempts: 5,
            url: "u".to_string(),
        };
        assert!(err.to_string().contains("5 attempts"));
        assert_eq!(err.status(), Some(429));
        assert!(!matches!(err, ApiError::Status { .. }));
    }

    #[test]
    fn test_error_body_parse_json() {
        let body = ErrorBody::parse(r#"{"error":"bad filter"}"#);
        match body {
            ErrorBody::Json(v) => assert_eq!(v["error"], "bad filter"),
            ErrorBody::Text(_) => panic!("Expected JSON body"),
        }
    }

    #[test]
    fn test_error_body_parse_text() {
        let body = ErrorBody::parse("<html>gateway</html>");
        assert_eq!(body, ErrorBody::Text("<html>gateway</html>".to_string()));
    }

    #[test]
    fn test_empty_text_body_display() {
        assert_eq!(ErrorBody::Text(String::new()).to_string(), "<empty body>");
    }

    #[test]
    fn test_unauthorized_helper() {
        let err = ApiError::Status {
            status: 403,
            body: ErrorBody::Text(String::new()),
            url: "u".to_string(),
        };
        assert!(err.is_unauthorized());
        assert!(!ApiError::Connection("x".to_string()).is_unauthorized());
    }

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound;
        assert!(err.to_string().contains("wasop init"));
    }

    #[test]
    fn test_config_error_missing_credentials() {
        let err = ConfigError::MissingCredentials;
        assert!(err.to_string().contains("wasop config set"));
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::Timeout("poll".to_string()).into();
        assert!(matches!(err.as_api(), Some(ApiError::Timeout(_))));
    }

    #[test]
    fn test_error_from_config_error() {
        let err: Error = ConfigError::NotFound.into();
        match err {
            Error::Config(ConfigError::NotFound) => (),
            _ => panic!("Expected Error::Config(ConfigError::NotFound)"),
        }
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
