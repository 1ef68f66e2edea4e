use std::error;
use std::fmt;

use crate::api::Errors;

/// All possible mailer errors
#[derive(Clone, Debug)]
pub enum Error {
    /// Mailer cannot be built from the supplied config
    Config(String),
    RequestTimeout,
    Transport(String),
    Json(String),
    /// Error list reported by the provider in a 4xx/5xx response
    Provider(Errors),
    /// Failed response without a usable error body (strict mode only)
    Status { status: u16, body: String },
}

impl Error {
    /// Provider-reported errors, if this is a provider error.
    pub fn provider_errors(&self) -> Option<&Errors> {
        match *self {
            Error::Provider(ref errs) => Some(errs),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Config(ref msg) => write!(f, "{}", msg),
            Error::RequestTimeout => f.write_str("request timed out"),
            Error::Transport(ref msg) => write!(f, "{}", msg),
            Error::Json(ref msg) => write!(f, "JsonError: {}", msg),
            Error::Provider(ref errs) => write!(f, "{}", errs),
            Error::Status { status, ref body } => {
                write!(f, "request failed with status {}: {}", status, body)
            }
        }
    }
}

impl error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid base URL: {}", err))
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(err: serde_json::error::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    #[test]
    fn test_provider_display_is_first_message() {
        let err = Error::Provider(Errors(vec![
            ApiError::new("Invalid email"),
            ApiError::new("Missing subject"),
        ]));

        assert_eq!(err.to_string(), "Invalid email");
        assert_eq!(err.provider_errors().map(|e| e.len()), Some(2));
    }

    #[test]
    fn test_transport_display_is_verbatim() {
        let err = Error::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
        assert!(err.provider_errors().is_none());
    }
}
