//! Errors for host operations.
//!
//! Mapped to [`DownloadError`] at the crate boundary.

use lmbridge_core::DownloadError;
use thiserror::Error;

pub type HfResult<T> = Result<T, HfError>;

#[derive(Debug, Error)]
pub enum HfError {
    /// Request failed with an HTTP error status.
    #[error("Request failed with status {status}: {url}")]
    ApiRequestFailed { status: u16, url: String },

    /// Request succeeded but carried no body.
    #[error("Empty response body: {url}")]
    EmptyBody { url: String },

    /// Response was well-formed JSON of an unexpected shape.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// A response body stream broke off.
    #[error("Transfer interrupted: {message}")]
    Transfer { message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<HfError> for DownloadError {
    fn from(err: HfError) -> Self {
        match err {
            HfError::ApiRequestFailed { status: 404, url } => Self::not_found(url),
            HfError::ApiRequestFailed { status, url } => {
                Self::network_with_status(format!("request to {url} failed"), status)
            }
            HfError::EmptyBody { .. } | HfError::Transfer { .. } | HfError::Network(_) => {
                Self::network(err.to_string())
            }
            HfError::InvalidResponse { .. } | HfError::InvalidUrl(_) | HfError::JsonParse(_) => {
                Self::resolution_failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_status_maps_to_not_found() {
        let err = HfError::ApiRequestFailed {
            status: 404,
            url: "https://h/api/models/a/b/tree/main".into(),
        };
        assert!(matches!(DownloadError::from(err), DownloadError::NotFound { .. }));
    }

    #[test]
    fn server_error_keeps_status() {
        let err = HfError::ApiRequestFailed {
            status: 502,
            url: "https://h".into(),
        };
        assert!(matches!(
            DownloadError::from(err),
            DownloadError::Network {
                status_code: Some(502),
                ..
            }
        ));
    }

    #[test]
    fn malformed_payload_is_a_resolution_failure() {
        let parse = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let mapped = DownloadError::from(HfError::from(parse));
        assert!(matches!(mapped, DownloadError::ResolutionFailed { .. }));
        assert!(mapped.is_host_specific());
    }

    #[test]
    fn empty_body_message_names_url() {
        let err = HfError::EmptyBody {
            url: "https://h/x".into(),
        };
        assert!(err.to_string().contains("https://h/x"));
        assert!(matches!(DownloadError::from(err), DownloadError::Network { .. }));
    }
}
