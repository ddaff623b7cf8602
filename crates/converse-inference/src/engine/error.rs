//! Error types for the engine client.

use reqwest::StatusCode;
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Result type alias for engine client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for engine client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// The engine answered with a non-success status.
    #[error("Engine responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// A response line could not be read.
    #[error("Stream error: {0}")]
    Lines(#[from] LinesCodecError),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<Error> for crate::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    crate::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    crate::Error::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else {
                    crate::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Status { status, body } => crate::Error::external_error()
                .with_message(format!("Inference engine responded with {status}: {body}")),
            Error::Lines(LinesCodecError::Io(e)) => crate::Error::network_error()
                .with_message(e.to_string())
                .with_source(e),
            Error::Lines(e) => crate::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Serde(e) => crate::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn status_maps_to_external_error() {
        let error: crate::Error = Error::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".into(),
        }
        .into();
        assert_eq!(error.kind(), ErrorKind::ExternalError);
        assert!(error.message().contains("502"));
    }

    #[test]
    fn oversized_line_maps_to_serialization() {
        let error: crate::Error = Error::Lines(LinesCodecError::MaxLineLengthExceeded).into();
        assert_eq!(error.kind(), ErrorKind::Serialization);
    }
}
