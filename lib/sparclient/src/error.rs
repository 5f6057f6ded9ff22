use sparbuild::{ArgumentError, UpdateError};
use sparresults::DecodeError;
use std::error::Error;
use std::io;

/// An error returned by a [`Client`](crate::Client).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SparqlError {
    /// The endpoint rejected the operation text with a `400 Bad Request`.
    #[error("The endpoint rejected the query: {0}")]
    MalformedQuery(String),
    /// The endpoint returned another `4xx` status.
    #[error("Client error {status}: {message}")]
    Client { status: u16, message: String },
    /// The endpoint returned a `5xx` status or could not be reached.
    #[error("Server error: {message}")]
    Server {
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<io::Error>,
    },
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    /// The response body does not match its media type.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Update(#[from] UpdateError),
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Error raised by a [`LocalEngine`](crate::LocalEngine).
    #[error(transparent)]
    Local(Box<dyn Error + Send + Sync>),
}

impl SparqlError {
    /// The HTTP status returned by the endpoint, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::MalformedQuery(_) => Some(400),
            Self::Client { status, .. } => Some(*status),
            Self::Server { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn from_status(status: u16, body: &[u8]) -> Self {
        let message = String::from_utf8_lossy(body).into_owned();
        match status {
            400 => Self::MalformedQuery(message),
            401..=499 => Self::Client { status, message },
            _ => Self::Server {
                status: Some(status),
                message,
                source: None,
            },
        }
    }
}

impl From<io::Error> for SparqlError {
    #[inline]
    fn from(error: io::Error) -> Self {
        Self::Server {
            status: None,
            message: error.to_string(),
            source: Some(error),
        }
    }
}
