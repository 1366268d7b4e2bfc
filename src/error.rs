use miette::Diagnostic;
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = FetchError> = std::result::Result<T, E>;

/// Everything that can go wrong talking to the search API or the backend.
#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("request to {url} could not be sent")]
    #[diagnostic(code(newsdesk::transport))]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    #[diagnostic(code(newsdesk::status))]
    Status { url: String, status: StatusCode },

    #[error("response from {url} could not be decoded")]
    #[diagnostic(code(newsdesk::malformed))]
    Malformed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {url} has no `{field}`")]
    #[diagnostic(code(newsdesk::missing_field))]
    MissingField { url: String, field: &'static str },

    #[error("HTTP client could not be built")]
    #[diagnostic(code(newsdesk::client))]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
