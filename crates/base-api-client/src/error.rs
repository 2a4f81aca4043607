use reqwest::StatusCode;

/// Errors returned by [`crate::BaseClient`] requests.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} responded with {status}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "REQUEST",
            Self::Status { .. } => "STATUS",
            Self::Decode { .. } => "DECODE",
        }
    }

    /// HTTP status of the failed response, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status(),
            Self::Decode { .. } => None,
        }
    }
}
