use thiserror::Error;

/// Lookup failures against the static endpoint catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown category: {0}")]
    CategoryNotFound(String),
    #[error("unknown resource '{resource}' in category '{category}'")]
    ResourceNotFound { category: String, resource: String },
    #[error("no catalog resource serves path {0}")]
    PathNotFound(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("both the API key and the account token are required")]
    MissingCredentials,
}

/// Failures of a single API call. Nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}")]
    Http { status: u16, body: String },
    #[error("response body is not valid JSON: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "TransportError",
            ApiError::Http { .. } => "HttpError",
            ApiError::Decode { .. } => "DecodeError",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Decode { .. } => None,
        }
    }

    /// Raw response text, when the server sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Transport(_) => None,
            ApiError::Http { body, .. } | ApiError::Decode { body, .. } => Some(body),
        }
    }
}
