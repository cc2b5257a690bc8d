use thiserror::Error;

/// Errors returned by the remote social API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429: the API asked us to slow down.
    #[error("rate limited on {url}")]
    RateLimited { url: String },

    /// HTTP 5xx: intermittent server-side failure.
    #[error("server error {status} from {url}")]
    ServerError { status: u16, url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("user not found: {username}")]
    UserNotFound { username: String },

    #[error("account {username} is private")]
    PrivateAccount { username: String },

    /// The API answered `"status": "fail"` with a message.
    #[error("API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// Transient failures persisted through every retry.
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ApiError>,
    },
}
