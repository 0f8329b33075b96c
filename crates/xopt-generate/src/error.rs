use thiserror::Error;

/// Errors returned by the generative backend client.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("generator API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model reply contained no JSON object.
    #[error("no JSON object found in {context} response")]
    MissingJson { context: String },

    /// The reply carried no text content.
    #[error("generator returned an empty response")]
    EmptyResponse,

    #[error("invalid generator base URL '{0}'")]
    InvalidBaseUrl(String),

    /// No API key was configured.
    #[error("generator is not configured (ANTHROPIC_API_KEY is unset)")]
    NotConfigured,
}
