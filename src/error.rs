pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("failed to list pages in space '{space}': {source}")]
    ListingFailed {
        space: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn listing_failed(space: &str, source: Error) -> Self {
        Self::ListingFailed {
            space: space.to_string(),
            source: Box::new(source),
        }
    }
}
