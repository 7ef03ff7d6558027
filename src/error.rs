#[derive(Debug, thiserror::Error)]
pub enum CrawlerError {
    #[error("Database error")]
    DatabaseError(#[from] sqlx::error::Error),

    #[error("Failed to fetch {url} after {attempts} attempt(s)")]
    Fetch {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid url")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Keywords must not be empty")]
    EmptyKeyword,

    #[error("Failed to write export")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize export")]
    Serialize(#[from] serde_json::Error),
}
