use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid prediction endpoint '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("prediction request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("prediction response was not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
}
