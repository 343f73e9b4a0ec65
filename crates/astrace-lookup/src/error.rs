use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("lookup service returned status {status}")]
    Status { status: u16 },

    #[error("malformed lookup response: {0}")]
    Decode(#[source] serde_json::Error),
}
