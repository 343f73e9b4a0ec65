use crate::error::LookupError;
use astrace_model::LookupResponse;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://ipinfo.io";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub trait LookupService: Send + Sync {
    fn lookup(&self, address: &str) -> Result<LookupResponse, LookupError>;
}

// Any service answering `GET <base>/<address>/json` the way ipinfo.io does.
pub struct IpInfoClient {
    client: Client,
    base_url: String,
}

impl IpInfoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("astrace/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LookupError::Transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, address: &str) -> String {
        format!("{}/{}/json", self.base_url, address)
    }
}

impl LookupService for IpInfoClient {
    fn lookup(&self, address: &str) -> Result<LookupResponse, LookupError> {
        let url = self.url_for(address);
        debug!(%url, "looking up hop");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(LookupError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(LookupError::Transport)?;
        serde_json::from_str(&body).map_err(LookupError::Decode)
    }
}
