//! HTTP client for the daemon's API, used by `pialarm-cli`.

pub mod types;

use anyhow::{Context, Result};

use types::{AlarmResponse, StatusResponse};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn get_status(&self) -> Result<StatusResponse> {
        let url = format!("{}/v0/status", self.base_url);
        let response = self.http.get(&url).send().await.context("request failed")?;
        response
            .error_for_status()?
            .json()
            .await
            .context("invalid status response")
    }

    pub async fn list_alarms(&self) -> Result<Vec<AlarmResponse>> {
        let url = format!("{}/v0/alarms", self.base_url);
        let response = self.http.get(&url).send().await.context("request failed")?;
        response
            .error_for_status()?
            .json()
            .await
            .context("invalid alarms response")
    }

    pub async fn snooze(&self) -> Result<()> {
        let url = format!("{}/v0/snooze", self.base_url);
        self.http
            .post(&url)
            .send()
            .await
            .context("request failed")?
            .error_for_status()?;
        Ok(())
    }

    pub async fn dismiss(&self) -> Result<()> {
        let url = format!("{}/v0/dismiss", self.base_url);
        self.http
            .post(&url)
            .send()
            .await
            .context("request failed")?
            .error_for_status()?;
        Ok(())
    }
}
