use std::time::Duration;

use reqwest::blocking::Client;
use scraper::Html;
use tracing::debug;

use crate::error::FetchError;
use crate::settings::Settings;

/// Anything that can turn a site-relative path into a parsed document.
pub trait PageSource {
    fn fetch(&self, path: &str) -> Result<Html, FetchError>;
}

/// Blocking HTTP source. One request per call, no retries.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(settings: &Settings) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(HttpSource {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, path: &str) -> Result<Html, FetchError> {
        let url = self.url_for(path);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| classify(&url, e))?;
        Ok(Html::parse_document(&body))
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
