use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{ensure_web_url, RenderError, Renderer};

/// Fetches the HTML as served, without executing scripts.
///
/// Useful for server-rendered sites and for hosts without a browser.
pub struct HttpRenderer {
    client: Client,
    timeout: Duration,
}

impl HttpRenderer {
    pub fn new(timeout: Duration) -> Result<Self, RenderError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("prerender-shortener/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RenderError::Http(e.to_string()))?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let url = ensure_web_url(url)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RenderError::Timeout(self.timeout)
            } else {
                RenderError::Http(e.to_string())
            }
        })?;

        let response = response
            .error_for_status()
            .map_err(|e| RenderError::Http(e.to_string()))?;

        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                RenderError::Timeout(self.timeout)
            } else {
                RenderError::Http(e.to_string())
            }
        })?;

        if html.trim().is_empty() {
            return Err(RenderError::Empty);
        }
        Ok(html)
    }
}
