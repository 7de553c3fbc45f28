pub mod browser;
pub mod http;

pub use browser::BrowserRenderer;
pub use http::HttpRenderer;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, RenderBackend};

/// Produces the HTML a crawler should see for a page.
///
/// Implementations bound their own running time and return
/// `RenderError::Timeout` instead of hanging.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("refusing to render {0}: only absolute http(s) URLs are supported")]
    InvalidUrl(String),

    #[error("rendering timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to launch browser {bin}: {reason}")]
    Launch { bin: String, reason: String },

    #[error("browser exited with {status}: {stderr}")]
    BrowserExit { status: String, stderr: String },

    #[error("fetch failed: {0}")]
    Http(String),

    #[error("renderer returned an empty document")]
    Empty,

    #[error("renderer panicked: {0}")]
    Panicked(String),
}

/// Build the renderer selected by configuration
pub fn from_config(config: &Config) -> Result<Arc<dyn Renderer>, RenderError> {
    let renderer: Arc<dyn Renderer> = match config.render_backend {
        RenderBackend::Browser => Arc::new(BrowserRenderer::new(
            config.browser_bin_path.clone(),
            config.render_timeout(),
        )),
        RenderBackend::Http => Arc::new(HttpRenderer::new(config.render_timeout())?),
    };
    Ok(renderer)
}

/// Reject anything that is not an absolute http(s) URL
pub(crate) fn ensure_web_url(url: &str) -> Result<url::Url, RenderError> {
    match url::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(parsed)
        }
        _ => Err(RenderError::InvalidUrl(url.to_string())),
    }
}
