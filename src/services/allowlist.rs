use url::Url;

use crate::error::{AppError, AppResult};

/// Validates target URLs and restricts them to allowed hostnames
pub struct DomainPolicy;

impl DomainPolicy {
    /// Parse `raw` as an absolute http(s) URL
    pub fn parse_target(raw: &str) -> AppResult<Url> {
        let url = Url::parse(raw.trim())
            .map_err(|e| AppError::Validation(format!("Invalid URL format: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "Unsupported URL scheme '{}'",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(AppError::Validation("URL has no host".to_string()));
        }

        Ok(url)
    }

    /// Reject hosts outside `allowed`. An empty list allows every host.
    pub fn ensure_allowed(url: &Url, allowed: &[String]) -> AppResult<()> {
        if allowed.is_empty() {
            return Ok(());
        }

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if allowed.iter().any(|d| *d == host) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Domain '{}' is not allowed for shortening.",
                host
            )))
        }
    }
}
