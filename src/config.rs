use std::env;
use std::time::Duration;

/// Which page renderer the worker pool drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderBackend {
    /// Headless browser, executes scripts before dumping the DOM
    Browser,
    /// Plain HTTP fetch of the served HTML
    Http,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Server
    pub host: String,
    pub port: u16,

    // Shortening
    /// Hostnames allowed for shortening; empty allows everything
    pub allowed_domains: Vec<String>,

    // Rendering
    pub render_worker_count: usize,
    pub render_queue_capacity: usize,
    pub render_timeout_seconds: u64,
    pub bot_wait_seconds: u64,
    pub render_backend: RenderBackend,
    pub browser_bin_path: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let render_backend = match lookup("RENDER_BACKEND").as_deref() {
            None | Some("browser") => RenderBackend::Browser,
            Some("http") => RenderBackend::Http,
            Some(_) => return Err(ConfigError::Invalid("RENDER_BACKEND")),
        };

        let render_worker_count: usize = parse_or(&lookup, "RENDER_WORKER_COUNT", 3)?;
        if render_worker_count == 0 {
            return Err(ConfigError::Invalid("RENDER_WORKER_COUNT"));
        }
        let render_queue_capacity: usize = parse_or(&lookup, "RENDER_QUEUE_CAPACITY", 100)?;
        if render_queue_capacity == 0 {
            return Err(ConfigError::Invalid("RENDER_QUEUE_CAPACITY"));
        }

        Ok(Self {
            // Database
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,

            // Server
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,

            // Shortening
            allowed_domains: lookup("ALLOWED_DOMAINS")
                .map(|raw| parse_domain_list(&raw))
                .unwrap_or_default(),

            // Rendering
            render_worker_count,
            render_queue_capacity,
            render_timeout_seconds: parse_or(&lookup, "RENDER_TIMEOUT_SECONDS", 90)?,
            bot_wait_seconds: parse_or(&lookup, "BOT_WAIT_SECONDS", 5)?,
            render_backend,
            browser_bin_path: lookup("BROWSER_BIN_PATH")
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "chromium".to_string()),
        })
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_seconds)
    }

    pub fn bot_wait(&self) -> Duration {
        Duration::from_secs(self.bot_wait_seconds)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Mask the password of a connection URL before it reaches the logs
pub fn redact_database_url(database_url: &str) -> String {
    match url::Url::parse(database_url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            // set_password only fails for cannot-be-a-base URLs, which carry no password
            let _ = parsed.set_password(Some("********"));
            parsed.to_string()
        }
        _ => database_url.to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/db")]))
                .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.render_worker_count, 3);
        assert_eq!(config.render_queue_capacity, 100);
        assert_eq!(config.render_timeout(), Duration::from_secs(90));
        assert_eq!(config.bot_wait(), Duration::from_secs(5));
        assert_eq!(config.render_backend, RenderBackend::Browser);
        assert_eq!(config.browser_bin_path, "chromium");
        assert!(config.allowed_domains.is_empty());
    }

    #[test]
    fn test_missing_database_url() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_invalid_worker_count() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("RENDER_WORKER_COUNT", "not_a_number"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid("RENDER_WORKER_COUNT"))
        ));

        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("RENDER_WORKER_COUNT", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_allowed_domains_are_trimmed() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("ALLOWED_DOMAINS", " example.com, Docs.Example.com ,,"),
            ("RENDER_BACKEND", "http"),
        ]))
        .unwrap();

        assert_eq!(
            config.allowed_domains,
            vec!["example.com".to_string(), "docs.example.com".to_string()]
        );
        assert_eq!(config.render_backend, RenderBackend::Http);
    }

    #[test]
    fn test_redact_database_url() {
        assert_eq!(
            redact_database_url("postgres://user:secret@db:5432/links"),
            "postgres://user:********@db:5432/links"
        );
        assert_eq!(
            redact_database_url("postgres://db:5432/links"),
            "postgres://db:5432/links"
        );
    }
}
