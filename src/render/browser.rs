use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

use super::{ensure_web_url, RenderError, Renderer};

/// Virtual time granted to page scripts before the DOM is dumped
const SCRIPT_BUDGET: Duration = Duration::from_secs(10);

/// Renders pages with a headless Chromium-family browser.
///
/// Each render launches a fresh browser process that loads the page, lets
/// scripts run for a virtual time budget and prints the resulting DOM. The
/// process is killed if the render timeout elapses first.
pub struct BrowserRenderer {
    bin_path: String,
    timeout: Duration,
}

impl BrowserRenderer {
    pub fn new(bin_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bin_path: bin_path.into(),
            timeout,
        }
    }

    fn command(&self, url: &str) -> Command {
        let budget = SCRIPT_BUDGET.min(self.timeout);
        let mut cmd = Command::new(&self.bin_path);
        cmd.arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-first-run")
            .arg("--hide-scrollbars")
            .arg("--mute-audio")
            .arg(format!("--virtual-time-budget={}", budget.as_millis()))
            .arg("--dump-dom")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Renderer for BrowserRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let url = ensure_web_url(url)?;
        let started = Instant::now();

        let child = self
            .command(url.as_str())
            .spawn()
            .map_err(|e| RenderError::Launch {
                bin: self.bin_path.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(url = %url, bin = %self.bin_path, "Browser launched");

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(RenderError::Launch {
                    bin: self.bin_path.clone(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(url = %url, timeout = ?self.timeout, "Browser render timed out");
                return Err(RenderError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::BrowserExit {
                status: output.status.to_string(),
                stderr: stderr.lines().last().unwrap_or_default().to_string(),
            });
        }

        let html = String::from_utf8_lossy(&output.stdout).into_owned();
        if html.trim().is_empty() {
            return Err(RenderError::Empty);
        }

        tracing::debug!(
            url = %url,
            bytes = html.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Browser render finished"
        );
        Ok(html)
    }
}
