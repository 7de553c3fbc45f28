use crate::error::{AppError, AppResult};
use crate::models::{CreateLink, Link, RenderStatus};
use crate::queue::WaitOutcome;
use crate::services::{DomainPolicy, ShortCodeService};
use crate::state::AppState;

/// Attempts at finding an unused short code before giving up
const MAX_CODE_ATTEMPTS: usize = 5;

/// Outcome of a shorten request
#[derive(Debug, Clone)]
pub struct GeneratedLink {
    pub link: Link,
    /// `false` when the URL had already been shortened
    pub created: bool,
}

/// What a crawler visiting a short link receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlerView {
    Html(String),
    Redirect(String),
}

pub struct LinkService;

impl LinkService {
    /// Shorten `raw_url`, rendering it for crawlers on the way.
    ///
    /// Waits up to the render timeout for the page to be rendered, but
    /// always answers with the short code, rendered or not.
    pub async fn shorten(state: &AppState, raw_url: &str) -> AppResult<GeneratedLink> {
        let target = DomainPolicy::parse_target(raw_url)?;
        DomainPolicy::ensure_allowed(&target, &state.config.allowed_domains)?;
        let original_url = raw_url.trim();

        match state.store.find_by_url(original_url).await {
            Ok(existing) => {
                tracing::info!(
                    url = %original_url,
                    short_code = %existing.short_code,
                    status = %existing.render_status,
                    "URL already shortened"
                );
                let link = Self::settle_existing(state, existing).await;
                return Ok(GeneratedLink {
                    link,
                    created: false,
                });
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let link = Self::create_with_unique_code(state, original_url).await?;
        tracing::info!(short_code = %link.short_code, url = %link.original_url, "Saved link (status: pending)");

        state
            .render_queue
            .submit(&link.short_code, &link.original_url)
            .await;
        let link = Self::await_render(state, link, state.config.render_timeout()).await;

        Ok(GeneratedLink {
            link,
            created: true,
        })
    }

    /// Decide what a crawler gets for `link`
    pub async fn crawler_view(state: &AppState, link: Link) -> CrawlerView {
        match link.render_status {
            RenderStatus::Completed => match link.servable_html() {
                Some(html) => CrawlerView::Html(html.to_string()),
                None => {
                    tracing::warn!(
                        short_code = %link.short_code,
                        "Completed link has no rendered content, redirecting"
                    );
                    CrawlerView::Redirect(link.original_url)
                }
            },
            RenderStatus::Pending | RenderStatus::Rendering => {
                // A pending row nobody is working on (dropped job, restart) gets picked up again
                if !state.render_queue.is_in_flight(&link.original_url).await {
                    state
                        .render_queue
                        .submit(&link.short_code, &link.original_url)
                        .await;
                }

                let link = Self::await_render(state, link, state.config.bot_wait()).await;
                match link.servable_html() {
                    Some(html) => CrawlerView::Html(html.to_string()),
                    None => {
                        tracing::info!(
                            short_code = %link.short_code,
                            status = %link.render_status,
                            "Rendering not ready for crawler, redirecting"
                        );
                        CrawlerView::Redirect(link.original_url)
                    }
                }
            }
            RenderStatus::Failed => CrawlerView::Redirect(link.original_url),
        }
    }

    /// Bring an already stored link up to date before answering
    async fn settle_existing(state: &AppState, existing: Link) -> Link {
        if existing.render_status.is_terminal() {
            return existing;
        }

        if !state.render_queue.is_in_flight(&existing.original_url).await {
            tracing::info!(
                url = %existing.original_url,
                "URL exists but not in render queue, re-queuing"
            );
            state
                .render_queue
                .submit(&existing.short_code, &existing.original_url)
                .await;
        }

        Self::await_render(state, existing, state.config.render_timeout()).await
    }

    /// Wait for the URL's render and re-read the row; the stale row is
    /// returned when the wait times out or the re-read fails
    async fn await_render(
        state: &AppState,
        link: Link,
        timeout: std::time::Duration,
    ) -> Link {
        let outcome = state
            .render_queue
            .wait_for_render(&link.original_url, timeout)
            .await;

        if outcome == WaitOutcome::TimedOut {
            tracing::info!(
                short_code = %link.short_code,
                timeout = ?timeout,
                "Timed out waiting for render, answering anyway"
            );
            return link;
        }

        match state.store.find_by_code(&link.short_code).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(short_code = %link.short_code, error = %e, "Failed to re-read link after render");
                link
            }
        }
    }

    async fn create_with_unique_code(state: &AppState, original_url: &str) -> AppResult<Link> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let input = CreateLink {
                short_code: ShortCodeService::generate(),
                original_url: original_url.to_string(),
            };

            match state.store.create(input).await {
                Ok(link) => return Ok(link),
                Err(AppError::Conflict(_)) => {
                    tracing::warn!(attempt, "Short code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(url = %original_url, "Max retries reached for short code generation");
        Err(AppError::Internal(
            "Failed to generate a unique short code after multiple attempts".to_string(),
        ))
    }
}
