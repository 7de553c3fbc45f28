use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::models::Link;
use crate::services::{CrawlerDetector, CrawlerView, LinkService};
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Absolute http(s) URL to shorten
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub short_code: String,
    pub original_url: String,
}

impl From<Link> for GenerateResponse {
    fn from(link: Link) -> Self {
        Self {
            short_code: link.short_code,
            original_url: link.original_url,
        }
    }
}

// ============ Handlers ============

/// Shorten a URL and pre-render it for crawlers
#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateRequest,
    responses(
        (status = 201, description = "Short link created", body = GenerateResponse),
        (status = 200, description = "URL was already shortened", body = GenerateResponse),
        (status = 400, description = "Invalid request body or URL"),
        (status = 403, description = "Domain not allowed")
    ),
    tag = "Links"
)]
pub async fn generate_short_code(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<GenerateResponse>)> {
    let Json(payload) = payload?;

    let generated = LinkService::shorten(&state, &payload.url).await?;
    let status = if generated.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(generated.link.into())))
}

/// Follow a short link.
///
/// Browsers are redirected to the original URL; crawlers get the
/// pre-rendered HTML when it is available.
#[utoipa::path(
    get,
    path = "/{short_code}",
    params(
        ("short_code" = String, Path, description = "Short code")
    ),
    responses(
        (status = 302, description = "Redirect to the original URL"),
        (status = 200, description = "Pre-rendered HTML for crawlers", body = String, content_type = "text/html"),
        (status = 404, description = "Short code not found")
    ),
    tag = "Links"
)]
pub async fn redirect(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let link = state.store.find_by_code(&short_code).await?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !CrawlerDetector::is_crawler(user_agent) {
        tracing::info!(short_code = %short_code, to = %link.original_url, "Redirecting user");
        return Ok(found(link.original_url));
    }

    tracing::info!(
        short_code = %short_code,
        user_agent = %user_agent,
        status = %link.render_status,
        "Crawler request"
    );

    Ok(match LinkService::crawler_view(&state, link).await {
        CrawlerView::Html(html) => Html(html).into_response(),
        CrawlerView::Redirect(url) => found(url),
    })
}

/// 302 Found pointing at `location`
fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
