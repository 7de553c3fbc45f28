pub mod link;
pub mod memory;

pub use link::PgLinkStore;
pub use memory::InMemoryLinkStore;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{CreateLink, Link, RenderStatus};

/// Persistence of short links and their render state.
///
/// Render workers call this concurrently for different short codes, so every
/// update is scoped to a single row. Lookups report a missing row as
/// `AppError::NotFound`, never as a database error.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Insert a new link in the pending state
    async fn create(&self, input: CreateLink) -> AppResult<Link>;

    /// Find link by short code
    async fn find_by_code(&self, short_code: &str) -> AppResult<Link>;

    /// Find the oldest link pointing at `original_url`
    async fn find_by_url(&self, original_url: &str) -> AppResult<Link>;

    /// Update render status only
    async fn set_status(&self, short_code: &str, status: RenderStatus) -> AppResult<()>;

    /// Store rendered HTML together with its final status
    async fn set_content_and_status(
        &self,
        short_code: &str,
        html: &str,
        status: RenderStatus,
    ) -> AppResult<()>;
}
