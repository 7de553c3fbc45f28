use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CreateLink, Link, RenderStatus};
use crate::repositories::LinkStore;

/// In-memory link store for tests and database-less runs
#[derive(Clone, Default)]
pub struct InMemoryLinkStore {
    links: Arc<Mutex<HashMap<String, Link>>>,
}

impl InMemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links
    pub async fn len(&self) -> usize {
        self.links.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.links.lock().await.is_empty()
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn create(&self, input: CreateLink) -> AppResult<Link> {
        let mut links = self.links.lock().await;
        if links.contains_key(&input.short_code) {
            return Err(AppError::Conflict(format!(
                "Short code {}",
                input.short_code
            )));
        }

        let now = time::OffsetDateTime::now_utc();
        let link = Link {
            id: Uuid::new_v4(),
            short_code: input.short_code,
            original_url: input.original_url,
            rendered_html: String::new(),
            render_status: RenderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        links.insert(link.short_code.clone(), link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, short_code: &str) -> AppResult<Link> {
        let links = self.links.lock().await;
        links
            .get(short_code)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Link".to_string()))
    }

    async fn find_by_url(&self, original_url: &str) -> AppResult<Link> {
        let links = self.links.lock().await;
        links
            .values()
            .filter(|l| l.original_url == original_url)
            .min_by_key(|l| l.created_at)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Link".to_string()))
    }

    async fn set_status(&self, short_code: &str, status: RenderStatus) -> AppResult<()> {
        let mut links = self.links.lock().await;
        let link = links
            .get_mut(short_code)
            .ok_or_else(|| AppError::NotFound("Link".to_string()))?;
        link.render_status = status;
        link.updated_at = time::OffsetDateTime::now_utc();
        Ok(())
    }

    async fn set_content_and_status(
        &self,
        short_code: &str,
        html: &str,
        status: RenderStatus,
    ) -> AppResult<()> {
        let mut links = self.links.lock().await;
        let link = links
            .get_mut(short_code)
            .ok_or_else(|| AppError::NotFound("Link".to_string()))?;
        link.rendered_html = html.to_string();
        link.render_status = status;
        link.updated_at = time::OffsetDateTime::now_utc();
        Ok(())
    }
}
