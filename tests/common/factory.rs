use prerender_shortener::models::{CreateLink, Link, RenderStatus};
use prerender_shortener::repositories::LinkStore;
use prerender_shortener::services::ShortCodeService;
use prerender_shortener::state::AppState;

/// Factory for creating test data
pub struct Factory<'a> {
    state: &'a AppState,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Create a pending link for `url`
    pub async fn create_link(&self, url: &str) -> Link {
        let input = CreateLink {
            short_code: ShortCodeService::generate(),
            original_url: url.to_string(),
        };

        self.state.store.create(input).await.unwrap()
    }

    /// Create a link already in a given render state
    pub async fn create_link_with_status(
        &self,
        url: &str,
        status: RenderStatus,
        html: &str,
    ) -> Link {
        let link = self.create_link(url).await;
        self.state
            .store
            .set_content_and_status(&link.short_code, html, status)
            .await
            .unwrap();

        self.state.store.find_by_code(&link.short_code).await.unwrap()
    }
}
