use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Render lifecycle of a link's pre-rendered HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    /// Stored, not yet picked up by a worker
    Pending,
    /// A worker is rendering the page
    Rendering,
    /// HTML is available
    Completed,
    /// Rendering failed; crawlers get a redirect
    Failed,
}

impl RenderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Rendering => "rendering",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RenderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RenderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "rendering" => Ok(Self::Rendering),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown render status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub short_code: String,
    pub original_url: String,
    pub rendered_html: String,
    pub render_status: RenderStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Link {
    /// Pre-rendered HTML, if there is something worth serving to a crawler
    pub fn servable_html(&self) -> Option<&str> {
        (self.render_status == RenderStatus::Completed && !self.rendered_html.is_empty())
            .then_some(self.rendered_html.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLink {
    pub short_code: String,
    pub original_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_status_round_trips_through_str() {
        for status in [
            RenderStatus::Pending,
            RenderStatus::Rendering,
            RenderStatus::Completed,
            RenderStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<RenderStatus>(), Ok(status));
        }
        assert!("dead".parse::<RenderStatus>().is_err());
    }

    #[test]
    fn test_render_status_is_terminal() {
        assert!(!RenderStatus::Pending.is_terminal());
        assert!(!RenderStatus::Rendering.is_terminal());
        assert!(RenderStatus::Completed.is_terminal());
        assert!(RenderStatus::Failed.is_terminal());
    }

    #[test]
    fn test_servable_html_requires_completed_content() {
        let mut link = Link {
            id: Uuid::new_v4(),
            short_code: "ABC234".to_string(),
            original_url: "https://example.com".to_string(),
            rendered_html: String::new(),
            render_status: RenderStatus::Completed,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        assert!(link.servable_html().is_none());

        link.rendered_html = "<html></html>".to_string();
        assert_eq!(link.servable_html(), Some("<html></html>"));

        link.render_status = RenderStatus::Failed;
        assert!(link.servable_html().is_none());
    }
}
