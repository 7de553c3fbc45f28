use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::link::{self, ActiveModel, Column, Entity as LinkEntity};
use crate::error::{AppError, AppResult};
use crate::models::{CreateLink, Link, RenderStatus};
use crate::repositories::LinkStore;

/// PostgreSQL link store backed by SeaORM
#[derive(Clone)]
pub struct PgLinkStore {
    db: DatabaseConnection,
}

impl PgLinkStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model_by_code(&self, short_code: &str) -> AppResult<link::Model> {
        LinkEntity::find()
            .filter(Column::ShortCode.eq(short_code))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Link".to_string()))
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn create(&self, input: CreateLink) -> AppResult<Link> {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            short_code: Set(input.short_code),
            original_url: Set(input.original_url),
            rendered_html: Set(String::new()),
            render_status: Set(RenderStatus::Pending.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await?;
        result.try_into()
    }

    async fn find_by_code(&self, short_code: &str) -> AppResult<Link> {
        self.find_model_by_code(short_code).await?.try_into()
    }

    async fn find_by_url(&self, original_url: &str) -> AppResult<Link> {
        let model = LinkEntity::find()
            .filter(Column::OriginalUrl.eq(original_url))
            .order_by_asc(Column::CreatedAt)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Link".to_string()))?;

        model.try_into()
    }

    async fn set_status(&self, short_code: &str, status: RenderStatus) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model_by_code(short_code).await?.into();
        active.render_status = Set(status.as_str().to_string());
        active.updated_at = Set(time::OffsetDateTime::now_utc());
        active.update(&self.db).await?;
        Ok(())
    }

    async fn set_content_and_status(
        &self,
        short_code: &str,
        html: &str,
        status: RenderStatus,
    ) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model_by_code(short_code).await?.into();
        active.rendered_html = Set(html.to_string());
        active.render_status = Set(status.as_str().to_string());
        active.updated_at = Set(time::OffsetDateTime::now_utc());
        active.update(&self.db).await?;
        Ok(())
    }
}

// Conversion from SeaORM model to our domain model
impl TryFrom<link::Model> for Link {
    type Error = AppError;

    fn try_from(m: link::Model) -> Result<Self, Self::Error> {
        let render_status = m.render_status.parse().map_err(AppError::Database)?;

        Ok(Self {
            id: m.id,
            short_code: m.short_code,
            original_url: m.original_url,
            rendered_html: m.rendered_html,
            render_status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}
