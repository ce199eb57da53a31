//! Gist authoring: create, read, update, delete.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use gisthub_auth::policy::Action;
use gisthub_cache::keys;
use gisthub_core::config::GistConfig;
use gisthub_core::error::AppError;
use gisthub_core::traits::cache::CacheProvider;
use gisthub_entity::gist::{CreateGist, GistDetail, UpdateGist};

use super::input::GistInput;
use super::reader::GistReader;
use crate::context::RequestContext;

/// Creates and edits gists owned by the caller.
#[derive(Debug, Clone)]
pub struct GistService {
    reader: GistReader,
    cache: Arc<dyn CacheProvider>,
    config: GistConfig,
}

impl GistService {
    /// Creates a new gist service.
    pub fn new(reader: GistReader, cache: Arc<dyn CacheProvider>, config: GistConfig) -> Self {
        Self {
            reader,
            cache,
            config,
        }
    }

    /// Creates a gist together with its first version.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: GistInput,
    ) -> Result<GistDetail, AppError> {
        let input = input.validated(&self.config)?;

        let (gist, _) = self
            .reader
            .store()
            .create(&CreateGist {
                user_id: ctx.user_id,
                title: input.title,
                body: input.body,
                language: input.language,
                is_public: input.is_public,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            gist_id = %gist.id,
            language = %gist.language,
            is_public = gist.is_public,
            "Gist created"
        );

        self.reader.detail(gist, Some(ctx.user_id)).await
    }

    /// The owner's view of a gist.
    pub async fn get_owned(
        &self,
        ctx: &RequestContext,
        gist_id: Uuid,
    ) -> Result<GistDetail, AppError> {
        let principal = ctx.principal();
        let gist = self
            .reader
            .load(Some(&principal), gist_id, Action::ReadOwnedGist)
            .await?;
        self.reader.detail(gist, Some(ctx.user_id)).await
    }

    /// Anyone's view of a public gist. `viewer` only feeds the favorite flag.
    pub async fn get_public(
        &self,
        gist_id: Uuid,
        viewer: Option<&RequestContext>,
    ) -> Result<GistDetail, AppError> {
        let gist = self
            .reader
            .load(None, gist_id, Action::ReadPublicGist)
            .await?;
        self.reader.detail(gist, viewer.map(|ctx| ctx.user_id)).await
    }

    /// Updates metadata in place and appends the body as a new version.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        gist_id: Uuid,
        input: GistInput,
    ) -> Result<GistDetail, AppError> {
        let principal = ctx.principal();
        self.reader
            .load(Some(&principal), gist_id, Action::UpdateGist)
            .await?;
        let input = input.validated(&self.config)?;

        let (gist, version) = self
            .reader
            .store()
            .update_with_version(&UpdateGist {
                id: gist_id,
                title: input.title,
                body: input.body,
                language: input.language,
                is_public: input.is_public,
            })
            .await?;

        self.invalidate_preview(gist_id).await;

        info!(
            user_id = %ctx.user_id,
            gist_id = %gist_id,
            version = version.version,
            "Gist updated"
        );

        self.reader.detail(gist, Some(ctx.user_id)).await
    }

    /// Deletes a gist with all of its versions and favorites.
    pub async fn delete(&self, ctx: &RequestContext, gist_id: Uuid) -> Result<(), AppError> {
        let principal = ctx.principal();
        self.reader
            .load(Some(&principal), gist_id, Action::DeleteGist)
            .await?;

        if !self.reader.store().delete(gist_id).await? {
            return Err(self.reader.policy().missing(Action::DeleteGist));
        }

        self.invalidate_preview(gist_id).await;

        info!(user_id = %ctx.user_id, gist_id = %gist_id, "Gist deleted");
        Ok(())
    }

    async fn invalidate_preview(&self, gist_id: Uuid) {
        if let Err(e) = self.cache.delete(&keys::og_image(gist_id)).await {
            warn!(gist_id = %gist_id, error = %e, "Failed to evict cached preview image");
        }
    }
}
