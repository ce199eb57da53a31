//! Forking public gists.

use tracing::info;
use uuid::Uuid;

use gisthub_auth::policy::Action;
use gisthub_core::error::AppError;
use gisthub_entity::gist::GistDetail;

use super::reader::GistReader;
use crate::context::RequestContext;

/// Copies a public gist into the caller's account.
#[derive(Debug, Clone)]
pub struct ForkService {
    reader: GistReader,
}

impl ForkService {
    /// Creates a new fork service.
    pub fn new(reader: GistReader) -> Self {
        Self { reader }
    }

    /// Forks `source_id` for the caller.
    ///
    /// The new gist copies title, language, and visibility, starts at
    /// version 1 with the source's latest body, and points back at the
    /// source. The source's fork counter is bumped in the same write.
    pub async fn fork(
        &self,
        ctx: &RequestContext,
        source_id: Uuid,
    ) -> Result<GistDetail, AppError> {
        let principal = ctx.principal();
        self.reader
            .load(Some(&principal), source_id, Action::ForkGist)
            .await?;

        // Visibility is re-checked inside the store transaction.
        let (fork, _) = self
            .reader
            .store()
            .fork(source_id, ctx.user_id)
            .await?
            .ok_or_else(|| self.reader.policy().missing(Action::ForkGist))?;

        info!(
            user_id = %ctx.user_id,
            source_id = %source_id,
            gist_id = %fork.id,
            "Gist forked"
        );

        self.reader.detail(fork, Some(ctx.user_id)).await
    }
}
