//! Favorite toggling.

use tracing::info;
use uuid::Uuid;

use gisthub_auth::policy::Action;
use gisthub_core::error::AppError;

use super::reader::GistReader;
use crate::context::RequestContext;

/// Maintains the caller's favorite set.
#[derive(Debug, Clone)]
pub struct FavoriteService {
    reader: GistReader,
}

impl FavoriteService {
    /// Creates a new favorite service.
    pub fn new(reader: GistReader) -> Self {
        Self { reader }
    }

    /// Flips the favorite flag. Returns `true` when the gist is now a favorite.
    pub async fn toggle(&self, ctx: &RequestContext, gist_id: Uuid) -> Result<bool, AppError> {
        let principal = ctx.principal();
        self.reader
            .load(Some(&principal), gist_id, Action::FavoriteGist)
            .await?;

        let is_favorite = self
            .reader
            .store()
            .toggle_favorite(ctx.user_id, gist_id)
            .await?;

        info!(user_id = %ctx.user_id, gist_id = %gist_id, is_favorite, "Favorite toggled");
        Ok(is_favorite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gist::GistInput;
    use crate::testing::Fixture;
    use gisthub_core::ErrorKind;
    use gisthub_entity::gist::Language;

    fn input(is_public: bool) -> GistInput {
        GistInput {
            title: "Query".into(),
            body: "SELECT 1".into(),
            language: Language::Sql,
            is_public,
        }
    }

    #[tokio::test]
    async fn test_toggle_is_self_inverse() {
        let fx = Fixture::new();
        let alice = fx.member("alice@example.com").await;
        let bob = fx.member("bob@example.com").await;
        let gist = fx.gist_service().create(&alice, input(true)).await.unwrap();
        let favorites = fx.favorite_service();

        assert!(favorites.toggle(&bob, gist.gist.id).await.unwrap());
        let seen = fx.gist_service().get_public(gist.gist.id, Some(&bob)).await.unwrap();
        assert!(seen.is_favorite);

        assert!(!favorites.toggle(&bob, gist.gist.id).await.unwrap());
        let seen = fx.gist_service().get_public(gist.gist.id, Some(&bob)).await.unwrap();
        assert!(!seen.is_favorite);
    }

    #[tokio::test]
    async fn test_stranger_cannot_favorite_private_gist() {
        let fx = Fixture::new();
        let alice = fx.member("alice@example.com").await;
        let bob = fx.member("bob@example.com").await;
        let gist = fx.gist_service().create(&alice, input(false)).await.unwrap();
        let favorites = fx.favorite_service();

        let err = favorites.toggle(&bob, gist.gist.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(
            !fx.stores
                .gists
                .is_favorite(bob.user_id, gist.gist.id)
                .await
                .unwrap()
        );

        assert!(favorites.toggle(&alice, gist.gist.id).await.unwrap());
    }
}
