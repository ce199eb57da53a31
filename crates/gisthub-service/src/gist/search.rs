//! Filtered gist listings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use gisthub_core::config::GistConfig;
use gisthub_core::error::AppError;
use gisthub_core::types::pagination::{PageRequest, PageResponse};
use gisthub_database::store::GistStore;
use gisthub_entity::gist::{GistFilter, GistListing, Language};

use crate::context::RequestContext;

/// Filters for the caller's own gist list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistQuery {
    /// Case-insensitive substring matched against titles and every version body.
    pub search: Option<String>,
    pub language: Option<Language>,
    pub is_public: Option<bool>,
    #[serde(default)]
    pub favorites_only: bool,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Lists gists for their owner and for the public.
#[derive(Debug, Clone)]
pub struct SearchService {
    gists: Arc<dyn GistStore>,
    config: GistConfig,
}

impl SearchService {
    /// Creates a new search service.
    pub fn new(gists: Arc<dyn GistStore>, config: GistConfig) -> Self {
        Self { gists, config }
    }

    /// The caller's gists, most recently updated first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: GistQuery,
    ) -> Result<PageResponse<GistListing>, AppError> {
        let page = PageRequest::bounded(
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(self.config.default_page_size),
            self.config.max_page_size,
        );
        let filter = GistFilter {
            search: query.search,
            language: query.language,
            is_public: query.is_public,
            favorites_only: query.favorites_only,
        };

        debug!(user_id = %ctx.user_id, ?filter, page = page.page, "Listing gists");
        self.gists.list_owned(ctx.user_id, &filter, &page).await
    }

    /// Public gists, most recently updated first, at most `take`.
    pub async fn list_public(&self, take: Option<u64>) -> Result<Vec<GistListing>, AppError> {
        let limit = take
            .unwrap_or(self.config.public_list_default)
            .clamp(1, self.config.public_list_max.max(1));
        self.gists.list_public(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gist::GistInput;
    use crate::testing::Fixture;

    fn input(title: &str, body: &str, language: Language, is_public: bool) -> GistInput {
        GistInput {
            title: title.into(),
            body: body.into(),
            language,
            is_public,
        }
    }

    #[tokio::test]
    async fn test_filters_and_scope() {
        let fx = Fixture::new();
        let alice = fx.member("alice@example.com").await;
        let bob = fx.member("bob@example.com").await;
        let gists = fx.gist_service();
        let search = fx.search_service();

        let a = gists
            .create(&alice, input("Parser", "fn parse()", Language::Rust, true))
            .await
            .unwrap();
        gists
            .create(&alice, input("Notes", "secret", Language::Python, false))
            .await
            .unwrap();
        gists
            .create(&bob, input("Bob's parser", "x", Language::Rust, true))
            .await
            .unwrap();

        let all = search.list(&alice, GistQuery::default()).await.unwrap();
        assert_eq!(all.total_items, 2);
        assert!(all.items.iter().all(|g| g.gist.user_id == alice.user_id));

        let public = search
            .list(
                &alice,
                GistQuery {
                    is_public: Some(true),
                    ..GistQuery::default()
                },
            )
            .await
            .unwrap();
        assert!(public.items.iter().all(|g| g.gist.is_public));

        let by_body = search
            .list(
                &alice,
                GistQuery {
                    search: Some("PARSE(".into()),
                    ..GistQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_body.items.len(), 1);
        assert_eq!(by_body.items[0].gist.id, a.gist.id);

        let python = search
            .list(
                &alice,
                GistQuery {
                    language: Some(Language::Python),
                    ..GistQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(python.items.len(), 1);
        assert_eq!(python.items[0].gist.title, "Notes");
    }

    #[tokio::test]
    async fn test_favorites_only_and_paging() {
        let fx = Fixture::new();
        let alice = fx.member("alice@example.com").await;
        let gists = fx.gist_service();
        let search = fx.search_service();

        let mut ids = Vec::new();
        for i in 0..5 {
            let g = gists
                .create(&alice, input(&format!("G{i}"), "", Language::Php, false))
                .await
                .unwrap();
            ids.push(g.gist.id);
        }
        fx.favorite_service().toggle(&alice, ids[1]).await.unwrap();

        let favorites = search
            .list(
                &alice,
                GistQuery {
                    favorites_only: true,
                    ..GistQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(favorites.items.len(), 1);
        assert!(favorites.items[0].is_favorite);

        let page = search
            .list(
                &alice,
                GistQuery {
                    page: Some(2),
                    per_page: Some(2),
                    ..GistQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next && page.has_previous);
        assert_eq!(page.items[0].gist.title, "G2");
    }

    #[tokio::test]
    async fn test_public_listing_excludes_private() {
        let fx = Fixture::new();
        let alice = fx.member("alice@example.com").await;
        let gists = fx.gist_service();

        gists
            .create(&alice, input("Open", "1", Language::Swift, true))
            .await
            .unwrap();
        gists
            .create(&alice, input("Closed", "2", Language::Swift, false))
            .await
            .unwrap();

        let listed = fx.search_service().list_public(None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].gist.title, "Open");
        assert_eq!(listed[0].owner.id, alice.user_id);
        assert_eq!(listed[0].latest_version.as_ref().unwrap().body, "1");
    }
}
