//! In-process store used for development (`database.url = "memory://"`)
//! and tests.
//!
//! All state sits behind one `RwLock`; every trait method holds the write
//! lock for its whole duration, so multi-row operations are atomic.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use gisthub_core::error::AppError;
use gisthub_core::result::AppResult;
use gisthub_core::types::pagination::{PageRequest, PageResponse};
use gisthub_entity::gist::{
    AdminGistFilter, CreateGist, Gist, GistFilter, GistListing, GistVersion, UpdateGist,
};
use gisthub_entity::user::{CreateUser, OwnerSummary, User, UserRole};

use crate::store::{GistStore, UserStore};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    gists: HashMap<Uuid, Gist>,
    /// Versions per gist, ascending by number.
    versions: HashMap<Uuid, Vec<GistVersion>>,
    favorites: HashSet<(Uuid, Uuid)>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing wall-clock timestamps so recency ordering is total.
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn push_version(&mut self, gist_id: Uuid, body: &str) -> GistVersion {
        let now = self.now();
        let history = self.versions.entry(gist_id).or_default();
        let number = history.last().map(|v| v.version).unwrap_or(0) + 1;
        let version = GistVersion {
            id: Uuid::now_v7(),
            gist_id,
            version: number,
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        };
        history.push(version.clone());
        version
    }

    fn insert_gist(
        &mut self,
        user_id: Uuid,
        title: &str,
        language: gisthub_entity::gist::Language,
        is_public: bool,
        forked_from_id: Option<Uuid>,
    ) -> Gist {
        let now = self.now();
        let gist = Gist {
            id: Uuid::now_v7(),
            user_id,
            title: title.to_string(),
            language,
            is_public,
            forked_from_id,
            forks_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.gists.insert(gist.id, gist.clone());
        gist
    }

    fn listing(&self, gist: &Gist, viewer: Option<Uuid>) -> GistListing {
        let history = self.versions.get(&gist.id);
        let owner = self
            .users
            .get(&gist.user_id)
            .map(OwnerSummary::from)
            .unwrap_or_else(|| OwnerSummary {
                id: gist.user_id,
                name: String::new(),
            });
        GistListing {
            gist: gist.clone(),
            latest_version: history.and_then(|h| h.last().cloned()),
            version_count: history.map(|h| h.len() as i64).unwrap_or(0),
            is_favorite: viewer.is_some_and(|v| self.favorites.contains(&(v, gist.id))),
            owner,
        }
    }

    fn matches_search(&self, gist: &Gist, needle: &str, include_bodies: bool) -> bool {
        if gist.title.to_lowercase().contains(needle) {
            return true;
        }
        include_bodies
            && self
                .versions
                .get(&gist.id)
                .is_some_and(|h| h.iter().any(|v| v.body.to_lowercase().contains(needle)))
    }

    /// Sort newest first and cut one page.
    fn page(
        &self,
        mut gists: Vec<&Gist>,
        viewer: Option<Uuid>,
        page: &PageRequest,
    ) -> PageResponse<GistListing> {
        sort_recent_first(&mut gists);
        let total = gists.len() as u64;
        let items = gists
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|g| self.listing(g, viewer))
            .collect();
        PageResponse::new(items, page.page, page.page_size, total)
    }
}

fn sort_recent_first(gists: &mut [&Gist]) {
    gists.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
}

fn normalized_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// Store keeping every row in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        let email = data.email.to_lowercase();
        if state.users.values().any(|u| u.email.to_lowercase() == email) {
            return Err(AppError::conflict("A user with this email already exists"));
        }
        let now = state.now();
        let user = User {
            id: Uuid::now_v7(),
            email: data.email.clone(),
            display_name: data.display_name.clone(),
            password_hash: data.password_hash.clone(),
            provider: None,
            provider_account_id: None,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_display_name(&self, id: Uuid, display_name: &str) -> AppResult<User> {
        let mut state = self.state.write().await;
        let now = state.now();
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        user.display_name = Some(display_name.to_string());
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        let now = state.now();
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        user.password_hash = Some(password_hash.to_string());
        user.updated_at = now;
        Ok(())
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut state = self.state.write().await;
        let now = state.now();
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        user.role = role;
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl GistStore for MemoryStore {
    async fn create(&self, data: &CreateGist) -> AppResult<(Gist, GistVersion)> {
        let mut state = self.state.write().await;
        let gist = state.insert_gist(data.user_id, &data.title, data.language, data.is_public, None);
        let version = state.push_version(gist.id, &data.body);
        Ok((gist, version))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Gist>> {
        Ok(self.state.read().await.gists.get(&id).cloned())
    }

    async fn find_versions(&self, gist_id: Uuid) -> AppResult<Vec<GistVersion>> {
        let state = self.state.read().await;
        Ok(state
            .versions
            .get(&gist_id)
            .map(|h| h.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_version(&self, gist_id: Uuid, version: i32) -> AppResult<Option<GistVersion>> {
        let state = self.state.read().await;
        Ok(state
            .versions
            .get(&gist_id)
            .and_then(|h| h.iter().find(|v| v.version == version).cloned()))
    }

    async fn find_latest_version(&self, gist_id: Uuid) -> AppResult<Option<GistVersion>> {
        let state = self.state.read().await;
        Ok(state.versions.get(&gist_id).and_then(|h| h.last().cloned()))
    }

    async fn update_with_version(&self, data: &UpdateGist) -> AppResult<(Gist, GistVersion)> {
        let mut state = self.state.write().await;
        let now = state.now();
        let gist = {
            let gist = state
                .gists
                .get_mut(&data.id)
                .ok_or_else(|| AppError::not_found("Gist not found"))?;
            gist.title = data.title.clone();
            gist.language = data.language;
            gist.is_public = data.is_public;
            gist.updated_at = now;
            gist.clone()
        };
        let version = state.push_version(gist.id, &data.body);
        Ok((gist, version))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        state.versions.remove(&id);
        state.favorites.retain(|(_, gist_id)| *gist_id != id);
        let existed = state.gists.remove(&id).is_some();
        for gist in state.gists.values_mut() {
            if gist.forked_from_id == Some(id) {
                gist.forked_from_id = None;
            }
        }
        Ok(existed)
    }

    async fn fork(&self, source_id: Uuid, owner_id: Uuid) -> AppResult<Option<(Gist, GistVersion)>> {
        let mut state = self.state.write().await;
        let Some(source) = state.gists.get(&source_id).filter(|g| g.is_public).cloned() else {
            return Ok(None);
        };
        let body = state
            .versions
            .get(&source_id)
            .and_then(|h| h.last())
            .map(|v| v.body.clone())
            .unwrap_or_default();

        let fork = state.insert_gist(
            owner_id,
            &source.title,
            source.language,
            source.is_public,
            Some(source.id),
        );
        let version = state.push_version(fork.id, &body);
        if let Some(source) = state.gists.get_mut(&source_id) {
            source.forks_count += 1;
        }
        Ok(Some((fork, version)))
    }

    async fn toggle_favorite(&self, user_id: Uuid, gist_id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.favorites.remove(&(user_id, gist_id)) {
            return Ok(false);
        }
        state.favorites.insert((user_id, gist_id));
        Ok(true)
    }

    async fn is_favorite(&self, user_id: Uuid, gist_id: Uuid) -> AppResult<bool> {
        Ok(self.state.read().await.favorites.contains(&(user_id, gist_id)))
    }

    async fn list_owned(
        &self,
        owner_id: Uuid,
        filter: &GistFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<GistListing>> {
        let state = self.state.read().await;
        let needle = normalized_search(filter.search.as_deref());
        let gists: Vec<&Gist> = state
            .gists
            .values()
            .filter(|g| g.user_id == owner_id)
            .filter(|g| needle.as_deref().is_none_or(|n| state.matches_search(g, n, true)))
            .filter(|g| filter.language.is_none_or(|l| g.language == l))
            .filter(|g| filter.is_public.is_none_or(|p| g.is_public == p))
            .filter(|g| !filter.favorites_only || state.favorites.contains(&(owner_id, g.id)))
            .collect();
        Ok(state.page(gists, Some(owner_id), page))
    }

    async fn list_public(&self, limit: u64) -> AppResult<Vec<GistListing>> {
        let state = self.state.read().await;
        let mut gists: Vec<&Gist> = state.gists.values().filter(|g| g.is_public).collect();
        sort_recent_first(&mut gists);
        Ok(gists
            .into_iter()
            .take(limit as usize)
            .map(|g| state.listing(g, None))
            .collect())
    }

    async fn list_all(
        &self,
        filter: &AdminGistFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<GistListing>> {
        let state = self.state.read().await;
        let needle = normalized_search(filter.search.as_deref());
        let gists: Vec<&Gist> = state
            .gists
            .values()
            .filter(|g| needle.as_deref().is_none_or(|n| state.matches_search(g, n, false)))
            .filter(|g| filter.user_id.is_none_or(|u| g.user_id == u))
            .collect();
        Ok(state.page(gists, None, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gisthub_entity::gist::Language;

    async fn seed_user(store: &MemoryStore, email: &str) -> User {
        UserStore::create(
            store,
            &CreateUser {
                email: email.to_string(),
                password_hash: None,
                display_name: None,
                role: UserRole::Member,
            },
        )
        .await
        .unwrap()
    }

    fn new_gist(user_id: Uuid, title: &str, body: &str, is_public: bool) -> CreateGist {
        CreateGist {
            user_id,
            title: title.to_string(),
            body: body.to_string(),
            language: Language::Python,
            is_public,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        seed_user(&store, "a@example.com").await;
        let err = UserStore::create(
            &store,
            &CreateUser {
                email: "A@example.com".into(),
                password_hash: None,
                display_name: None,
                role: UserRole::Member,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, gisthub_core::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_versions_are_contiguous() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@example.com").await;
        let (gist, v1) = GistStore::create(&store, &new_gist(user.id, "T", "X", false))
            .await
            .unwrap();
        assert_eq!(v1.version, 1);

        for body in ["Y", "Z"] {
            store
                .update_with_version(&UpdateGist {
                    id: gist.id,
                    title: "T".into(),
                    body: body.into(),
                    language: Language::Python,
                    is_public: false,
                })
                .await
                .unwrap();
        }

        let numbers: Vec<i32> = store
            .find_versions(gist.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(numbers, vec![3, 2, 1]);
        assert_eq!(store.find_version(gist.id, 1).await.unwrap().unwrap().body, "X");
    }

    #[tokio::test]
    async fn test_delete_clears_lineage_and_favorites() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let (source, _) = GistStore::create(&store, &new_gist(alice.id, "S", "body", true))
            .await
            .unwrap();
        let (fork, _) = store.fork(source.id, bob.id).await.unwrap().unwrap();
        store.toggle_favorite(bob.id, source.id).await.unwrap();

        assert!(GistStore::delete(&store, source.id).await.unwrap());
        assert!(!store.is_favorite(bob.id, source.id).await.unwrap());
        let fork = GistStore::find_by_id(&store, fork.id).await.unwrap().unwrap();
        assert_eq!(fork.forked_from_id, None);
        assert!(!GistStore::delete(&store, source.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_listing_order_and_search() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@example.com").await;
        let (first, _) = GistStore::create(&store, &new_gist(user.id, "First", "alpha", true))
            .await
            .unwrap();
        GistStore::create(&store, &new_gist(user.id, "Second", "beta", false))
            .await
            .unwrap();
        store
            .update_with_version(&UpdateGist {
                id: first.id,
                title: "First".into(),
                body: "gamma".into(),
                language: Language::Python,
                is_public: true,
            })
            .await
            .unwrap();

        let page = store
            .list_owned(user.id, &GistFilter::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items[0].gist.id, first.id);
        assert_eq!(page.items[0].version_count, 2);

        // Old revision bodies are searchable too.
        let filter = GistFilter {
            search: Some("ALPHA".into()),
            ..Default::default()
        };
        let page = store
            .list_owned(user.id, &filter, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);

        let public = store.list_public(10).await.unwrap();
        assert_eq!(public.len(), 1);
        assert!(public.iter().all(|l| l.gist.is_public));
    }
}
