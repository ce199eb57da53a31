//! Shared setup for service tests: every service wired over a fresh
//! in-memory store.

use std::sync::Arc;
use std::time::Duration;

use gisthub_auth::jwt::{JwtDecoder, JwtEncoder};
use gisthub_auth::password::{PasswordHasher, PasswordValidator};
use gisthub_auth::policy::PolicyEnforcer;
use gisthub_cache::MemoryCacheProvider;
use gisthub_core::config::AppConfig;
use gisthub_core::traits::cache::CacheProvider;
use gisthub_database::store::Stores;
use gisthub_entity::user::{CreateUser, UserRole};

use crate::account::AccountService;
use crate::context::RequestContext;
use crate::gist::{FavoriteService, ForkService, GistReader, GistService, SearchService, VersionService};
use crate::preview::{EmbedService, OgImageService};
use crate::user::{AdminService, UserService};

pub(crate) struct Fixture {
    pub config: AppConfig,
    pub stores: Stores,
    pub cache: Arc<dyn CacheProvider>,
    pub policy: Arc<PolicyEnforcer>,
    pub encoder: Arc<JwtEncoder>,
    pub decoder: Arc<JwtDecoder>,
}

impl Fixture {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "service-test-secret".into();
        let cache: Arc<dyn CacheProvider> = Arc::new(MemoryCacheProvider::new(&config.cache));
        Self {
            encoder: Arc::new(JwtEncoder::new(&config.auth)),
            decoder: Arc::new(JwtDecoder::new(&config.auth, cache.clone())),
            stores: Stores::memory(),
            policy: Arc::new(PolicyEnforcer::new()),
            cache,
            config,
        }
    }

    async fn user(&self, email: &str, role: UserRole) -> RequestContext {
        let user = self
            .stores
            .users
            .create(&CreateUser {
                email: email.to_string(),
                password_hash: None,
                display_name: None,
                role,
            })
            .await
            .unwrap();
        RequestContext::new(user.id, user.role, user.email)
    }

    pub async fn member(&self, email: &str) -> RequestContext {
        self.user(email, UserRole::Member).await
    }

    pub async fn admin(&self, email: &str) -> RequestContext {
        self.user(email, UserRole::Admin).await
    }

    pub fn reader(&self) -> GistReader {
        GistReader::new(
            self.stores.gists.clone(),
            self.stores.users.clone(),
            self.policy.clone(),
        )
    }

    pub fn gist_service(&self) -> GistService {
        GistService::new(self.reader(), self.cache.clone(), self.config.gists.clone())
    }

    pub fn version_service(&self) -> VersionService {
        VersionService::new(self.reader())
    }

    pub fn fork_service(&self) -> ForkService {
        ForkService::new(self.reader())
    }

    pub fn favorite_service(&self) -> FavoriteService {
        FavoriteService::new(self.reader())
    }

    pub fn search_service(&self) -> SearchService {
        SearchService::new(self.stores.gists.clone(), self.config.gists.clone())
    }

    pub fn account_service(&self) -> AccountService {
        AccountService::new(
            self.stores.users.clone(),
            Arc::new(PasswordHasher::new()),
            Arc::new(PasswordValidator::new(&self.config.auth)),
            self.encoder.clone(),
            self.decoder.clone(),
        )
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(
            self.stores.users.clone(),
            Arc::new(PasswordHasher::new()),
            Arc::new(PasswordValidator::new(&self.config.auth)),
        )
    }

    pub fn admin_service(&self) -> AdminService {
        AdminService::new(
            self.stores.users.clone(),
            self.stores.gists.clone(),
            self.encoder.clone(),
            self.policy.clone(),
            self.config.gists.max_page_size,
        )
    }

    pub fn og_service(&self) -> OgImageService {
        OgImageService::new(self.reader(), self.cache.clone(), Duration::from_secs(60))
    }

    pub fn embed_service(&self) -> EmbedService {
        EmbedService::new(self.reader(), self.config.server.public_base_url.clone())
    }
}
