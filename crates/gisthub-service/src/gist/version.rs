//! Version history reads.

use uuid::Uuid;

use gisthub_auth::policy::{Action, GIST_NOT_PUBLIC};
use gisthub_core::error::{AppError, ErrorKind};
use gisthub_entity::gist::GistVersion;

use super::reader::GistReader;
use crate::context::RequestContext;

/// Reads the append-only version history of a gist.
#[derive(Debug, Clone)]
pub struct VersionService {
    reader: GistReader,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(reader: GistReader) -> Self {
        Self { reader }
    }

    /// Lists all versions of an owned gist, newest first.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        gist_id: Uuid,
    ) -> Result<Vec<GistVersion>, AppError> {
        let principal = ctx.principal();
        self.reader
            .load(Some(&principal), gist_id, Action::ReadOwnedGist)
            .await?;
        self.reader.store().find_versions(gist_id).await
    }

    /// One version of an owned gist.
    pub async fn get_version(
        &self,
        ctx: &RequestContext,
        gist_id: Uuid,
        number: i32,
    ) -> Result<GistVersion, AppError> {
        let principal = ctx.principal();
        self.reader
            .load(Some(&principal), gist_id, Action::ReadOwnedGist)
            .await?;
        self.reader
            .store()
            .find_version(gist_id, number)
            .await?
            .ok_or_else(|| AppError::not_found("Version not found"))
    }

    /// Raw body of a public gist at `number`, or at the latest version.
    pub async fn public_body(
        &self,
        gist_id: Uuid,
        number: Option<i32>,
    ) -> Result<String, AppError> {
        self.reader
            .load(None, gist_id, Action::ReadPublicGist)
            .await
            .map_err(|e| {
                if e.is(ErrorKind::NotFound) {
                    AppError::not_found(GIST_NOT_PUBLIC)
                } else {
                    e
                }
            })?;

        let store = self.reader.store();
        let version = match number {
            Some(n) => store.find_version(gist_id, n).await?,
            None => store.find_latest_version(gist_id).await?,
        };

        version
            .map(|v| v.body)
            .ok_or_else(|| AppError::not_found("Version not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gist::GistInput;
    use crate::testing::Fixture;
    use gisthub_entity::gist::Language;

    fn input(body: &str, is_public: bool) -> GistInput {
        GistInput {
            title: "Snippet".into(),
            body: body.into(),
            language: Language::Rust,
            is_public,
        }
    }

    #[tokio::test]
    async fn test_numbers_are_contiguous_and_bodies_immutable() {
        let fx = Fixture::new();
        let alice = fx.member("alice@example.com").await;
        let gists = fx.gist_service();
        let versions = fx.version_service();

        let created = gists.create(&alice, input("v1", false)).await.unwrap();
        let id = created.gist.id;
        for k in 2..=5 {
            gists
                .update(&alice, id, input(&format!("v{k}"), false))
                .await
                .unwrap();
        }

        let history = versions.list_versions(&alice, id).await.unwrap();
        let numbers: Vec<i32> = history.iter().map(|v| v.version).collect();
        assert_eq!(numbers, vec![5, 4, 3, 2, 1]);
        for i in 1..=5 {
            let v = versions.get_version(&alice, id, i).await.unwrap();
            assert_eq!(v.body, format!("v{i}"));
        }

        let err = versions.get_version(&alice, id, 6).await.unwrap_err();
        assert_eq!(err.message, "Version not found");
    }

    #[tokio::test]
    async fn test_public_body_resolution() {
        let fx = Fixture::new();
        let alice = fx.member("alice@example.com").await;
        let gists = fx.gist_service();
        let versions = fx.version_service();

        let public = gists.create(&alice, input("one", true)).await.unwrap();
        gists
            .update(&alice, public.gist.id, input("two", true))
            .await
            .unwrap();
        let private = gists.create(&alice, input("secret", false)).await.unwrap();

        assert_eq!(versions.public_body(public.gist.id, None).await.unwrap(), "two");
        assert_eq!(versions.public_body(public.gist.id, Some(1)).await.unwrap(), "one");

        let missing_version = versions
            .public_body(public.gist.id, Some(9))
            .await
            .unwrap_err();
        assert_eq!(missing_version.message, "Version not found");

        let hidden = versions.public_body(private.gist.id, None).await.unwrap_err();
        assert_eq!(hidden.kind, ErrorKind::NotFound);
        assert_eq!(hidden.message, GIST_NOT_PUBLIC);
        let absent = versions.public_body(Uuid::new_v4(), None).await.unwrap_err();
        assert_eq!(absent.message, GIST_NOT_PUBLIC);
    }
}
