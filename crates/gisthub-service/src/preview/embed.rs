//! Standalone HTML pages for embedding public gists in iframes.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gisthub_auth::policy::Action;
use gisthub_core::error::{AppError, ErrorKind};
use gisthub_entity::gist::GistDetail;

use crate::gist::GistReader;

/// Color scheme of an embed page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedTheme {
    Dark,
    Light,
    /// Follows the viewer's `prefers-color-scheme`.
    #[default]
    Auto,
}

impl EmbedTheme {
    /// Parses a query value; anything unrecognised selects [`EmbedTheme::Auto`].
    pub fn parse_or_auto(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Auto => "auto",
        }
    }
}

impl FromStr for EmbedTheme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            "auto" => Ok(Self::Auto),
            other => Err(AppError::invalid_field(
                "theme",
                format!("Unknown theme: {other}"),
            )),
        }
    }
}

/// What an embed request resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedPage {
    /// The gist is absent or private.
    Missing,
    /// The gist has no versions.
    Empty { title: String },
    Code {
        gist_id: Uuid,
        title: String,
        language_tag: &'static str,
        language_name: &'static str,
        owner_name: String,
        version: i32,
        version_count: usize,
        body: String,
    },
}

const MISSING_MESSAGE: &str = "This gist doesn't exist or isn't public";
const EMPTY_MESSAGE: &str = "This gist has no content";

impl EmbedPage {
    /// Picks the requested version, or the latest when it does not exist.
    pub fn from_detail(detail: GistDetail, version: Option<i32>) -> Self {
        let selected = version
            .and_then(|n| detail.version(n))
            .or_else(|| detail.current())
            .cloned();
        let Some(selected) = selected else {
            return Self::Empty {
                title: detail.gist.title,
            };
        };
        Self::Code {
            gist_id: detail.gist.id,
            title: detail.gist.title,
            language_tag: detail.gist.language.as_str(),
            language_name: detail.gist.language.display_name(),
            owner_name: detail.owner.name,
            version: selected.version,
            version_count: detail.versions.len(),
            body: selected.body,
        }
    }

    /// Whether the page should be served with 404.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Renders the complete HTML document.
    pub fn render(&self, theme: EmbedTheme, base_url: &str) -> String {
        let base_url = base_url.trim_end_matches('/');
        let mut html = String::with_capacity(4096);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        html.push_str(
            "<meta http-equiv=\"Content-Security-Policy\" content=\"frame-ancestors *;\">\n",
        );

        match self {
            Self::Missing => {
                html.push_str("<title>Gist not found</title>\n");
                push_style(&mut html, theme);
                html.push_str("</head>\n<body>\n");
                push_message(&mut html, MISSING_MESSAGE);
            }
            Self::Empty { title } => {
                let _ = writeln!(html, "<title>{}</title>", escape_html(title));
                push_style(&mut html, theme);
                html.push_str("</head>\n<body>\n");
                push_message(&mut html, EMPTY_MESSAGE);
            }
            Self::Code {
                gist_id,
                title,
                language_tag,
                language_name,
                owner_name,
                version,
                version_count,
                body,
            } => {
                let title = escape_html(title);
                let suffix = if *version_count == 1 { "" } else { "s" };
                let description = escape_html(&format!(
                    "{language_name} gist by {owner_name} with {version_count} version{suffix}"
                ));
                let image = format!("{base_url}/api/og/{gist_id}");

                let _ = writeln!(html, "<title>{title}</title>");
                let _ = writeln!(html, "<meta name=\"description\" content=\"{description}\">");
                let _ = writeln!(html, "<meta property=\"og:title\" content=\"{title}\">");
                let _ = writeln!(
                    html,
                    "<meta property=\"og:description\" content=\"{description}\">"
                );
                let _ = writeln!(html, "<meta property=\"og:image\" content=\"{image}\">");
                html.push_str("<meta property=\"og:image:width\" content=\"1200\">\n");
                html.push_str("<meta property=\"og:image:height\" content=\"630\">\n");
                html.push_str("<meta name=\"twitter:card\" content=\"summary_large_image\">\n");
                let _ = writeln!(html, "<meta name=\"twitter:image\" content=\"{image}\">");
                push_style(&mut html, theme);
                html.push_str("</head>\n<body>\n<div class=\"gist\">\n");
                let _ = writeln!(
                    html,
                    "<header><span class=\"title\">{title}</span><span class=\"meta\">{} &middot; v{version}</span></header>",
                    escape_html(language_name)
                );
                let _ = writeln!(
                    html,
                    "<pre><code class=\"language-{language_tag}\">{}</code></pre>",
                    escape_html(body)
                );
                html.push_str("</div>\n");
            }
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn push_message(html: &mut String, message: &str) {
    let _ = writeln!(html, "<div class=\"message\"><p>{}</p></div>", escape_html(message));
}

fn push_style(html: &mut String, theme: EmbedTheme) {
    const DARK: &str = "--bg:#1a1b1e;--fg:#f3f4f6;--muted:#9ca3af;--border:#374151;";
    const LIGHT: &str = "--bg:#ffffff;--fg:#1f2937;--muted:#6b7280;--border:#e5e7eb;";

    html.push_str("<style>\n");
    match theme {
        EmbedTheme::Dark => {
            let _ = writeln!(html, ":root{{{DARK}}}");
        }
        EmbedTheme::Light => {
            let _ = writeln!(html, ":root{{{LIGHT}}}");
        }
        EmbedTheme::Auto => {
            let _ = writeln!(html, ":root{{{LIGHT}}}");
            let _ = writeln!(
                html,
                "@media (prefers-color-scheme: dark){{:root{{{DARK}}}}}"
            );
        }
    }
    html.push_str(
        "html,body{margin:0;height:100%;background:var(--bg);color:var(--fg);\
font-family:ui-sans-serif,system-ui,sans-serif}\n\
.gist{display:flex;flex-direction:column;height:100%}\n\
header{display:flex;justify-content:space-between;padding:8px 12px;\
border-bottom:1px solid var(--border);font-size:13px}\n\
.meta{color:var(--muted)}\n\
pre{flex:1;margin:0;padding:12px;overflow:auto;font-size:13px;line-height:1.5}\n\
code{font-family:ui-monospace,SFMono-Regular,Menlo,monospace}\n\
.message{display:flex;align-items:center;justify-content:center;height:100%;\
font-size:14px;color:var(--muted);text-align:center;padding:12px}\n",
    );
    html.push_str("</style>\n");
}

/// Escapes text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Resolves embed requests against public gists.
#[derive(Debug, Clone)]
pub struct EmbedService {
    reader: GistReader,
    base_url: String,
}

impl EmbedService {
    /// Creates a new embed service. `base_url` prefixes absolute links in the page.
    pub fn new(reader: GistReader, base_url: impl Into<String>) -> Self {
        Self {
            reader,
            base_url: base_url.into(),
        }
    }

    /// Resolves the page for a gist. Absent and private gists become
    /// [`EmbedPage::Missing`] rather than an error.
    pub async fn page(&self, gist_id: Uuid, version: Option<i32>) -> Result<EmbedPage, AppError> {
        let gist = match self
            .reader
            .load(None, gist_id, Action::ReadPublicGist)
            .await
        {
            Ok(gist) => gist,
            Err(e) if e.is(ErrorKind::NotFound) => return Ok(EmbedPage::Missing),
            Err(e) => return Err(e),
        };
        let detail = self.reader.detail(gist, None).await?;
        Ok(EmbedPage::from_detail(detail, version))
    }

    /// Resolves and renders in one step.
    pub async fn render(
        &self,
        gist_id: Uuid,
        version: Option<i32>,
        theme: EmbedTheme,
    ) -> Result<(EmbedPage, String), AppError> {
        let page = self.page(gist_id, version).await?;
        let html = page.render(theme, &self.base_url);
        Ok((page, html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gist::GistInput;
    use crate::testing::Fixture;
    use gisthub_entity::gist::Language;

    #[test]
    fn test_theme_parsing() {
        assert_eq!(EmbedTheme::parse_or_auto(Some("dark")), EmbedTheme::Dark);
        assert_eq!(EmbedTheme::parse_or_auto(Some("LIGHT")), EmbedTheme::Light);
        assert_eq!(EmbedTheme::parse_or_auto(Some("neon")), EmbedTheme::Auto);
        assert_eq!(EmbedTheme::parse_or_auto(None), EmbedTheme::Auto);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_missing_and_empty_pages() {
        let missing = EmbedPage::Missing.render(EmbedTheme::Auto, "http://x");
        assert!(missing.contains("This gist doesn&#39;t exist or isn&#39;t public"));
        assert!(EmbedPage::Missing.is_missing());

        let empty = EmbedPage::Empty { title: "T".into() }.render(EmbedTheme::Dark, "http://x");
        assert!(empty.contains(EMPTY_MESSAGE));
        assert!(empty.contains("#1a1b1e"));
    }

    #[tokio::test]
    async fn test_version_selection_and_escaping() {
        let fx = Fixture::new();
        let alice = fx.member("alice@example.com").await;
        let gists = fx.gist_service();
        let input = |body: &str| GistInput {
            title: "<b>Hi</b>".into(),
            body: body.into(),
            language: Language::JavaScript,
            is_public: true,
        };
        let gist = gists.create(&alice, input("let a = 1 < 2;")).await.unwrap();
        gists
            .update(&alice, gist.gist.id, input("let b = 2;"))
            .await
            .unwrap();

        let service = fx.embed_service();
        let (page, html) = service
            .render(gist.gist.id, Some(1), EmbedTheme::Light)
            .await
            .unwrap();
        assert!(!page.is_missing());
        assert!(html.contains("let a = 1 &lt; 2;"));
        assert!(html.contains("&lt;b&gt;Hi&lt;/b&gt;"));
        assert!(html.contains("language-javascript"));
        assert!(html.contains("http://localhost:8080/api/og/"));

        let (_, latest) = service
            .render(gist.gist.id, Some(42), EmbedTheme::Auto)
            .await
            .unwrap();
        assert!(latest.contains("let b = 2;"));
        assert!(latest.contains("prefers-color-scheme"));

        let (missing, _) = service
            .render(Uuid::new_v4(), None, EmbedTheme::Auto)
            .await
            .unwrap();
        assert!(missing.is_missing());
    }
}
