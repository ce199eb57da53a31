//! Social preview cards (Open Graph images) for public gists.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};
use tracing::{debug, warn};
use uuid::Uuid;

use gisthub_auth::policy::Action;
use gisthub_cache::keys;
use gisthub_core::error::AppError;
use gisthub_core::traits::cache::CacheProvider;
use gisthub_entity::gist::GistDetail;

use super::glyphs::{draw_text, fill_rect, fit_width, line_height, text_width, wrap};
use crate::gist::GistReader;

pub const OG_WIDTH: u32 = 1200;
pub const OG_HEIGHT: u32 = 630;

const PADDING: u32 = 80;
const BACKGROUND: Rgb<u8> = Rgb([0x1a, 0x1b, 0x1e]);
const OWNER_COLOR: Rgb<u8> = Rgb([0x9c, 0xa3, 0xaf]);
const TITLE_COLOR: Rgb<u8> = Rgb([0xf3, 0xf4, 0xf6]);
const MUTED_COLOR: Rgb<u8> = Rgb([0x6b, 0x72, 0x80]);
const BADGE_COLOR: Rgb<u8> = Rgb([0x37, 0x41, 0x51]);

const AVATAR_SIZE: u32 = 80;
const OWNER_SCALE: u32 = 4;
const TITLE_SCALE: u32 = 8;
const TITLE_MAX_LINES: usize = 2;
const META_SCALE: u32 = 4;

/// Text shown on a preview card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgCard {
    pub owner_name: String,
    pub title: String,
    pub language: String,
    pub version_count: usize,
}

impl OgCard {
    /// Card contents for a gist.
    pub fn from_detail(detail: &GistDetail) -> Self {
        Self {
            owner_name: detail.owner.name.clone(),
            title: detail.gist.title.clone(),
            language: detail.gist.language.display_name().to_string(),
            version_count: detail.versions.len(),
        }
    }

    /// `"1 version"` or `"N versions"`.
    pub fn version_label(&self) -> String {
        let suffix = if self.version_count == 1 { "" } else { "s" };
        format!("{} version{suffix}", self.version_count)
    }
}

/// Draws the card and encodes it as PNG.
pub fn render_card(card: &OgCard) -> Result<Vec<u8>, AppError> {
    let mut image = RgbImage::from_pixel(OG_WIDTH, OG_HEIGHT, BACKGROUND);
    let content_width = OG_WIDTH - 2 * PADDING;

    let title_lines = wrap(&card.title, TITLE_SCALE, content_width, TITLE_MAX_LINES);
    let title_line_height = line_height(TITLE_SCALE) + TITLE_SCALE * 3;
    let block_height = AVATAR_SIZE
        + 40
        + title_lines.len() as u32 * title_line_height
        + 20
        + line_height(META_SCALE)
        + 16;
    let mut y = OG_HEIGHT.saturating_sub(block_height) / 2;

    // Owner row: initial in a square badge, then the name.
    fill_rect(&mut image, PADDING, y, AVATAR_SIZE, AVATAR_SIZE, BADGE_COLOR);
    let initial: String = card
        .owner_name
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .into_iter()
        .collect();
    let initial_scale = 6;
    draw_text(
        &mut image,
        PADDING + (AVATAR_SIZE - text_width(&initial, initial_scale)) / 2,
        y + (AVATAR_SIZE - line_height(initial_scale)) / 2,
        &initial,
        initial_scale,
        TITLE_COLOR,
    );
    let name_x = PADDING + AVATAR_SIZE + 20;
    draw_text(
        &mut image,
        name_x,
        y + (AVATAR_SIZE - line_height(OWNER_SCALE)) / 2,
        &fit_width(&card.owner_name, OWNER_SCALE, OG_WIDTH - PADDING - name_x),
        OWNER_SCALE,
        OWNER_COLOR,
    );
    y += AVATAR_SIZE + 40;

    for line in &title_lines {
        draw_text(&mut image, PADDING, y, line, TITLE_SCALE, TITLE_COLOR);
        y += title_line_height;
    }
    y += 20;

    // Language badge followed by the version count.
    let badge_padding_x = 16;
    let badge_padding_y = 8;
    let language_width = text_width(&card.language, META_SCALE);
    fill_rect(
        &mut image,
        PADDING,
        y,
        language_width + 2 * badge_padding_x,
        line_height(META_SCALE) + 2 * badge_padding_y,
        BADGE_COLOR,
    );
    draw_text(
        &mut image,
        PADDING + badge_padding_x,
        y + badge_padding_y,
        &card.language,
        META_SCALE,
        TITLE_COLOR,
    );
    draw_text(
        &mut image,
        PADDING + language_width + 2 * badge_padding_x + 16,
        y + badge_padding_y,
        &card.version_label(),
        META_SCALE,
        MUTED_COLOR,
    );

    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| AppError::internal(format!("Failed to encode preview image: {e}")))?;
    Ok(buf)
}

/// Serves preview cards, caching rendered PNGs.
#[derive(Debug, Clone)]
pub struct OgImageService {
    reader: GistReader,
    cache: Arc<dyn CacheProvider>,
    ttl: Duration,
}

impl OgImageService {
    /// Creates a new preview image service.
    pub fn new(reader: GistReader, cache: Arc<dyn CacheProvider>, ttl: Duration) -> Self {
        Self { reader, cache, ttl }
    }

    /// PNG card for a public gist.
    pub async fn image(&self, gist_id: Uuid) -> Result<Bytes, AppError> {
        let gist = self
            .reader
            .load(None, gist_id, Action::ReadPublicGist)
            .await?;

        let key = keys::og_image(gist_id);
        match self.cache.get_bytes(&key).await {
            Ok(Some(png)) => {
                debug!(gist_id = %gist_id, "Preview image served from cache");
                return Ok(png);
            }
            Ok(None) => {}
            Err(e) => warn!(gist_id = %gist_id, error = %e, "Preview cache lookup failed"),
        }

        let card = OgCard::from_detail(&self.reader.detail(gist, None).await?);
        let png = tokio::task::spawn_blocking(move || render_card(&card))
            .await
            .map_err(|e| AppError::internal(format!("Preview rendering task failed: {e}")))??;
        let png = Bytes::from(png);

        if let Err(e) = self.cache.set_bytes(&key, png.clone(), self.ttl).await {
            warn!(gist_id = %gist_id, error = %e, "Failed to cache preview image");
        }
        Ok(png)
    }
}
