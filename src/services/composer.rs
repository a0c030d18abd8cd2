//! Post composer draft — text plus uploaded image previews.
//!
//! Drafts live inside the owning session and are never persisted. Submitting
//! logs the post and clears the draft. Preview URLs stay valid until then.

use axum::body::Bytes;
use uuid::Uuid;

pub const MAX_IMAGES: usize = 9;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("not an image: {0}")]
    NotAnImage(String),
    #[error("too many images (max {max})")]
    TooManyImages { max: usize },
    #[error("image too large (max {max_bytes} bytes)")]
    ImageTooLarge { max_bytes: usize },
}

#[derive(Debug, Clone)]
pub struct ImagePreview {
    pub id: Uuid,
    pub content_type: String,
    pub bytes: Bytes,
}

/// What a submit produced. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedPost {
    pub content: String,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ComposerDraft {
    pub content: String,
    images: Vec<ImagePreview>,
}

/// Session-scoped URL a preview is served from.
#[must_use]
pub fn preview_url(id: Uuid) -> String {
    format!("/my-profile/composer/images/{id}")
}

/// `image/*` minus SVG, which can carry script when served from our origin.
fn is_raster_image(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence.starts_with("image/") && essence != "image/svg+xml"
}

impl ComposerDraft {
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Append an uploaded image. Only raster `image/*` content types are accepted.
    pub fn add_image(&mut self, content_type: &str, bytes: Bytes) -> Result<Uuid, ComposerError> {
        if !is_raster_image(content_type) {
            return Err(ComposerError::NotAnImage(content_type.to_owned()));
        }
        if self.images.len() >= MAX_IMAGES {
            return Err(ComposerError::TooManyImages { max: MAX_IMAGES });
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ComposerError::ImageTooLarge { max_bytes: MAX_IMAGE_BYTES });
        }

        let id = Uuid::new_v4();
        self.images.push(ImagePreview { id, content_type: content_type.to_owned(), bytes });
        Ok(id)
    }

    #[must_use]
    pub fn image(&self, id: Uuid) -> Option<&ImagePreview> {
        self.images.iter().find(|img| img.id == id)
    }

    #[must_use]
    pub fn images(&self) -> &[ImagePreview] {
        &self.images
    }

    #[must_use]
    pub fn image_urls(&self) -> Vec<String> {
        self.images().iter().map(|img| preview_url(img.id)).collect()
    }

    /// Log the draft as a post and reset it.
    pub fn submit(&mut self) -> SubmittedPost {
        let post = SubmittedPost { content: std::mem::take(&mut self.content), image_urls: self.image_urls() };
        self.images.clear();
        tracing::info!(content = %post.content, images = ?post.image_urls, "post submitted");
        post
    }
}

#[cfg(test)]
#[path = "composer_test.rs"]
mod tests;
