use crate::normalize::filename_from_url;
use crate::store::{AttachmentId, AttachmentMetadata};
use crate::text::decode_entities;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where an image record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageKind {
    /// Resolvable attachment in the media library
    MediaLibrary,
    /// Bare URL in content with no attachment behind it
    External,
}

/// One image found on a post.
///
/// Build through [`ImageRecord::from_attachment`] or [`ImageRecord::external`]
/// so that `id` is present exactly when `kind` is [`ImageKind::MediaLibrary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: Option<AttachmentId>,
    pub src: String,
    pub alt: String,
    pub title: String,
    pub caption: String,
    pub description: String,
    pub filename: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(rename = "type")]
    pub kind: ImageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
}

impl ImageRecord {
    pub fn from_attachment(id: AttachmentId, meta: AttachmentMetadata) -> Self {
        // Prefer the stored file name; fall back to the URL when the file path is unknown
        let filename = meta
            .file
            .as_deref()
            .and_then(|path| path.rsplit(['/', '\\']).next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| filename_from_url(&meta.url));

        Self {
            id: Some(id),
            src: meta.url,
            alt: meta.alt,
            title: meta.title,
            caption: meta.caption,
            description: meta.description,
            filename,
            width: meta.width.filter(|w| *w > 0),
            height: meta.height.filter(|h| *h > 0),
            kind: ImageKind::MediaLibrary,
            mime_type: Some(meta.mime_type).filter(|m| !m.is_empty()),
            file_size: meta.file_size,
            upload_date: Some(meta.created_at).filter(|d| !d.is_empty()),
            image_meta: meta.image_meta,
            sizes: meta.renditions,
        }
    }

    /// Minimal record for an image that only exists as a URL in content
    pub fn external(src: &str) -> Self {
        let src = src.trim();
        Self {
            id: None,
            src: src.to_string(),
            alt: String::new(),
            title: String::new(),
            caption: String::new(),
            description: String::new(),
            filename: filename_from_url(src),
            width: None,
            height: None,
            kind: ImageKind::External,
            mime_type: None,
            file_size: None,
            upload_date: None,
            image_meta: None,
            sizes: Vec::new(),
        }
    }

    pub fn is_external(&self) -> bool {
        self.kind == ImageKind::External
    }

    /// Decode HTML entities in the text fields and the source URL
    pub fn decode_entities(&mut self) {
        for field in [
            &mut self.src,
            &mut self.alt,
            &mut self.title,
            &mut self.caption,
            &mut self.description,
            &mut self.filename,
        ] {
            *field = decode_entities(field);
        }
    }
}
