//! JSON export of a site used as the content and media store.

use crate::error::AnalyzeError;
use crate::normalize::UrlParts;
use crate::store::{
    AttachmentId, AttachmentMetadata, ContentStore, MediaStore, Post, PostId, User, UserId,
};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A media-library entry as exported
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    #[serde(default)]
    pub parent_id: Option<PostId>,
    #[serde(default)]
    pub menu_order: i64,
    pub url: String,
    /// Stored file path; absent when the file is missing
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Rendition name to rendition details
    #[serde(default)]
    pub sizes: IndexMap<String, Value>,
    #[serde(default)]
    pub image_meta: Option<Value>,
}

/// Posts, attachments and users of one site
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteSnapshot {
    #[serde(default)]
    pub site_url: String,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl SiteSnapshot {
    pub fn open(path: &Path) -> Result<Self, AnalyzeError> {
        let raw = fs::read_to_string(path).map_err(|source| AnalyzeError::Snapshot {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = Self::from_json(&raw)?;
        debug!(
            path = %path.display(),
            posts = snapshot.posts.len(),
            attachments = snapshot.attachments.len(),
            "loaded site snapshot"
        );
        Ok(snapshot)
    }

    pub fn from_json(raw: &str) -> Result<Self, AnalyzeError> {
        Ok(serde_json::from_str(raw)?)
    }

    fn find_post(&self, post_id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    fn find_attachment(&self, attachment_id: AttachmentId) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.id == attachment_id)
    }
}

impl ContentStore for SiteSnapshot {
    fn post(&self, post_id: PostId) -> Option<Post> {
        self.find_post(post_id).cloned()
    }

    fn post_content(&self, post_id: PostId) -> String {
        self.find_post(post_id)
            .map(|p| p.content.clone())
            .unwrap_or_default()
    }

    fn featured_image_id(&self, post_id: PostId) -> Option<AttachmentId> {
        self.find_post(post_id)
            .and_then(|p| p.featured_image_id)
            .filter(|id| *id > 0)
    }

    fn attachment_children(&self, post_id: PostId) -> Vec<AttachmentId> {
        let mut children: Vec<&Attachment> = self
            .attachments
            .iter()
            .filter(|a| a.parent_id == Some(post_id) && a.mime_type.starts_with("image/"))
            .collect();
        children.sort_by_key(|a| (a.menu_order, a.id));
        children.into_iter().map(|a| a.id).collect()
    }

    fn user_display_name(&self, user_id: UserId) -> Option<String> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.display_name.clone())
    }

    fn users(&self, role: Option<&str>) -> Vec<User> {
        let mut users: Vec<&User> = self
            .users
            .iter()
            .filter(|u| match role {
                Some(role) => u.has_role(role),
                None => u.can_write_posts(),
            })
            .collect();
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name).then(a.id.cmp(&b.id)));
        users.into_iter().cloned().collect()
    }

    fn recent_posts(&self, limit: Option<usize>) -> Vec<Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        posts
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

impl MediaStore for SiteSnapshot {
    fn attachment_metadata(&self, attachment_id: AttachmentId) -> Option<AttachmentMetadata> {
        let attachment = self.find_attachment(attachment_id)?;
        Some(AttachmentMetadata {
            url: attachment.url.clone(),
            file: attachment.file.clone(),
            alt: attachment.alt.clone(),
            title: attachment.title.clone(),
            caption: attachment.caption.clone(),
            description: attachment.description.clone(),
            mime_type: attachment.mime_type.clone(),
            file_size: attachment.file_size,
            created_at: attachment.date.clone(),
            width: attachment.width,
            height: attachment.height,
            renditions: attachment.sizes.keys().cloned().collect(),
            image_meta: attachment.image_meta.clone(),
        })
    }

    /// Matches the full-size upload URL only; resized renditions do not resolve.
    fn resolve_url_to_attachment_id(&self, url: &str) -> Option<AttachmentId> {
        let wanted = UrlParts::parse(url);
        if wanted.path.is_empty() {
            return None;
        }
        self.attachments
            .iter()
            .find(|a| {
                let stored = UrlParts::parse(&a.url);
                stored.host.eq_ignore_ascii_case(&wanted.host) && stored.path == wanted.path
            })
            .map(|a| a.id)
    }
}
