use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::blocks::Block;

pub type PostId = u64;
pub type AttachmentId = u64;
pub type UserId = u64;

/// A post as the content store holds it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default = "default_status")]
    pub status: String,
    /// Stored as `YYYY-MM-DD HH:MM:SS` or RFC 3339
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub author_id: Option<UserId>,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub featured_image_id: Option<AttachmentId>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Arbitrary post meta (SEO plugin fields live here)
    #[serde(default)]
    pub meta: HashMap<String, Value>,
}

fn default_status() -> String {
    "publish".to_string()
}

/// Row of the post listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub date: String,
    pub slug: String,
    pub link: String,
    pub status: String,
}

/// A site user account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Roles that can write posts
pub const AUTHOR_ROLES: &[&str] = &["administrator", "editor", "author", "contributor"];

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn can_write_posts(&self) -> bool {
        AUTHOR_ROLES.iter().any(|role| self.has_role(role))
    }
}

/// Row of the user listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Everything the media store knows about one attachment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentMetadata {
    pub url: String,
    /// Path of the stored file, when known
    pub file: Option<String>,
    pub alt: String,
    pub title: String,
    pub caption: String,
    pub description: String,
    pub mime_type: String,
    /// `None` when the underlying file is missing from storage
    pub file_size: Option<u64>,
    pub created_at: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Names of the generated renditions (thumbnail, medium, ...)
    pub renditions: Vec<String>,
    pub image_meta: Option<Value>,
}

/// Read access to posts and their relationships
pub trait ContentStore {
    /// Load a full post record
    fn post(&self, post_id: PostId) -> Option<Post>;
    /// Raw stored content of a post, empty when unknown
    fn post_content(&self, post_id: PostId) -> String;
    /// Attachment id of the post's featured image
    fn featured_image_id(&self, post_id: PostId) -> Option<AttachmentId>;
    /// Image attachments whose parent is this post, in display order
    fn attachment_children(&self, post_id: PostId) -> Vec<AttachmentId>;
    fn user_display_name(&self, user_id: UserId) -> Option<String>;
    /// Users holding `role`, or every user who can write posts when `None`,
    /// ordered by display name
    fn users(&self, role: Option<&str>) -> Vec<User>;
    /// Posts newest first; `None` lists everything
    fn recent_posts(&self, limit: Option<usize>) -> Vec<Post>;
}

/// Read access to the media library
pub trait MediaStore {
    /// `None` when the id is not an attachment or cannot be loaded
    fn attachment_metadata(&self, attachment_id: AttachmentId) -> Option<AttachmentMetadata>;
    /// Map a full-size upload URL back to its attachment
    fn resolve_url_to_attachment_id(&self, url: &str) -> Option<AttachmentId>;
}

/// Turns stored post content into a block tree
pub trait BlockParser {
    /// Returns an empty tree when the content has no block markers
    fn parse_blocks(&self, html: &str) -> Vec<Block>;
}
