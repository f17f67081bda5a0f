//! Error types for the analysis entry points.
//!
//! The image pipeline itself never fails; these cover the caller contract
//! (post ids), snapshot loading and settings.

use crate::settings::Platform;
use crate::store::{PostId, UserId};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("invalid post id: {0}")]
    InvalidPostId(PostId),

    #[error("post {0} does not exist")]
    PostNotFound(PostId),

    #[error("failed to read site snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed site snapshot: {0}")]
    SnapshotFormat(#[from] serde_json::Error),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl AnalyzeError {
    /// Whether the caller passed a bad post reference
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidPostId(_) | Self::PostNotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("API key for {platform} cannot be empty")]
    EmptyApiKey { platform: Platform },

    #[error("author id must be positive, got {0}")]
    InvalidAuthor(UserId),

    #[error("selected author {0} does not exist")]
    UnknownAuthor(UserId),
}
