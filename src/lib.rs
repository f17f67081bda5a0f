//! # postanalyzer
//!
//! QA/SEO reports for blog posts, centred on an image inventory that merges
//! media-library attachments, `<img>` tags in content and block-editor
//! image blocks into one de-duplicated list.
//!
//! ```
//! use postanalyzer::{ImageAggregator, SiteSnapshot, WpBlockParser};
//!
//! let site = SiteSnapshot::from_json(r#"{
//!     "posts": [{"id": 1, "content": "<img src=\"https://cdn.example.com/z.png\">"}]
//! }"#).unwrap();
//!
//! let images = ImageAggregator::new(&site, &site, &WpBlockParser).aggregate(1);
//! assert_eq!(images.len(), 1);
//! assert!(images.records().all(|image| image.id.is_none()));
//! ```

pub mod aggregator;
pub mod blocks;
pub mod cli;
pub mod error;
pub mod image;
pub mod normalize;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod settings;
pub mod snapshot;
pub mod store;
pub mod summary;
pub mod text;
pub mod walker;

mod analyze;

pub use aggregator::{ImageAggregator, ImageInventory, ImageKey, PostImages};
pub use analyze::run;
pub use blocks::{Block, WpBlockParser};
pub use error::{AnalyzeError, SettingsError};
pub use image::{ImageKind, ImageRecord};
pub use normalize::{normalize, urls_match};
pub use report::{analyze_post, list_posts, list_users, PostReport};
pub use settings::{Config, Settings};
pub use snapshot::SiteSnapshot;
pub use store::{AttachmentId, BlockParser, ContentStore, MediaStore, PostId};
