//! Image inventory of a post.
//!
//! Three sources are merged, in this order:
//!
//! 1. attachments whose parent is the post (display order)
//! 2. `<img>` tags in the stored content that are not one of those attachments
//! 3. image, gallery and media-text blocks found by walking the block tree
//!
//! The featured image is removed, then records are de-duplicated by
//! attachment id and by normalized URL, keeping the first occurrence.

use crate::blocks::has_blocks;
use crate::image::ImageRecord;
use crate::normalize::normalize;
use crate::resolver::AttachmentResolver;
use crate::scanner::scan;
use crate::store::{AttachmentId, BlockParser, ContentStore, MediaStore, PostId};
use crate::walker::walk_for_images;
use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, trace};

/// Key of an inventory entry.
///
/// Images without an attachment id get a positional key so that several
/// of them can coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKey {
    Attachment(AttachmentId),
    External(usize),
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attachment(id) => write!(f, "{id}"),
            Self::External(n) => write!(f, "external-{n}"),
        }
    }
}

impl Serialize for ImageKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// De-duplicated, ordered image records of one post
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ImageInventory {
    entries: IndexMap<ImageKey, ImageRecord>,
    #[serde(skip)]
    seen_srcs: IndexSet<String>,
}

impl ImageInventory {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ImageKey) -> Option<&ImageRecord> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ImageKey, &ImageRecord)> {
        self.entries.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &ImageRecord> {
        self.entries.values()
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut ImageRecord> {
        self.entries.values_mut()
    }

    pub fn contains_id(&self, id: AttachmentId) -> bool {
        self.entries.contains_key(&ImageKey::Attachment(id))
    }

    /// Normalized URL of every kept record, in order
    pub fn seen_srcs(&self) -> &IndexSet<String> {
        &self.seen_srcs
    }
}

/// Featured image plus the rest of a post's images
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostImages {
    pub featured_image: Option<ImageRecord>,
    pub attached_images: ImageInventory,
}

/// Drop the featured image, then keep the first record per id and per
/// normalized URL.
pub fn dedupe<I>(records: I, featured_id: Option<AttachmentId>) -> ImageInventory
where
    I: IntoIterator<Item = ImageRecord>,
{
    let mut inventory = ImageInventory::default();
    let mut seen_ids = HashSet::new();
    let mut external = 0;

    for record in records {
        if record.id.is_some() && record.id == featured_id {
            continue;
        }
        if let Some(id) = record.id {
            if seen_ids.contains(&id) {
                continue;
            }
        }
        let normalized = normalize(&record.src);
        if inventory.seen_srcs.contains(&normalized) {
            trace!(src = %record.src, "duplicate image url");
            continue;
        }

        let key = match record.id {
            Some(id) => {
                seen_ids.insert(id);
                ImageKey::Attachment(id)
            }
            None => {
                external += 1;
                ImageKey::External(external - 1)
            }
        };
        inventory.seen_srcs.insert(normalized);
        inventory.entries.insert(key, record);
    }

    inventory
}

/// Collects a post's images from the content store, the media library and
/// the block tree. All working state lives for one call.
pub struct ImageAggregator<'a, C: ?Sized, M: ?Sized, P: ?Sized> {
    content: &'a C,
    media: &'a M,
    parser: &'a P,
}

impl<'a, C, M, P> ImageAggregator<'a, C, M, P>
where
    C: ContentStore + ?Sized,
    M: MediaStore + ?Sized,
    P: BlockParser + ?Sized,
{
    pub fn new(content: &'a C, media: &'a M, parser: &'a P) -> Self {
        Self {
            content,
            media,
            parser,
        }
    }

    fn resolver(&self) -> AttachmentResolver<'a, M> {
        AttachmentResolver::new(self.media)
    }

    /// Featured image and de-duplicated inventory of a post
    pub fn post_images(&self, post_id: PostId) -> PostImages {
        PostImages {
            featured_image: self.featured_image(post_id),
            attached_images: self.aggregate(post_id),
        }
    }

    pub fn featured_image(&self, post_id: PostId) -> Option<ImageRecord> {
        self.content
            .featured_image_id(post_id)
            .and_then(|id| self.resolver().resolve(id))
    }

    /// Every image of a post except the featured one, without duplicates.
    ///
    /// The post is assumed to exist; unknown posts yield an empty inventory.
    pub fn aggregate(&self, post_id: PostId) -> ImageInventory {
        let content = self.content.post_content(post_id);
        let featured_id = self.content.featured_image_id(post_id);

        let attached = self.attached_images(post_id);
        let attachment_urls: HashSet<String> =
            attached.iter().map(|image| normalize(&image.src)).collect();

        let embedded = self.content_images(&content, &attachment_urls);

        let from_blocks = if has_blocks(&content) {
            let tree = self.parser.parse_blocks(&content);
            walk_for_images(&tree, self.resolver())
        } else {
            Vec::new()
        };

        let counts = (attached.len(), embedded.len(), from_blocks.len());
        let inventory = dedupe(
            attached.into_iter().chain(embedded).chain(from_blocks),
            featured_id,
        );

        debug!(
            post_id,
            attached = counts.0,
            embedded = counts.1,
            blocks = counts.2,
            unique = inventory.len(),
            "aggregated post images"
        );

        inventory
    }

    fn attached_images(&self, post_id: PostId) -> Vec<ImageRecord> {
        let resolver = self.resolver();
        self.content
            .attachment_children(post_id)
            .into_iter()
            .filter_map(|id| resolver.resolve(id))
            .collect()
    }

    /// Images referenced by `<img>` tags that are not already attachments.
    ///
    /// A tag whose URL is in the media library but whose record cannot be
    /// loaded is dropped rather than reported as external.
    fn content_images(
        &self,
        content: &str,
        attachment_urls: &HashSet<String>,
    ) -> Vec<ImageRecord> {
        let resolver = self.resolver();
        let mut images = Vec::new();

        for image_ref in scan(content) {
            if attachment_urls.contains(&normalize(&image_ref.src)) {
                continue;
            }
            match resolver.attachment_id_for_url(&image_ref.src) {
                Some(id) => images.extend(resolver.resolve(id)),
                None => images.push(ImageRecord::external(&image_ref.src)),
            }
        }

        images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageKind;

    fn attachment(id: AttachmentId, src: &str) -> ImageRecord {
        let mut record = ImageRecord::external(src);
        record.id = Some(id);
        record.kind = ImageKind::MediaLibrary;
        record
    }

    #[test]
    fn test_dedupe_first_id_wins() {
        let mut later = attachment(5, "https://s/u/five-copy.jpg");
        later.alt = "from blocks".to_string();
        let inventory = dedupe(
            vec![attachment(5, "https://s/u/five.jpg"), later],
            None,
        );
        assert_eq!(inventory.len(), 1);
        let kept = inventory.get(&ImageKey::Attachment(5)).expect("id 5 kept");
        assert_eq!(kept.src, "https://s/u/five.jpg");
        assert!(kept.alt.is_empty());
    }

    #[test]
    fn test_dedupe_by_normalized_src() {
        let inventory = dedupe(
            vec![
                attachment(1, "https://s/u/photo.jpg"),
                ImageRecord::external("https://s/u/photo-300x200.jpg?v=3"),
                attachment(2, "https://s/u/photo-1024x768.jpg"),
            ],
            None,
        );
        assert_eq!(inventory.len(), 1);
        assert!(inventory.contains_id(1));
        assert!(!inventory.contains_id(2));
        assert_eq!(
            inventory.seen_srcs().iter().collect::<Vec<_>>(),
            vec!["https://s/u/photo.jpg"]
        );
    }

    #[test]
    fn test_dedupe_keeps_distinct_externals() {
        let inventory = dedupe(
            vec![
                ImageRecord::external("https://cdn.example.com/a.png"),
                ImageRecord::external("https://cdn.example.com/b.png"),
                ImageRecord::external("https://cdn.example.com/a.png?x=1"),
            ],
            None,
        );
        let keys: Vec<String> = inventory.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["external-0", "external-1"]);
    }

    #[test]
    fn test_dedupe_removes_featured() {
        let inventory = dedupe(
            vec![
                attachment(3, "https://s/u/three.jpg"),
                attachment(4, "https://s/u/four.jpg"),
                ImageRecord::external("https://cdn.example.com/x.png"),
            ],
            Some(3),
        );
        assert!(!inventory.contains_id(3));
        assert!(inventory.contains_id(4));
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn test_inventory_serializes_as_ordered_object() {
        let inventory = dedupe(
            vec![
                attachment(9, "https://s/u/nine.jpg"),
                ImageRecord::external("https://cdn.example.com/x.png"),
            ],
            None,
        );
        let json = serde_json::to_string(&inventory).expect("serialize");
        let nine = json.find("\"9\":").expect("attachment key");
        let external = json.find("\"external-0\":").expect("external key");
        assert!(nine < external);
    }
}
