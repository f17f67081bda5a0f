//! Depth-first search of a block tree for image-bearing blocks.

use crate::blocks::Block;
use crate::image::ImageRecord;
use crate::resolver::AttachmentResolver;
use crate::scanner::extract_src;
use crate::store::{AttachmentId, MediaStore};
use regex::Regex;
use std::sync::LazyLock;

static WP_IMAGE_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"wp-image-(\d+)").unwrap());

/// Collect image records from a block tree in document order.
///
/// Every call returns a fresh sequence in which each attachment id occurs
/// once. Ids that fail to resolve are skipped.
pub fn walk_for_images<M: MediaStore + ?Sized>(
    blocks: &[Block],
    resolver: AttachmentResolver<'_, M>,
) -> Vec<ImageRecord> {
    let mut found = Vec::new();
    for block in blocks {
        append_unique(&mut found, block_images(block, resolver));
    }
    found
}

fn block_images<M: MediaStore + ?Sized>(
    block: &Block,
    resolver: AttachmentResolver<'_, M>,
) -> Vec<ImageRecord> {
    match block.name.as_deref() {
        Some("core/image") => image_block_id(block, resolver)
            .and_then(|id| resolver.resolve(id))
            .into_iter()
            .collect(),
        Some("core/gallery") => {
            let mut found: Vec<ImageRecord> = block
                .attr_ids("ids")
                .into_iter()
                .filter_map(|id| resolver.resolve(id))
                .collect();
            // Newer galleries nest one image block per picture
            append_unique(&mut found, walk_for_images(&block.inner_blocks, resolver));
            found
        }
        Some("core/media-text") if block.attrs.contains_key("mediaId") => block
            .attr_id("mediaId")
            .and_then(|id| resolver.resolve(id))
            .into_iter()
            .collect(),
        _ if !block.inner_blocks.is_empty() => walk_for_images(&block.inner_blocks, resolver),
        _ => Vec::new(),
    }
}

/// Attachment id of an image block: explicit attribute, then the
/// `wp-image-N` class, then a media-library lookup of the markup's `src`.
fn image_block_id<M: MediaStore + ?Sized>(
    block: &Block,
    resolver: AttachmentResolver<'_, M>,
) -> Option<AttachmentId> {
    if let Some(id) = block.attr_id("id") {
        return Some(id);
    }
    if let Some(id) = WP_IMAGE_CLASS_RE
        .captures(&block.inner_html)
        .and_then(|caps| caps[1].parse::<AttachmentId>().ok())
        .filter(|id| *id > 0)
    {
        return Some(id);
    }
    extract_src(&block.inner_html).and_then(|src| resolver.attachment_id_for_url(&src))
}

/// Append records whose id is not yet present
fn append_unique(found: &mut Vec<ImageRecord>, records: Vec<ImageRecord>) {
    for record in records {
        let duplicate = record.id.is_some() && found.iter().any(|seen| seen.id == record.id);
        if !duplicate {
            found.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AttachmentMetadata;
    use serde_json::json;
    use std::collections::BTreeMap;

    struct FakeMedia {
        urls: BTreeMap<AttachmentId, String>,
    }

    impl FakeMedia {
        fn with_ids(ids: &[AttachmentId]) -> Self {
            let urls = ids
                .iter()
                .map(|id| (*id, format!("https://s/uploads/img{id}.jpg")))
                .collect();
            Self { urls }
        }
    }

    impl MediaStore for FakeMedia {
        fn attachment_metadata(&self, id: AttachmentId) -> Option<AttachmentMetadata> {
            self.urls.get(&id).map(|url| AttachmentMetadata {
                url: url.clone(),
                mime_type: "image/jpeg".to_string(),
                ..AttachmentMetadata::default()
            })
        }

        fn resolve_url_to_attachment_id(&self, url: &str) -> Option<AttachmentId> {
            self.urls
                .iter()
                .find(|(_, stored)| stored.as_str() == url)
                .map(|(id, _)| *id)
        }
    }

    fn ids(records: &[ImageRecord]) -> Vec<AttachmentId> {
        records.iter().filter_map(|r| r.id).collect()
    }

    #[test]
    fn test_gallery_ids_then_inner_images() {
        let media = FakeMedia::with_ids(&[1, 2, 3]);
        let tree = vec![Block::new("core/gallery")
            .with_attrs(json!({"ids": [1, 2]}))
            .with_inner_blocks(vec![
                Block::new("core/image").with_attrs(json!({"id": 3}))
            ])];

        let found = walk_for_images(&tree, AttachmentResolver::new(&media));
        assert_eq!(ids(&found), vec![1, 2, 3]);
    }

    #[test]
    fn test_image_id_from_class_marker() {
        let media = FakeMedia::with_ids(&[12]);
        let tree = vec![Block::new("core/image")
            .with_inner_html(r#"<figure><img src="https://s/x.jpg" class="wp-image-12"/></figure>"#)];

        let found = walk_for_images(&tree, AttachmentResolver::new(&media));
        assert_eq!(ids(&found), vec![12]);
    }

    #[test]
    fn test_image_id_from_src_lookup() {
        let media = FakeMedia::with_ids(&[8]);
        let tree = vec![Block::new("core/image")
            .with_inner_html(r#"<figure><img src="https://s/uploads/img8.jpg"/></figure>"#)];

        let found = walk_for_images(&tree, AttachmentResolver::new(&media));
        assert_eq!(ids(&found), vec![8]);
    }

    #[test]
    fn test_media_text_and_containers() {
        let media = FakeMedia::with_ids(&[4, 5]);
        let tree = vec![Block::new("core/columns").with_inner_blocks(vec![
            Block::new("core/column")
                .with_inner_blocks(vec![Block::new("core/media-text").with_attrs(json!({"mediaId": 4}))]),
            Block::new("core/column")
                .with_inner_blocks(vec![Block::new("core/image").with_attrs(json!({"id": 5}))]),
        ])];

        let found = walk_for_images(&tree, AttachmentResolver::new(&media));
        assert_eq!(ids(&found), vec![4, 5]);
    }

    #[test]
    fn test_duplicates_and_failures_skipped() {
        let media = FakeMedia::with_ids(&[1]);
        let tree = vec![
            Block::new("core/image").with_attrs(json!({"id": 1})),
            Block::new("core/image").with_attrs(json!({"id": 99})),
            Block::new("core/gallery").with_attrs(json!({"ids": [1, 98]})),
            Block::new("core/media-text"),
            Block::new("core/paragraph").with_inner_html("<p>text</p>"),
            Block::freeform(r#"<img src="https://s/uploads/img1.jpg">"#),
        ];

        let found = walk_for_images(&tree, AttachmentResolver::new(&media));
        assert_eq!(ids(&found), vec![1]);
    }

    #[test]
    fn test_empty_tree() {
        let media = FakeMedia::with_ids(&[]);
        assert!(walk_for_images(&[], AttachmentResolver::new(&media)).is_empty());
    }
}
