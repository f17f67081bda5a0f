use crate::image::ImageRecord;
use crate::store::{AttachmentId, MediaStore};
use tracing::trace;

/// Turns attachment ids into full image records, read-only.
pub struct AttachmentResolver<'a, M: MediaStore + ?Sized> {
    media: &'a M,
}

impl<'a, M: MediaStore + ?Sized> AttachmentResolver<'a, M> {
    pub fn new(media: &'a M) -> Self {
        Self { media }
    }

    /// `None` when the id is zero or does not name a loadable attachment.
    pub fn resolve(&self, attachment_id: AttachmentId) -> Option<ImageRecord> {
        if attachment_id == 0 {
            return None;
        }
        match self.media.attachment_metadata(attachment_id) {
            Some(meta) => Some(ImageRecord::from_attachment(attachment_id, meta)),
            None => {
                trace!(attachment_id, "not an attachment, skipping");
                None
            }
        }
    }

    /// Look a content URL up in the media library and resolve the hit
    pub fn resolve_url(&self, url: &str) -> Option<ImageRecord> {
        self.attachment_id_for_url(url).and_then(|id| self.resolve(id))
    }

    pub fn attachment_id_for_url(&self, url: &str) -> Option<AttachmentId> {
        self.media
            .resolve_url_to_attachment_id(url)
            .filter(|id| *id > 0)
    }
}

impl<M: MediaStore + ?Sized> Clone for AttachmentResolver<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: MediaStore + ?Sized> Copy for AttachmentResolver<'_, M> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AttachmentMetadata;
    use std::collections::HashMap;

    struct FakeMedia {
        attachments: HashMap<AttachmentId, AttachmentMetadata>,
    }

    impl MediaStore for FakeMedia {
        fn attachment_metadata(&self, id: AttachmentId) -> Option<AttachmentMetadata> {
            self.attachments.get(&id).cloned()
        }

        fn resolve_url_to_attachment_id(&self, url: &str) -> Option<AttachmentId> {
            self.attachments
                .iter()
                .find(|(_, meta)| meta.url == url)
                .map(|(id, _)| *id)
        }
    }

    fn media() -> FakeMedia {
        let mut attachments = HashMap::new();
        attachments.insert(
            5,
            AttachmentMetadata {
                url: "https://example.com/uploads/five.jpg".to_string(),
                mime_type: "image/jpeg".to_string(),
                ..AttachmentMetadata::default()
            },
        );
        FakeMedia { attachments }
    }

    #[test]
    fn test_resolve_known_attachment() {
        let media = media();
        let resolver = AttachmentResolver::new(&media);
        let record = resolver.resolve(5).expect("attachment 5 resolves");
        assert_eq!(record.id, Some(5));
        assert_eq!(record.filename, "five.jpg");
    }

    #[test]
    fn test_resolve_unknown_and_zero() {
        let media = media();
        let resolver = AttachmentResolver::new(&media);
        assert!(resolver.resolve(6).is_none());
        assert!(resolver.resolve(0).is_none());
    }

    #[test]
    fn test_resolve_url() {
        let media = media();
        let resolver = AttachmentResolver::new(&media);
        let record = resolver
            .resolve_url("https://example.com/uploads/five.jpg")
            .expect("url resolves");
        assert_eq!(record.id, Some(5));
        assert!(resolver.resolve_url("https://example.com/uploads/six.jpg").is_none());
    }
}
