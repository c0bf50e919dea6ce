use std::time::Duration;

use crate::types::{MediaType, ObjectType};

/// Per-request context for a media segment.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentInfo {
    pub media_type: MediaType,
    pub is_init_segment: bool,
    pub duration: Duration,
    pub mime_type: String,
    /// Comma-separated codec list, e.g. `avc1.64001f,mp4a.40.2`.
    pub codecs: String,
    /// Encoded bitrate of this segment's rendition, bps.
    pub bandwidth: Option<u64>,
}

impl SegmentInfo {
    pub fn new(media_type: MediaType, duration: Duration) -> Self {
        Self {
            media_type,
            is_init_segment: false,
            duration,
            mime_type: String::new(),
            codecs: String::new(),
            bandwidth: None,
        }
    }

    pub fn with_init(mut self, is_init_segment: bool) -> Self {
        self.is_init_segment = is_init_segment;
        self
    }

    pub fn with_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_codecs<S: Into<String>>(mut self, codecs: S) -> Self {
        self.codecs = codecs.into();
        self
    }

    pub fn with_bandwidth(mut self, bandwidth: u64) -> Self {
        self.bandwidth = Some(bandwidth);
        self
    }

    /// Resolve `ot` for this segment. `None` for media types CMCD has no object type for.
    #[must_use]
    pub fn object_type(&self) -> Option<ObjectType> {
        if self.is_init_segment {
            return Some(ObjectType::Init);
        }
        match self.media_type {
            MediaType::Video if self.codecs.split(',').count() > 1 => Some(ObjectType::Muxed),
            MediaType::Video => Some(ObjectType::Video),
            MediaType::Audio => Some(ObjectType::Audio),
            MediaType::Text if self.mime_type == "application/mp4" => Some(ObjectType::TimedText),
            MediaType::Text => Some(ObjectType::Caption),
            MediaType::Image => None,
        }
    }
}
