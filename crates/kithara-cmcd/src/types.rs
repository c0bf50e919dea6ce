use std::fmt;

/// CMCD version emitted by this crate. Version 1 is the default and is never serialized.
pub const CMCD_VERSION: u32 = 1;

/// Classification of the requested resource (`ot`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Manifest,
    Audio,
    Video,
    Muxed,
    Init,
    Caption,
    TimedText,
    Key,
    Other,
}

impl ObjectType {
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Manifest => "m",
            Self::Audio => "a",
            Self::Video => "v",
            Self::Muxed => "av",
            Self::Init => "i",
            Self::Caption => "c",
            Self::TimedText => "tt",
            Self::Key => "k",
            Self::Other => "o",
        }
    }

    /// Object types for which buffer length and bitrates are reported.
    #[must_use]
    pub fn is_media(self) -> bool {
        matches!(
            self,
            Self::Video | Self::Audio | Self::Muxed | Self::TimedText
        )
    }

    /// Object types that consume a pending buffer-starvation flag.
    #[must_use]
    pub fn is_video(self) -> bool {
        matches!(self, Self::Video | Self::Muxed)
    }

    /// Object type for a resource loaded directly by mime type (no manifest).
    #[must_use]
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type.to_ascii_lowercase().as_str() {
            "video/webm" | "video/mp4" => Some(Self::Muxed),
            "application/x-mpegurl" => Some(Self::Manifest),
            _ => None,
        }
    }
}

/// Stream type (`st`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamType {
    Vod,
    Live,
}

impl StreamType {
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Vod => "v",
            Self::Live => "l",
        }
    }

    #[must_use]
    pub fn from_live(is_live: bool) -> Self {
        if is_live { Self::Live } else { Self::Vod }
    }
}

/// Streaming format (`sf`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamingFormat {
    Dash,
    Hls,
    Smooth,
    Other,
}

impl StreamingFormat {
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Dash => "d",
            Self::Hls => "h",
            Self::Smooth => "s",
            Self::Other => "o",
        }
    }
}

/// Media type of a segment request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
    Video,
    Audio,
    Text,
    Image,
}

/// The four CTA-5004 header groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeaderGroup {
    Object,
    Request,
    Session,
    Status,
}

impl HeaderGroup {
    pub const ALL: [Self; 4] = [Self::Object, Self::Request, Self::Session, Self::Status];

    #[must_use]
    pub fn header_name(self) -> &'static str {
        match self {
            Self::Object => "CMCD-Object",
            Self::Request => "CMCD-Request",
            Self::Session => "CMCD-Session",
            Self::Status => "CMCD-Status",
        }
    }

    /// Group for an arbitrary key name. Keys outside the reserved set travel with `Request`.
    #[must_use]
    pub fn for_key_name(name: &str) -> Self {
        CmcdKey::from_name(name).map_or(Self::Request, CmcdKey::group)
    }
}

/// Reserved CMCD keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CmcdKey {
    Bitrate,
    BufferLength,
    BufferStarvation,
    ContentId,
    Deadline,
    Duration,
    MeasuredThroughput,
    NextObjectRequest,
    NextRangeRequest,
    ObjectType,
    PlaybackRate,
    RequestedThroughput,
    SessionId,
    StreamingFormat,
    StreamType,
    Startup,
    TopBitrate,
    Version,
}

impl CmcdKey {
    pub const ALL: [Self; 18] = [
        Self::Bitrate,
        Self::BufferLength,
        Self::BufferStarvation,
        Self::ContentId,
        Self::Deadline,
        Self::Duration,
        Self::MeasuredThroughput,
        Self::NextObjectRequest,
        Self::NextRangeRequest,
        Self::ObjectType,
        Self::PlaybackRate,
        Self::RequestedThroughput,
        Self::SessionId,
        Self::StreamingFormat,
        Self::StreamType,
        Self::Startup,
        Self::TopBitrate,
        Self::Version,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bitrate => "br",
            Self::BufferLength => "bl",
            Self::BufferStarvation => "bs",
            Self::ContentId => "cid",
            Self::Deadline => "dl",
            Self::Duration => "d",
            Self::MeasuredThroughput => "mtp",
            Self::NextObjectRequest => "nor",
            Self::NextRangeRequest => "nrr",
            Self::ObjectType => "ot",
            Self::PlaybackRate => "pr",
            Self::RequestedThroughput => "rtp",
            Self::SessionId => "sid",
            Self::StreamingFormat => "sf",
            Self::StreamType => "st",
            Self::Startup => "su",
            Self::TopBitrate => "tb",
            Self::Version => "v",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    #[must_use]
    pub fn group(self) -> HeaderGroup {
        match self {
            Self::Bitrate | Self::Duration | Self::ObjectType | Self::TopBitrate => {
                HeaderGroup::Object
            }
            Self::BufferLength
            | Self::Deadline
            | Self::MeasuredThroughput
            | Self::NextObjectRequest
            | Self::NextRangeRequest
            | Self::Startup => HeaderGroup::Request,
            Self::ContentId
            | Self::PlaybackRate
            | Self::StreamingFormat
            | Self::SessionId
            | Self::StreamType
            | Self::Version => HeaderGroup::Session,
            Self::BufferStarvation | Self::RequestedThroughput => HeaderGroup::Status,
        }
    }
}

impl fmt::Display for CmcdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
