//! Common Media Client Data (CTA-5004) for streaming requests.
//!
//! This crate derives the CMCD payload for manifest, segment, text and license
//! requests from the player's current state and encodes it either as the four
//! `CMCD-*` headers or as a single `CMCD` query parameter.
//!
//! ## Features
//!
//! - **Session tracking**: startup and buffer-starvation signals from buffering transitions
//! - **Per-request derivation**: object type, duration, buffer length, bitrates
//! - **Deterministic wire format**: lexicographic keys, per-key rounding, grouped headers
//! - **Best effort**: enrichment never fails a request
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use kithara_cmcd::{
//!     CmcdManager, CmcdOptions, CmcdResult, MediaType, PlayerInfo, Request, SegmentInfo,
//!     StreamingFormat, TimeRange,
//! };
//!
//! struct Player;
//!
//! impl PlayerInfo for Player {
//!     fn bandwidth_estimate_bps(&self) -> f64 {
//!         4_000_000.0
//!     }
//!
//!     fn buffered(&self, _media_type: MediaType) -> CmcdResult<Vec<TimeRange>> {
//!         Ok(vec![TimeRange::new(Duration::ZERO, Duration::from_secs(12))])
//!     }
//!
//!     fn current_time(&self) -> Duration {
//!         Duration::from_secs(2)
//!     }
//!
//!     fn playback_rate(&self) -> f64 {
//!         1.0
//!     }
//!
//!     fn is_live(&self) -> bool {
//!         false
//!     }
//!
//!     fn rendition_bandwidths(&self, _media_type: MediaType) -> Option<Vec<u64>> {
//!         Some(vec![800_000, 2_400_000])
//!     }
//! }
//!
//! let options = CmcdOptions::new().with_session_id("session").with_headers(true);
//! let mut cmcd = CmcdManager::new(options, Player);
//!
//! let mut manifest = Request::new("https://cdn.example.com/master.m3u8");
//! cmcd.apply_manifest_data(&mut manifest, StreamingFormat::Hls);
//! cmcd.set_buffering(false);
//!
//! let segment = SegmentInfo::new(MediaType::Audio, Duration::from_secs(6))
//!     .with_codecs("mp4a.40.2")
//!     .with_bandwidth(128_000);
//! let mut request = Request::new("https://cdn.example.com/audio/1.m4s");
//! cmcd.apply_segment_data(&mut request, &segment);
//!
//! assert_eq!(request.headers.get("CMCD-Object"), Some("br=128,d=6000,ot=a,tb=2400"));
//! assert_eq!(request.headers.get("CMCD-Request"), Some("bl=10000,mtp=4000"));
//! ```

#![forbid(unsafe_code)]

mod data;
mod error;
mod manager;
mod options;
mod player;
mod request;
mod segment;
mod state;
mod types;
mod uri;
mod value;

pub mod serializer;

pub use data::CmcdData;
pub use error::{ApplyOutcome, CmcdError, CmcdResult, ErrorCode};
pub use manager::CmcdManager;
pub use options::{CmcdOptions, SessionIdProvider};
#[cfg(any(test, feature = "test-utils"))]
pub use player::PlayerInfoMock;
pub use player::{PlayerInfo, TimeRange};
pub use request::{Headers, Request};
pub use segment::SegmentInfo;
pub use serializer::{decode_query, parse, serialize, to_headers, to_query};
pub use state::SessionState;
pub use types::{
    CMCD_VERSION, CmcdKey, HeaderGroup, MediaType, ObjectType, StreamType, StreamingFormat,
};
pub use uri::{OFFLINE_SCHEME, append_query_to_uri, is_offline_uri};
pub use value::CmcdValue;
