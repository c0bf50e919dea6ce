use std::time::Duration;

use crate::{error::CmcdResult, types::MediaType};

/// A buffered interval of the media timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub start: Duration,
    pub end: Duration,
}

impl TimeRange {
    #[must_use]
    pub fn new(start: Duration, end: Duration) -> Self {
        Self { start, end }
    }

    /// Inclusive on both ends.
    #[must_use]
    pub fn contains(&self, time: Duration) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Read-only view of the host player.
///
/// CMCD only consumes values other subsystems have already computed: the bandwidth
/// estimator, the buffered-ranges tracker and the manifest model.
#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = PlayerInfoMock)
)]
pub trait PlayerInfo {
    /// Current bandwidth estimate in bits per second.
    fn bandwidth_estimate_bps(&self) -> f64;

    /// Buffered ranges for `media_type`.
    ///
    /// Fails when the player cannot answer, e.g. its media source is detached.
    fn buffered(&self, media_type: MediaType) -> CmcdResult<Vec<TimeRange>>;

    /// Current playhead position.
    fn current_time(&self) -> Duration;

    fn playback_rate(&self) -> f64;

    fn is_live(&self) -> bool;

    /// Bandwidths (bps) of every rendition of `media_type` in the current manifest.
    ///
    /// `None` when no manifest is loaded.
    fn rendition_bandwidths(&self, media_type: MediaType) -> Option<Vec<u64>>;
}
