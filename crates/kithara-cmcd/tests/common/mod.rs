#![allow(dead_code)]

use std::{cell::Cell, collections::HashMap, time::Duration};

use kithara_cmcd::{CmcdError, CmcdResult, MediaType, PlayerInfo, TimeRange};

/// Scriptable player state for driving `CmcdManager` through the public API.
#[derive(Debug)]
pub struct StubPlayer {
    pub bandwidth_bps: f64,
    pub buffered: HashMap<MediaType, Vec<TimeRange>>,
    pub position: Cell<Duration>,
    pub rate: f64,
    pub live: bool,
    pub renditions: Option<HashMap<MediaType, Vec<u64>>>,
    pub detached: bool,
}

impl Default for StubPlayer {
    fn default() -> Self {
        let mut buffered = HashMap::new();
        buffered.insert(
            MediaType::Video,
            vec![TimeRange::new(Duration::ZERO, Duration::from_secs(5))],
        );
        buffered.insert(
            MediaType::Audio,
            vec![TimeRange::new(Duration::ZERO, Duration::from_secs(8))],
        );

        let mut renditions = HashMap::new();
        renditions.insert(MediaType::Video, vec![1_500_000, 4_500_000, 800_000]);
        renditions.insert(MediaType::Audio, vec![64_000, 128_000]);

        Self {
            bandwidth_bps: 12_345_678.0,
            buffered,
            position: Cell::new(Duration::from_secs(3)),
            rate: 1.0,
            live: false,
            renditions: Some(renditions),
            detached: false,
        }
    }
}

impl PlayerInfo for StubPlayer {
    fn bandwidth_estimate_bps(&self) -> f64 {
        self.bandwidth_bps
    }

    fn buffered(&self, media_type: MediaType) -> CmcdResult<Vec<TimeRange>> {
        if self.detached {
            return Err(CmcdError::Player("media source detached".into()));
        }
        Ok(self.buffered.get(&media_type).cloned().unwrap_or_default())
    }

    fn current_time(&self) -> Duration {
        self.position.get()
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn rendition_bandwidths(&self, media_type: MediaType) -> Option<Vec<u64>> {
        self.renditions
            .as_ref()
            .map(|r| r.get(&media_type).cloned().unwrap_or_default())
    }
}

/// Minimal xorshift64 PRNG so generated payloads are identical across runs.
pub struct Xorshift64(u64);

impl Xorshift64 {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    pub fn chance(&mut self) -> bool {
        self.next_u64() % 2 == 0
    }

    /// `f64` in `[0, max)`.
    pub fn below(&mut self, max: f64) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64 * max
    }
}
