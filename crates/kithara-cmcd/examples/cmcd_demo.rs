//! Print the CMCD data a short playback session would attach to its requests.
//!
//! ```
//! cargo run -p kithara-cmcd --example cmcd_demo [headers]
//! ```

use std::{env::args, error::Error, time::Duration};

use kithara_cmcd::{
    CmcdManager, CmcdOptions, CmcdResult, MediaType, PlayerInfo, Request, SegmentInfo,
    StreamingFormat, TimeRange,
};
use tracing::{info, metadata::LevelFilter};
use tracing_subscriber::EnvFilter;

struct DemoPlayer {
    position: Duration,
}

impl PlayerInfo for DemoPlayer {
    fn bandwidth_estimate_bps(&self) -> f64 {
        8_200_000.0
    }

    fn buffered(&self, _media_type: MediaType) -> CmcdResult<Vec<TimeRange>> {
        Ok(vec![TimeRange::new(Duration::ZERO, Duration::from_secs(24))])
    }

    fn current_time(&self) -> Duration {
        self.position
    }

    fn playback_rate(&self) -> f64 {
        1.0
    }

    fn is_live(&self) -> bool {
        false
    }

    fn rendition_bandwidths(&self, media_type: MediaType) -> Option<Vec<u64>> {
        match media_type {
            MediaType::Video => Some(vec![800_000, 2_500_000, 6_000_000]),
            MediaType::Audio => Some(vec![96_000, 192_000]),
            MediaType::Text | MediaType::Image => Some(Vec::new()),
        }
    }
}

fn print_request(label: &str, request: &Request) {
    info!("{label}: {}", request.uris.join(" | "));
    for (name, value) in request.headers.iter() {
        info!("    {name}: {value}");
    }
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::default()
                .add_directive("kithara_cmcd=debug".parse()?)
                .add_directive(LevelFilter::INFO.into()),
        )
        .with_line_number(false)
        .with_file(false)
        .init();

    let use_headers = args().nth(1).is_some_and(|mode| mode == "headers");
    let options = CmcdOptions::new()
        .with_headers(use_headers)
        .with_content_id("big-buck-bunny");
    let mut cmcd = CmcdManager::new(
        options,
        DemoPlayer {
            position: Duration::from_secs(3),
        },
    );

    let mut manifest = Request::new("https://cdn.example.com/bbb/manifest.mpd");
    cmcd.apply_manifest_data(&mut manifest, StreamingFormat::Dash);
    print_request("manifest", &manifest);

    let init = SegmentInfo::new(MediaType::Video, Duration::ZERO)
        .with_init(true)
        .with_codecs("avc1.64001f");
    let mut request = Request::new("https://cdn.example.com/bbb/v/init.mp4");
    cmcd.apply_segment_data(&mut request, &init);
    print_request("init", &request);

    cmcd.set_buffering(false);

    let segment = SegmentInfo::new(MediaType::Video, Duration::from_secs(4))
        .with_mime_type("video/mp4")
        .with_codecs("avc1.64001f")
        .with_bandwidth(2_500_000);
    let mut request = Request::with_uris([
        "https://cdn-a.example.com/bbb/v/1.m4s",
        "https://cdn-b.example.com/bbb/v/1.m4s?token=abc",
    ]);
    cmcd.apply_segment_data(&mut request, &segment);
    print_request("segment", &request);

    // Stall after playback started: the next video request reports it.
    cmcd.set_buffering(true);
    let mut request = Request::new("https://cdn.example.com/bbb/v/2.m4s");
    cmcd.apply_segment_data(&mut request, &segment);
    print_request("segment after stall", &request);

    info!(
        "subtitles: {}",
        cmcd.append_text_track_data("https://cdn.example.com/bbb/en.vtt")
    );

    Ok(())
}
