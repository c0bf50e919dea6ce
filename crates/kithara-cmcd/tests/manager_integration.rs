mod common;

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use common::StubPlayer;
use kithara_cmcd::{
    ApplyOutcome, CmcdManager, CmcdOptions, CmcdValue, ErrorCode, MediaType, Request, SegmentInfo,
    StreamingFormat, TimeRange, decode_query,
};
use rstest::{fixture, rstest};

#[fixture]
fn options() -> CmcdOptions {
    CmcdOptions::new()
        .with_session_id("6e2fb550-c457-11e9-bb97-0800200c9a66")
        .with_content_id("faec5fc2-ac30-11ea-bb37-0242ac130002")
}

fn video() -> SegmentInfo {
    SegmentInfo::new(MediaType::Video, Duration::from_millis(4004))
        .with_mime_type("video/mp4")
        .with_codecs("avc1.4d401f")
        .with_bandwidth(1_500_000)
}

fn query_entries(uri: &str) -> Vec<(String, CmcdValue)> {
    let (_, query) = uri.split_once('?').expect("query appended");
    decode_query(query).expect("valid CMCD query")
}

fn value_of<'a>(entries: &'a [(String, CmcdValue)], key: &str) -> Option<&'a CmcdValue> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

#[rstest]
fn playback_session_in_query_mode(options: CmcdOptions) {
    let mut cmcd = CmcdManager::new(options, StubPlayer::default());

    let mut manifest = Request::new("https://cdn.example.com/movie/manifest.mpd");
    assert_eq!(
        cmcd.apply_manifest_data(&mut manifest, StreamingFormat::Dash),
        ApplyOutcome::Applied
    );
    let entries = query_entries(&manifest.uris[0]);
    assert_eq!(value_of(&entries, "ot"), Some(&CmcdValue::Token("m".into())));
    assert_eq!(value_of(&entries, "su"), Some(&CmcdValue::Flag));
    assert_eq!(value_of(&entries, "sf"), Some(&CmcdValue::Token("d".into())));
    assert_eq!(value_of(&entries, "mtp"), Some(&CmcdValue::Integer(12_300)));

    cmcd.set_buffering(false);

    let mut segment = Request::new("https://cdn.example.com/movie/v/5.m4s");
    cmcd.apply_segment_data(&mut segment, &video());
    let entries = query_entries(&segment.uris[0]);
    let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        vec!["bl", "br", "cid", "d", "mtp", "ot", "sf", "sid", "st", "tb"]
    );
    assert_eq!(value_of(&entries, "bl"), Some(&CmcdValue::Integer(2000)));
    assert_eq!(value_of(&entries, "d"), Some(&CmcdValue::Integer(4004)));
    assert_eq!(value_of(&entries, "tb"), Some(&CmcdValue::Integer(4500)));
}

#[rstest]
fn rebuffering_marks_next_video_request_only(options: CmcdOptions) {
    let mut cmcd = CmcdManager::new(options, StubPlayer::default());
    cmcd.set_buffering(false);
    cmcd.set_buffering(true);

    let mut first = Request::new("https://cdn.example.com/v/1.m4s");
    cmcd.apply_segment_data(&mut first, &video());
    let entries = query_entries(&first.uris[0]);
    assert_eq!(value_of(&entries, "bs"), Some(&CmcdValue::Flag));
    assert_eq!(value_of(&entries, "su"), Some(&CmcdValue::Flag));

    cmcd.set_buffering(false);
    for n in 2..4 {
        let mut next = Request::new(format!("https://cdn.example.com/v/{n}.m4s"));
        cmcd.apply_segment_data(&mut next, &video());
        let entries = query_entries(&next.uris[0]);
        assert_eq!(value_of(&entries, "bs"), None);
        assert_eq!(value_of(&entries, "su"), None);
    }
}

#[rstest]
fn muxed_segment_consumes_starvation(options: CmcdOptions) {
    let mut cmcd = CmcdManager::new(options.with_headers(true), StubPlayer::default());
    cmcd.set_buffering(false);
    cmcd.set_buffering(true);

    let muxed = video().with_codecs("avc1.4d401f,mp4a.40.2");
    let mut request = Request::new("https://cdn.example.com/av/1.ts");
    cmcd.apply_segment_data(&mut request, &muxed);

    assert_eq!(request.headers.get("CMCD-Status"), Some("bs"));
    let object = request.headers.get("CMCD-Object").expect("object header");
    assert!(object.contains("ot=av"), "{object}");
    assert!(!cmcd.state().is_starved());
}

#[rstest]
fn live_stream_and_fast_playback(options: CmcdOptions) {
    let player = StubPlayer {
        live: true,
        rate: 2.0,
        ..StubPlayer::default()
    };
    let mut cmcd = CmcdManager::new(options.with_headers(true), player);
    let mut request = Request::new("https://cdn.example.com/live/a/9.m4s");

    let audio = SegmentInfo::new(MediaType::Audio, Duration::from_secs(2)).with_bandwidth(64_000);
    cmcd.apply_segment_data(&mut request, &audio);

    let session = request.headers.get("CMCD-Session").expect("session header");
    assert!(session.contains("pr=2"), "{session}");
    assert!(session.ends_with("st=l"), "{session}");
    assert_eq!(
        request.headers.get("CMCD-Object"),
        Some("br=64,d=2000,ot=a,tb=128")
    );
}

#[rstest]
fn no_manifest_and_no_buffer_omit_fields(options: CmcdOptions) {
    let player = StubPlayer {
        renditions: None,
        ..StubPlayer::default()
    };
    let mut cmcd = CmcdManager::new(options, player);
    let mut request = Request::new("https://cdn.example.com/v/1.m4s");

    // Playhead moved past the only buffered range.
    cmcd.player().position.set(Duration::from_secs(6));
    cmcd.apply_segment_data(&mut request, &video());

    let entries = query_entries(&request.uris[0]);
    assert_eq!(value_of(&entries, "bl"), None);
    assert_eq!(value_of(&entries, "tb"), None);
    assert_eq!(value_of(&entries, "br"), Some(&CmcdValue::Integer(1500)));
}

#[rstest]
fn init_and_caption_segments_skip_media_fields(options: CmcdOptions) {
    let mut cmcd = CmcdManager::new(options, StubPlayer::default());

    let mut init = Request::new("https://cdn.example.com/v/init.mp4");
    cmcd.apply_segment_data(&mut init, &video().with_init(true));
    let entries = query_entries(&init.uris[0]);
    assert_eq!(value_of(&entries, "ot"), Some(&CmcdValue::Token("i".into())));
    assert_eq!(value_of(&entries, "br"), None);
    assert_eq!(value_of(&entries, "bl"), None);

    let mut caption = Request::new("https://cdn.example.com/t/1.vtt");
    let text = SegmentInfo::new(MediaType::Text, Duration::from_secs(10)).with_mime_type("text/vtt");
    cmcd.apply_segment_data(&mut caption, &text);
    let entries = query_entries(&caption.uris[0]);
    assert_eq!(value_of(&entries, "ot"), Some(&CmcdValue::Token("c".into())));
    assert_eq!(value_of(&entries, "tb"), None);
}

#[rstest]
fn timed_text_segment_carries_buffer_and_top_bitrate(options: CmcdOptions) {
    let mut player = StubPlayer::default();
    player.buffered.insert(
        MediaType::Text,
        vec![TimeRange::new(Duration::ZERO, Duration::from_secs(30))],
    );
    if let Some(renditions) = player.renditions.as_mut() {
        renditions.insert(MediaType::Text, vec![2_000, 5_000]);
    }
    let mut cmcd = CmcdManager::new(options, player);
    let mut request = Request::new("https://cdn.example.com/t/1.m4s");
    let text = SegmentInfo::new(MediaType::Text, Duration::from_secs(6))
        .with_mime_type("application/mp4")
        .with_bandwidth(3_000);

    cmcd.apply_segment_data(&mut request, &text);

    let entries = query_entries(&request.uris[0]);
    assert_eq!(value_of(&entries, "ot"), Some(&CmcdValue::Token("tt".into())));
    assert_eq!(value_of(&entries, "bl"), Some(&CmcdValue::Integer(27_000)));
    assert_eq!(value_of(&entries, "br"), Some(&CmcdValue::Integer(3)));
    assert_eq!(value_of(&entries, "tb"), Some(&CmcdValue::Integer(5)));
}

#[rstest]
#[case::huge(1e22, i64::MAX)]
#[case::negative(-5_000_000.0, 0)]
fn out_of_range_bandwidth_estimate_is_clamped(
    options: CmcdOptions,
    #[case] bandwidth_bps: f64,
    #[case] expected: i64,
) {
    let player = StubPlayer {
        bandwidth_bps,
        ..StubPlayer::default()
    };
    let mut cmcd = CmcdManager::new(options, player);
    let mut request = Request::new("https://cdn.example.com/movie/manifest.mpd");

    assert_eq!(
        cmcd.apply_manifest_data(&mut request, StreamingFormat::Dash),
        ApplyOutcome::Applied
    );
    let entries = query_entries(&request.uris[0]);
    assert_eq!(value_of(&entries, "mtp"), Some(&CmcdValue::Integer(expected)));
}

#[rstest]
fn detached_player_degrades_without_touching_request(options: CmcdOptions) {
    let player = StubPlayer {
        detached: true,
        ..StubPlayer::default()
    };
    let mut cmcd = CmcdManager::new(options, player);
    let mut request = Request::with_uris([
        "https://a.example.com/v/1.m4s",
        "https://b.example.com/v/1.m4s",
    ]);
    let before = request.clone();

    let outcome = cmcd.apply_segment_data(&mut request, &video());

    assert_eq!(outcome, ApplyOutcome::Degraded(ErrorCode::PlayerState));
    assert_eq!(request, before);

    // Requests that do not need buffered ranges still work.
    let mut text = Request::new("https://a.example.com/subs.vtt");
    assert_eq!(cmcd.apply_text_data(&mut text), ApplyOutcome::Applied);
}

#[rstest]
fn disabled_leaves_everything_byte_for_byte(options: CmcdOptions) {
    let mut cmcd = CmcdManager::new(options.with_enabled(false), StubPlayer::default());
    assert!(!cmcd.is_enabled());
    let mut request = Request::with_uris(["https://a/x.mpd?x=1", "offline:x"]);
    let before = request.clone();

    cmcd.apply_manifest_data(&mut request, StreamingFormat::Dash);
    cmcd.apply_segment_data(&mut request, &video());
    cmcd.apply_text_data(&mut request);
    cmcd.apply_license_data(&mut request);

    assert_eq!(request, before);
    assert_eq!(cmcd.append_src_data("https://a/x.mp4", "video/mp4"), "https://a/x.mp4");
    assert_eq!(cmcd.append_text_track_data("https://a/x.vtt"), "https://a/x.vtt");
}

#[rstest]
fn offline_uris_are_never_rewritten(options: CmcdOptions) {
    let mut cmcd = CmcdManager::new(options, StubPlayer::default());
    let mut request = Request::with_uris(["offline:stored/0/5", "https://cdn/v/5.m4s"]);

    cmcd.apply_segment_data(&mut request, &video());

    assert_eq!(request.uris[0], "offline:stored/0/5");
    assert!(request.uris[1].starts_with("https://cdn/v/5.m4s?CMCD="));
    assert_eq!(cmcd.append_src_data("offline:stored/0", "video/mp4"), "offline:stored/0");
}

#[rstest]
fn custom_keys_ride_along(options: CmcdOptions) {
    let options = options
        .with_headers(true)
        .with_custom_key("com.example-device", CmcdValue::Quoted("tv".into()));
    let mut cmcd = CmcdManager::new(options, StubPlayer::default());
    assert!(cmcd.options().use_headers);
    let mut request = Request::new("https://cdn/m.mpd");

    cmcd.apply_manifest_data(&mut request, StreamingFormat::Hls);

    assert_eq!(
        request.headers.get("CMCD-Request"),
        Some("com.example-device=\"tv\",mtp=12300,su")
    );
}

#[test]
fn session_id_is_generated_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let options = CmcdOptions::new().with_session_id_provider(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        "generated-sid".into()
    }));
    let mut cmcd = CmcdManager::new(options, StubPlayer::default());

    for n in 0..3 {
        let mut request = Request::new(format!("https://cdn/v/{n}.m4s"));
        cmcd.apply_segment_data(&mut request, &video());
        let entries = query_entries(&request.uris[0]);
        assert_eq!(
            value_of(&entries, "sid"),
            Some(&CmcdValue::Quoted("generated-sid".into()))
        );
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cmcd.state().session_id(), "generated-sid");
}
