use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::{
    data::CmcdData,
    error::{ApplyOutcome, CmcdError, CmcdResult, ErrorCode},
    options::CmcdOptions,
    player::PlayerInfo,
    request::Request,
    segment::SegmentInfo,
    serializer::{to_headers, to_query},
    state::SessionState,
    types::{CMCD_VERSION, MediaType, ObjectType, StreamType, StreamingFormat},
    uri::append_query_to_uri,
};

/// Attaches CMCD data to outbound requests.
///
/// Call [`set_buffering`](Self::set_buffering) on every buffering transition and one of
/// the `apply_*`/`append_*` methods right before a request is dispatched. None of them
/// fail: on any internal error the request goes out without CMCD data.
pub struct CmcdManager<P: PlayerInfo> {
    options: CmcdOptions,
    player: P,
    state: SessionState,
    /// Failure classes already logged at `warn`.
    reported: HashSet<ErrorCode>,
}

impl<P: PlayerInfo> CmcdManager<P> {
    pub fn new(options: CmcdOptions, player: P) -> Self {
        let state = SessionState::new(options.resolve_session_id(), options.content_id.clone());
        debug!(
            enabled = options.enabled,
            use_headers = options.use_headers,
            session_id = state.session_id(),
            "cmcd: manager created"
        );
        Self {
            options,
            player,
            state,
            reported: HashSet::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn options(&self) -> &CmcdOptions {
        &self.options
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn set_buffering(&mut self, buffering: bool) {
        self.state.set_buffering(buffering);
    }

    /// Manifest request: `ot=m`, `su` until playback starts. Records the streaming format.
    pub fn apply_manifest_data(
        &mut self,
        request: &mut Request,
        format: StreamingFormat,
    ) -> ApplyOutcome {
        if !self.options.enabled {
            return ApplyOutcome::Disabled;
        }
        self.state.set_streaming_format(format);
        let data = CmcdData {
            ot: Some(ObjectType::Manifest),
            su: Some(!self.state.playback_started()),
            ..CmcdData::default()
        };
        let result = self.apply(request, data);
        self.guard(result)
    }

    /// Media segment request.
    pub fn apply_segment_data(
        &mut self,
        request: &mut Request,
        segment: &SegmentInfo,
    ) -> ApplyOutcome {
        if !self.options.enabled {
            return ApplyOutcome::Disabled;
        }
        let result = self
            .segment_data(segment)
            .and_then(|data| self.apply(request, data));
        self.guard(result)
    }

    /// Out-of-band subtitle request.
    pub fn apply_text_data(&mut self, request: &mut Request) -> ApplyOutcome {
        if !self.options.enabled {
            return ApplyOutcome::Disabled;
        }
        let data = CmcdData {
            ot: Some(ObjectType::Caption),
            su: Some(true),
            ..CmcdData::default()
        };
        let result = self.apply(request, data);
        self.guard(result)
    }

    /// DRM license request.
    pub fn apply_license_data(&mut self, request: &mut Request) -> ApplyOutcome {
        if !self.options.enabled {
            return ApplyOutcome::Disabled;
        }
        let data = CmcdData {
            ot: Some(ObjectType::Key),
            ..CmcdData::default()
        };
        let result = self.apply(request, data);
        self.guard(result)
    }

    /// Stream loaded directly by URI (no manifest). Always query delivery.
    pub fn append_src_data(&self, uri: &str, mime_type: &str) -> String {
        self.append_uri_data(uri, ObjectType::from_mime_type(mime_type))
    }

    /// Side-car text track URI. Always query delivery.
    pub fn append_text_track_data(&self, uri: &str) -> String {
        self.append_uri_data(uri, Some(ObjectType::Caption))
    }

    fn append_uri_data(&self, uri: &str, ot: Option<ObjectType>) -> String {
        if !self.options.enabled {
            return uri.to_owned();
        }
        let mut data = self.create_data();
        data.ot = ot;
        data.su = Some(true);
        self.filter(&mut data);
        append_query_to_uri(uri, &to_query(&data))
    }

    /// Session fields attached to every payload.
    fn create_data(&self) -> CmcdData {
        CmcdData {
            v: Some(CMCD_VERSION),
            sf: self.state.streaming_format(),
            sid: Some(self.state.session_id().to_owned()),
            cid: self.state.content_id().map(str::to_owned),
            mtp: finite(self.player.bandwidth_estimate_bps() / 1000.0),
            custom: self.options.custom_keys.clone(),
            ..CmcdData::default()
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn segment_data(&self, segment: &SegmentInfo) -> CmcdResult<CmcdData> {
        let ot = segment.object_type();
        let mut data = CmcdData {
            ot,
            d: Some(segment.duration.as_secs_f64() * 1000.0),
            st: Some(StreamType::from_live(self.player.is_live())),
            ..CmcdData::default()
        };

        if ot.is_some_and(ObjectType::is_media) {
            data.bl = self.buffer_length_ms(segment.media_type)?;
            data.br = segment.bandwidth.map(|bw| bw as f64 / 1000.0);
            data.tb = self.top_bandwidth_kbps(segment.media_type);
        }
        Ok(data)
    }

    /// Distance from the playhead to the end of the buffered range containing it.
    fn buffer_length_ms(&self, media_type: MediaType) -> CmcdResult<Option<f64>> {
        let now = self.player.current_time();
        let ranges = self.player.buffered(media_type)?;
        Ok(ranges
            .iter()
            .find(|range| range.contains(now))
            .map(|range| range.end.saturating_sub(now).as_secs_f64() * 1000.0))
    }

    #[expect(clippy::cast_precision_loss)]
    fn top_bandwidth_kbps(&self, media_type: MediaType) -> Option<f64> {
        self.player
            .rendition_bandwidths(media_type)?
            .into_iter()
            .max()
            .map(|bw| bw as f64 / 1000.0)
    }

    fn filter(&self, data: &mut CmcdData) {
        if let Some(keys) = &self.options.include_keys {
            data.retain_keys(keys);
        }
    }

    /// Final assembly and delivery. Nothing is written to `request` unless every step succeeds.
    fn apply(&mut self, request: &mut Request, mut data: CmcdData) -> CmcdResult<()> {
        data.merge_from(&self.create_data());
        data.pr = finite(self.player.playback_rate());

        let starvation = self.state.is_starved() && data.ot.is_some_and(ObjectType::is_video);
        if starvation {
            data.bs = Some(true);
            data.su = Some(true);
        }
        if data.su.is_none() {
            data.su = Some(self.state.is_buffering());
        }
        self.filter(&mut data);

        debug!(
            ot = ?data.ot,
            use_headers = self.options.use_headers,
            starvation,
            "cmcd: applying request data"
        );

        if self.options.use_headers {
            let headers = to_headers(&data);
            headers.validate()?;
            request.headers.extend(headers);
        } else {
            let query = to_query(&data);
            if !query.is_empty() {
                for uri in &mut request.uris {
                    *uri = append_query_to_uri(uri, &query);
                }
            }
        }

        if starvation {
            self.state.take_starved();
        }
        Ok(())
    }

    fn guard(&mut self, result: CmcdResult<()>) -> ApplyOutcome {
        match result {
            Ok(()) => ApplyOutcome::Applied,
            Err(error) => {
                let code = error.code();
                self.report(&error);
                ApplyOutcome::Degraded(code)
            }
        }
    }

    fn report(&mut self, error: &CmcdError) {
        let code = error.code();
        if self.reported.insert(code) {
            warn!(?code, %error, "cmcd: data not applied, sending request without it");
        } else {
            trace!(?code, %error, "cmcd: data not applied (already reported)");
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
