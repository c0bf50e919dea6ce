use tracing::trace;

use crate::types::StreamingFormat;

/// Long-lived CMCD session state, one per player instance.
#[derive(Clone, Debug)]
pub struct SessionState {
    session_id: String,
    content_id: Option<String>,
    streaming_format: Option<StreamingFormat>,
    playback_started: bool,
    buffering: bool,
    starved: bool,
}

impl SessionState {
    /// A fresh session. Players start out buffering.
    pub fn new(session_id: String, content_id: Option<String>) -> Self {
        Self {
            session_id,
            content_id,
            streaming_format: None,
            playback_started: false,
            buffering: true,
            starved: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    pub fn streaming_format(&self) -> Option<StreamingFormat> {
        self.streaming_format
    }

    pub fn set_streaming_format(&mut self, format: StreamingFormat) {
        self.streaming_format = Some(format);
    }

    pub fn playback_started(&self) -> bool {
        self.playback_started
    }

    pub fn is_buffering(&self) -> bool {
        self.buffering
    }

    pub fn is_starved(&self) -> bool {
        self.starved
    }

    /// Record a buffering transition.
    ///
    /// The first `false` marks playback as started. After that, only an edge into
    /// buffering counts as starvation; repeating the same state is a no-op.
    pub fn set_buffering(&mut self, buffering: bool) {
        if !buffering && !self.playback_started {
            self.playback_started = true;
        }
        if buffering && !self.buffering && self.playback_started {
            trace!("buffer starvation after playback start");
            self.starved = true;
        }
        self.buffering = buffering;
    }

    /// Consume a pending starvation flag.
    pub fn take_starved(&mut self) -> bool {
        std::mem::take(&mut self.starved)
    }
}
