use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    types::{CMCD_VERSION, CmcdKey, ObjectType, StreamType, StreamingFormat},
    value::CmcdValue,
};

/// One CMCD payload.
///
/// Every reserved key is an optional field; `None` means "not meaningful" and the key is
/// never transmitted. Numeric quantities are kept unrounded (kbps, milliseconds) and are
/// rounded by the serializer per key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CmcdData {
    /// Encoded bitrate, kbps.
    pub br: Option<f64>,
    /// Buffer length, ms.
    pub bl: Option<f64>,
    /// Buffer starvation since the previous request.
    pub bs: Option<bool>,
    /// Content id.
    pub cid: Option<String>,
    /// Object duration, ms.
    pub d: Option<f64>,
    /// Deadline, ms. Reserved, never derived.
    pub dl: Option<f64>,
    /// Measured throughput, kbps.
    pub mtp: Option<f64>,
    /// Next object request (relative path). Reserved, never derived.
    pub nor: Option<String>,
    /// Next range request. Reserved, never derived.
    pub nrr: Option<String>,
    /// Object type of the requested resource.
    pub ot: Option<ObjectType>,
    /// Playback rate; 1 is real time.
    pub pr: Option<f64>,
    /// Requested maximum throughput, kbps. Reserved, never derived.
    pub rtp: Option<f64>,
    /// Streaming format of the session's manifest.
    pub sf: Option<StreamingFormat>,
    /// Session id, shared by every request of one playback session.
    pub sid: Option<String>,
    /// VOD or live.
    pub st: Option<StreamType>,
    /// Startup, seek or recovery from a stall.
    pub su: Option<bool>,
    /// Top bitrate of the rendition ladder, kbps.
    pub tb: Option<f64>,
    /// CMCD version; the default version 1 is never transmitted.
    pub v: Option<u32>,
    /// Vendor keys (`com.example-key`). Names colliding with reserved keys are skipped.
    pub custom: BTreeMap<String, CmcdValue>,
}

impl CmcdData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite every field that is present in `base`.
    ///
    /// Session fields are derived once per request and must win over whatever the
    /// request-type specific step produced.
    pub fn merge_from(&mut self, base: &CmcdData) {
        macro_rules! take {
            ($($field:ident),+) => {
                $(if base.$field.is_some() {
                    self.$field.clone_from(&base.$field);
                })+
            };
        }
        take!(br, bl, bs, cid, d, dl, mtp, nor, nrr, ot, pr, rtp, sf, sid, st, su, tb, v);
        for (key, value) in &base.custom {
            self.custom.insert(key.clone(), value.clone());
        }
    }

    /// Drop every reserved key not in `keys`. Custom keys are kept.
    pub fn retain_keys(&mut self, keys: &[CmcdKey]) {
        for key in CmcdKey::ALL {
            if !keys.contains(&key) {
                self.clear(key);
            }
        }
    }

    pub fn clear(&mut self, key: CmcdKey) {
        match key {
            CmcdKey::Bitrate => self.br = None,
            CmcdKey::BufferLength => self.bl = None,
            CmcdKey::BufferStarvation => self.bs = None,
            CmcdKey::ContentId => self.cid = None,
            CmcdKey::Deadline => self.dl = None,
            CmcdKey::Duration => self.d = None,
            CmcdKey::MeasuredThroughput => self.mtp = None,
            CmcdKey::NextObjectRequest => self.nor = None,
            CmcdKey::NextRangeRequest => self.nrr = None,
            CmcdKey::ObjectType => self.ot = None,
            CmcdKey::PlaybackRate => self.pr = None,
            CmcdKey::RequestedThroughput => self.rtp = None,
            CmcdKey::SessionId => self.sid = None,
            CmcdKey::StreamingFormat => self.sf = None,
            CmcdKey::StreamType => self.st = None,
            CmcdKey::Startup => self.su = None,
            CmcdKey::TopBitrate => self.tb = None,
            CmcdKey::Version => self.v = None,
        }
    }

    /// All transmittable entries, formatted per key and sorted by key name.
    ///
    /// Applies the validity rule (no NaN, no empty strings, no `false`) and drops
    /// default-valued `v` and `pr`.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, CmcdValue)> {
        let mut out: BTreeMap<String, CmcdValue> = BTreeMap::new();
        let mut put = |key: CmcdKey, value: Option<CmcdValue>| {
            if let Some(value) = value.filter(CmcdValue::is_meaningful) {
                out.insert(key.as_str().to_owned(), value);
            }
        };

        put(CmcdKey::Bitrate, self.br.and_then(rounded));
        put(CmcdKey::BufferLength, self.bl.and_then(hundreds));
        put(CmcdKey::BufferStarvation, flag(self.bs));
        put(CmcdKey::ContentId, quoted(self.cid.as_deref()));
        put(CmcdKey::Deadline, self.dl.and_then(hundreds));
        put(CmcdKey::Duration, self.d.and_then(rounded));
        put(CmcdKey::MeasuredThroughput, self.mtp.and_then(hundreds));
        put(
            CmcdKey::NextObjectRequest,
            self.nor.clone().map(CmcdValue::UrlSafe),
        );
        put(CmcdKey::NextRangeRequest, quoted(self.nrr.as_deref()));
        put(
            CmcdKey::ObjectType,
            self.ot.map(|ot| CmcdValue::Token(ot.token().to_owned())),
        );
        put(
            CmcdKey::PlaybackRate,
            self.pr
                .filter(|pr| (pr - 1.0).abs() > f64::EPSILON)
                .map(CmcdValue::Decimal),
        );
        put(CmcdKey::RequestedThroughput, self.rtp.and_then(hundreds));
        put(CmcdKey::SessionId, quoted(self.sid.as_deref()));
        put(
            CmcdKey::StreamingFormat,
            self.sf.map(|sf| CmcdValue::Token(sf.token().to_owned())),
        );
        put(
            CmcdKey::StreamType,
            self.st.map(|st| CmcdValue::Token(st.token().to_owned())),
        );
        put(CmcdKey::Startup, flag(self.su));
        put(CmcdKey::TopBitrate, self.tb.and_then(rounded));
        put(
            CmcdKey::Version,
            self.v
                .filter(|v| *v != CMCD_VERSION)
                .map(|v| CmcdValue::Integer(i64::from(v))),
        );

        for (key, value) in &self.custom {
            if CmcdKey::from_name(key).is_some() {
                debug!(key = %key, "custom CMCD key shadows a reserved key, skipping");
                continue;
            }
            if !is_custom_key_name(key) {
                debug!(key = %key, "custom CMCD key has no hyphenated prefix, skipping");
                continue;
            }
            if let CmcdValue::Token(token) = value
                && !is_bare_token(token)
            {
                debug!(key = %key, token = %token, "custom CMCD token needs quoting, skipping");
                continue;
            }
            if value.is_meaningful() {
                out.insert(key.clone(), value.clone());
            }
        }

        out.into_iter().collect()
    }
}

// `com.example-name`: a hyphen, and nothing that would break the key/value syntax.
fn is_custom_key_name(key: &str) -> bool {
    key.contains('-')
        && !key.contains(|c: char| matches!(c, ',' | '=' | '"') || c.is_whitespace())
}

fn is_bare_token(token: &str) -> bool {
    !token.contains(|c: char| matches!(c, ',' | '=' | '"' | '\\') || c.is_whitespace())
}

fn flag(value: Option<bool>) -> Option<CmcdValue> {
    value.filter(|v| *v).map(|_| CmcdValue::Flag)
}

fn quoted(value: Option<&str>) -> Option<CmcdValue> {
    value.map(|v| CmcdValue::Quoted(v.to_owned()))
}

fn rounded(value: f64) -> Option<CmcdValue> {
    non_negative_integer(value.round())
}

fn hundreds(value: f64) -> Option<CmcdValue> {
    non_negative_integer((value / 100.0).round() * 100.0)
}

// Rounded quantities are never negative and saturate instead of overflowing.
#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn non_negative_integer(value: f64) -> Option<CmcdValue> {
    value
        .is_finite()
        .then(|| CmcdValue::Integer(value.clamp(0.0, i64::MAX as f64) as i64))
}
