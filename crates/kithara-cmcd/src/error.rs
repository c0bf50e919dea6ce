use thiserror::Error;

/// CMCD derivation and decoding errors.
///
/// None of these ever reach the request pipeline: the apply entry points swallow
/// them and leave the request untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CmcdError {
    #[error("Player state unavailable: {0}")]
    Player(String),

    #[error("Invalid header value for {name}: {value:?}")]
    InvalidHeaderValue { name: String, value: String },

    #[error("Malformed CMCD data: {0}")]
    Decode(String),
}

impl CmcdError {
    /// Stable failure class, used to report each class once.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Player(_) => ErrorCode::PlayerState,
            Self::InvalidHeaderValue { .. } => ErrorCode::HeaderValue,
            Self::Decode(_) => ErrorCode::Decode,
        }
    }
}

/// Failure class of a [`CmcdError`]; each class is logged at `warn` only once per manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Player state could not be read.
    PlayerState,
    /// A header group is not a legal HTTP field value.
    HeaderValue,
    /// Serialized CMCD text could not be parsed.
    Decode,
}

/// What an apply call did to its request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// CMCD data was attached (possibly nothing, if every field was empty).
    Applied,
    /// CMCD is disabled; the request was not looked at.
    Disabled,
    /// Derivation failed; the request is unchanged.
    Degraded(ErrorCode),
}

pub type CmcdResult<T> = Result<T, CmcdError>;
