//! Platform capabilities the controller depends on but does not implement:
//! speech-to-text capture and text-to-speech playback.
//!
//! Either may be missing on a given platform, which is modelled with
//! [`Capability::Unavailable`] rather than by probing at call time.

use std::fmt;
use thiserror::Error;

/// A capability that a platform may or may not provide.
#[derive(Debug)]
pub enum Capability<T> {
    Available(T),
    Unavailable,
}

impl<T> Capability<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(inner) => Capability::Available(inner),
            None => Capability::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            Capability::Available(inner) => Some(inner),
            Capability::Unavailable => None,
        }
    }
}

/// Why a capture ended without a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureErrorKind {
    /// Nothing was said before the platform gave up listening
    NoSpeech,
    /// Capture was cut short, usually by `stop()`
    Aborted,
    /// Any other platform error code (may be empty)
    Other(String),
}

impl CaptureErrorKind {
    /// Map a platform error code such as `"no-speech"` onto a kind.
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => CaptureErrorKind::NoSpeech,
            "aborted" => CaptureErrorKind::Aborted,
            other => CaptureErrorKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CaptureErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureErrorKind::NoSpeech => write!(f, "no-speech"),
            CaptureErrorKind::Aborted => write!(f, "aborted"),
            CaptureErrorKind::Other(code) => write!(f, "{}", code),
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture could not start: {0}")]
    StartFailed(String),
}

/// Speech-to-text capture producing one final transcript per utterance.
///
/// Implementations report what happens after `start()` asynchronously, as
/// capture events sent to the controller's event channel.
pub trait SpeechCapture: Send {
    fn start(&mut self) -> Result<(), CaptureError>;

    fn stop(&mut self);
}

/// Text-to-speech playback. Speaking interrupts anything still being spoken.
pub trait SpeechPlayback: Send {
    fn speak(&mut self, text: &str);
}
