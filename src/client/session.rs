//! # Voice Session State
//!
//! Transient client-side state for one run of the voice client. A session is
//! created when the client starts, mutated only by the
//! [`VoiceController`](super::controller::VoiceController), and dropped on teardown.
//!
//! ## History
//! Recent interactions are kept most-recent-first and capped at
//! [`HISTORY_CAPACITY`]; pushing onto a full history evicts the oldest entry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

pub const HISTORY_CAPACITY: usize = 6;

pub const INITIAL_RESPONSE: &str = "Click the button to enter voice mode.";

/// One answered query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub query: String,
    pub reply: String,
    pub answered_at: DateTime<Utc>,
}

/// Bounded, most-recent-first list of interactions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct History {
    entries: VecDeque<Interaction>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an interaction as the newest entry, evicting the oldest past capacity.
    pub fn push(&mut self, query: impl Into<String>, reply: impl Into<String>) {
        self.entries.push_front(Interaction {
            query: query.into(),
            reply: reply.into(),
            answered_at: Utc::now(),
        });
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Interaction> {
        self.entries.front()
    }
}

/// What the session is doing right now, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Listening,
    Processing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Listening => write!(f, "Listening…"),
            Phase::Processing => write!(f, "Processing…"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VoiceSession {
    pub(crate) voice_mode: bool,
    pub(crate) listening: bool,
    pub(crate) processing: bool,
    pub(crate) transcript: Option<String>,
    pub(crate) response_text: String,
    pub(crate) error: Option<String>,
    pub(crate) history: History,
}

impl Default for VoiceSession {
    fn default() -> Self {
        Self {
            voice_mode: false,
            listening: false,
            processing: false,
            transcript: None,
            response_text: INITIAL_RESPONSE.to_string(),
            error: None,
            history: History::new(),
        }
    }
}

impl VoiceSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listening takes precedence over processing, matching what the user sees.
    pub fn phase(&self) -> Phase {
        if self.listening {
            Phase::Listening
        } else if self.processing {
            Phase::Processing
        } else {
            Phase::Idle
        }
    }

    pub fn voice_mode(&self) -> bool {
        self.voice_mode
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn set_response(&mut self, text: impl Into<String>) {
        self.response_text = text.into();
    }

    pub(crate) fn set_error(&mut self, text: impl Into<String>) {
        self.error = Some(text.into());
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }
}
