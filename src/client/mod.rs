//! # Voice Client
//!
//! Client-side half of the assistant: a state machine that turns speech
//! capture events into backend queries and spoken replies.
//!
//! ## Pieces:
//! - **session**: The `VoiceSession` data the user sees (flags, texts, bounded history)
//! - **capability**: Capture/playback traits and the `Capability` available/unavailable wrapper
//! - **controller**: The transition function over `ControllerEvent`s
//! - **backend**: The `VoiceBackend` seam and its HTTP implementation
//! - **runtime**: The tokio event loop that executes controller directives
//! - **terminal**: Line-based capture and console playback for the CLI client

pub mod backend;
pub mod capability;
pub mod controller;
pub mod runtime;
pub mod session;
pub mod terminal;

pub use backend::{BackendError, HttpBackend, VoiceBackend};
pub use capability::{Capability, CaptureError, CaptureErrorKind, SpeechCapture, SpeechPlayback};
pub use controller::{ControllerEvent, Directive, VoiceController};
pub use runtime::{event_channel, EventInbox, EventSender, VoiceClient};
pub use session::{History, Interaction, Phase, VoiceSession, HISTORY_CAPACITY};
