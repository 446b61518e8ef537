//! # Voice Session Controller
//!
//! A finite state machine over a [`VoiceSession`]. Every input, whether a user
//! toggle, a capture callback, a backend reply, or a timer, arrives as a
//! [`ControllerEvent`] and is applied by [`VoiceController::handle`].
//!
//! ## States
//! `Idle → Listening → Processing → (Idle | Listening)`, with voice mode as an
//! orthogonal flag that enables auto-restart after a no-speech timeout.
//!
//! ## Effects
//! Capture start/stop and playback are synchronous platform calls and happen
//! inside `handle`. Work that completes later (the backend call and the
//! restart delay) is handed back as a [`Directive`]; its outcome re-enters as
//! another event.

use super::backend::BackendError;
use super::capability::{Capability, CaptureErrorKind, SpeechCapture, SpeechPlayback};
use super::session::VoiceSession;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const VOICE_MODE_ENABLED: &str = "Voice mode enabled. Listening for your request.";
pub const VOICE_MODE_OFF: &str = "Voice mode off. Enter voice mode to start again.";
pub const VOICE_MODE_FINISHED: &str = "Voice mode finished. Enter voice mode to ask again.";
pub const LISTENING: &str = "Listening...";
pub const NO_SPEECH_RETRYING: &str = "No speech detected. Listening again...";
pub const NO_MATCH_RESPONSE: &str = "No match found. Enter voice mode and try again.";
pub const NO_MATCH_ERROR: &str = "I could not understand that. Please try speaking again.";
pub const EMPTY_TRANSCRIPT_ERROR: &str = "I could not understand that. Please try again.";
pub const CAPTURE_UNAVAILABLE: &str = "Speech recognition is not available on this platform.";
pub const CAPTURE_START_FAILED: &str = "Could not start microphone capture. Check microphone permissions.";
pub const BACKEND_FALLBACK: &str = "I could not connect to the backend service. Please try again.";

#[derive(Debug)]
pub enum ControllerEvent {
    ToggleVoiceMode,
    EnterVoiceMode,
    ExitVoiceMode,
    CaptureStarted,
    CaptureResult(String),
    CaptureNoMatch,
    CaptureError(CaptureErrorKind),
    CaptureEnded,
    BackendReplied {
        query: String,
        result: Result<String, BackendError>,
    },
    /// A scheduled restart fired. Only the most recently scheduled generation is honoured.
    RestartDue { generation: u64 },
    Teardown,
}

/// Deferred work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Send this query to the backend and report back with `BackendReplied`.
    SubmitQuery(String),
    /// Report `RestartDue { generation }` after `delay`.
    ScheduleRestart { delay: Duration, generation: u64 },
}

pub struct VoiceController {
    session: VoiceSession,
    capture: Capability<Box<dyn SpeechCapture>>,
    playback: Capability<Box<dyn SpeechPlayback>>,
    restart_delay: Duration,
    auto_restart_pending: bool,
    restart_generation: u64,
    manually_stopped: bool,
    alive: bool,
}

impl VoiceController {
    pub fn new(
        capture: Capability<Box<dyn SpeechCapture>>,
        playback: Capability<Box<dyn SpeechPlayback>>,
        restart_delay: Duration,
    ) -> Self {
        if !capture.is_available() {
            warn!("Speech capture unavailable; voice mode is disabled");
        }
        if !playback.is_available() {
            info!("Speech playback unavailable; replies will be text only");
        }

        Self {
            session: VoiceSession::new(),
            capture,
            playback,
            restart_delay,
            auto_restart_pending: false,
            restart_generation: 0,
            manually_stopped: false,
            alive: true,
        }
    }

    pub fn session(&self) -> &VoiceSession {
        &self.session
    }

    pub fn capture_available(&self) -> bool {
        self.capture.is_available()
    }

    pub fn playback_available(&self) -> bool {
        self.playback.is_available()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Apply one event. Returns deferred work the caller must carry out.
    pub fn handle(&mut self, event: ControllerEvent) -> Option<Directive> {
        if !self.alive {
            debug!(?event, "Discarding event after teardown");
            return None;
        }

        match event {
            ControllerEvent::ToggleVoiceMode => {
                if self.session.voice_mode {
                    self.exit_voice_mode();
                } else {
                    self.enter_voice_mode();
                }
                None
            }
            ControllerEvent::EnterVoiceMode => {
                self.enter_voice_mode();
                None
            }
            ControllerEvent::ExitVoiceMode => {
                self.exit_voice_mode();
                None
            }
            ControllerEvent::CaptureStarted => {
                self.session.listening = true;
                self.session.clear_error();
                self.session.set_response(LISTENING);
                None
            }
            ControllerEvent::CaptureResult(transcript) => self.on_transcript(transcript),
            ControllerEvent::CaptureNoMatch => {
                self.session.set_error(NO_MATCH_ERROR);
                self.session.set_response(NO_MATCH_RESPONSE);
                None
            }
            ControllerEvent::CaptureError(kind) => {
                self.on_capture_error(kind);
                None
            }
            ControllerEvent::CaptureEnded => self.on_capture_ended(),
            ControllerEvent::BackendReplied { query, result } => {
                self.on_backend_reply(query, result);
                None
            }
            ControllerEvent::RestartDue { generation } => {
                self.on_restart_due(generation);
                None
            }
            ControllerEvent::Teardown => {
                info!("Tearing down voice session");
                self.alive = false;
                self.manually_stopped = true;
                self.cancel_restart();
                if let Some(capture) = self.capture.as_mut() {
                    capture.stop();
                }
                self.session.listening = false;
                None
            }
        }
    }

    fn enter_voice_mode(&mut self) {
        self.session.clear_error();
        if self.session.voice_mode {
            return;
        }

        self.cancel_restart();
        if self.start_capture() {
            info!("Voice mode enabled");
            self.session.voice_mode = true;
            self.session.listening = true;
            self.session.set_response(VOICE_MODE_ENABLED);
        }
    }

    fn exit_voice_mode(&mut self) {
        self.session.clear_error();
        if !self.session.voice_mode && !self.session.listening {
            return;
        }

        info!("Voice mode disabled by user");
        self.manually_stopped = true;
        self.cancel_restart();
        if let Some(capture) = self.capture.as_mut() {
            capture.stop();
        }
        self.session.listening = false;
        self.session.voice_mode = false;
        self.session.set_response(VOICE_MODE_OFF);
    }

    /// Drop any pending restart and invalidate timers already in flight.
    fn cancel_restart(&mut self) {
        self.auto_restart_pending = false;
        self.restart_generation += 1;
    }

    /// Try to begin capture. Failures are written to the session, never propagated.
    fn start_capture(&mut self) -> bool {
        let Some(capture) = self.capture.as_mut() else {
            self.session.set_error(CAPTURE_UNAVAILABLE);
            return false;
        };

        self.manually_stopped = false;
        match capture.start() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Failed to start speech capture");
                self.session.set_error(CAPTURE_START_FAILED);
                false
            }
        }
    }

    fn on_transcript(&mut self, transcript: String) -> Option<Directive> {
        // A final result closes the utterance.
        self.session.listening = false;
        self.auto_restart_pending = false;

        let query = transcript.trim();
        if query.is_empty() {
            self.session.set_error(EMPTY_TRANSCRIPT_ERROR);
            return None;
        }

        if self.session.processing {
            debug!("Ignoring transcript while a query is in flight");
            return None;
        }

        debug!(query_len = query.len(), "Submitting transcript");
        self.session.transcript = Some(query.to_string());
        self.session.clear_error();
        self.session.processing = true;
        Some(Directive::SubmitQuery(query.to_string()))
    }

    fn on_capture_error(&mut self, kind: CaptureErrorKind) {
        self.session.listening = false;

        match kind {
            CaptureErrorKind::NoSpeech => {
                self.auto_restart_pending = true;
                self.session.clear_error();
                self.session.set_response(NO_SPEECH_RETRYING);
            }
            CaptureErrorKind::Aborted if self.manually_stopped => {
                self.session.clear_error();
            }
            other => {
                warn!(error = %other, "Speech capture failed");
                let reason = match other.to_string() {
                    code if code.is_empty() => String::new(),
                    code => format!(" ({})", code),
                };
                self.session
                    .set_error(format!("Unable to capture voice right now{}. Please try again.", reason));
                self.session.voice_mode = false;
            }
        }
    }

    fn on_capture_ended(&mut self) -> Option<Directive> {
        self.session.listening = false;

        if self.manually_stopped {
            return None;
        }

        if self.session.voice_mode && self.auto_restart_pending && !self.session.processing {
            self.cancel_restart();
            debug!(
                delay_ms = self.restart_delay.as_millis() as u64,
                generation = self.restart_generation,
                "Scheduling capture restart"
            );
            return Some(Directive::ScheduleRestart {
                delay: self.restart_delay,
                generation: self.restart_generation,
            });
        }

        if self.session.voice_mode {
            self.session.voice_mode = false;
            if !self.session.processing {
                self.session.set_response(VOICE_MODE_FINISHED);
            }
        }

        None
    }

    fn on_backend_reply(&mut self, query: String, result: Result<String, BackendError>) {
        self.session.processing = false;

        match result {
            Ok(reply) => {
                self.session.set_response(reply.clone());
                self.speak(&reply);
                self.session.history.push(query, reply);
            }
            Err(err) => {
                warn!(error = %err, "Backend call failed; using fallback reply");
                self.session.set_error(BACKEND_FALLBACK);
                self.session.set_response(BACKEND_FALLBACK);
                self.speak(BACKEND_FALLBACK);
            }
        }
    }

    fn on_restart_due(&mut self, generation: u64) {
        if generation != self.restart_generation {
            debug!(generation, current = self.restart_generation, "Ignoring stale restart timer");
            return;
        }

        if !self.session.voice_mode
            || self.manually_stopped
            || self.session.processing
            || self.session.listening
        {
            debug!("Skipping capture restart");
            return;
        }

        if self.start_capture() {
            self.session.listening = true;
        } else {
            self.session.voice_mode = false;
        }
    }

    fn speak(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(playback) = self.playback.as_mut() {
            playback.speak(text);
        }
    }
}
