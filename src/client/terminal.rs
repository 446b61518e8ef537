//! Terminal stand-ins for the speech capabilities.
//!
//! [`LineCapture`] treats each line typed while capture is armed as one final
//! transcript; a blank line plays the part of a no-speech timeout. `/voice`
//! toggles voice mode and `/quit` exits at any time. Other lines typed while
//! not armed are ignored. [`ConsolePlayback`] "speaks" by printing.

use super::capability::{CaptureError, CaptureErrorKind, SpeechCapture, SpeechPlayback};
use super::controller::ControllerEvent;
use super::runtime::EventSender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

pub struct LineCapture {
    armed: Arc<AtomicBool>,
    events: EventSender,
}

/// The reading half of a [`LineCapture`]; run it with [`LineSource::pump`].
pub struct LineSource {
    armed: Arc<AtomicBool>,
    events: EventSender,
}

impl LineCapture {
    pub fn new(events: EventSender) -> (Self, LineSource) {
        let armed = Arc::new(AtomicBool::new(false));
        let source = LineSource {
            armed: Arc::clone(&armed),
            events: events.clone(),
        };
        (Self { armed, events }, source)
    }
}

impl SpeechCapture for LineCapture {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.armed.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::StartFailed("capture already running".to_string()));
        }
        if !self.events.send(ControllerEvent::CaptureStarted) {
            self.armed.store(false, Ordering::SeqCst);
            return Err(CaptureError::StartFailed("event channel closed".to_string()));
        }
        Ok(())
    }

    fn stop(&mut self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.events.send(ControllerEvent::CaptureError(CaptureErrorKind::Aborted));
            self.events.send(ControllerEvent::CaptureEnded);
        }
    }
}

impl LineSource {
    /// Read lines until EOF or `/quit`, translating them into controller events.
    /// Always ends by requesting teardown.
    pub async fn pump<R>(self, reader: R)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    debug!(error = %err, "Stopped reading input");
                    break;
                }
            };

            match line.trim() {
                "/quit" => break,
                "/voice" => {
                    self.armed.store(false, Ordering::SeqCst);
                    self.events.send(ControllerEvent::ToggleVoiceMode);
                    continue;
                }
                _ => {}
            }

            if self.armed.swap(false, Ordering::SeqCst) {
                let event = if line.trim().is_empty() {
                    ControllerEvent::CaptureError(CaptureErrorKind::NoSpeech)
                } else {
                    ControllerEvent::CaptureResult(line)
                };
                self.events.send(event);
                self.events.send(ControllerEvent::CaptureEnded);
                continue;
            }

            debug!(input = line.trim(), "Ignoring input while not listening");
        }

        self.events.send(ControllerEvent::Teardown);
    }
}

/// Prints replies in place of speaking them.
#[derive(Debug, Default)]
pub struct ConsolePlayback;

impl SpeechPlayback for ConsolePlayback {
    fn speak(&mut self, text: &str) {
        println!("🔊 {}", text);
    }
}
