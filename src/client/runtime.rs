//! Event loop that drives a [`VoiceController`].
//!
//! Events are applied strictly in arrival order on a single task. Directives
//! spawn short-lived tasks (one backend call, one restart timer) whose
//! results come back through the same channel.
//!
//! The client keeps only a weak handle to its own channel, so the loop ends
//! on `Teardown` or once every [`EventSender`] outside it has been dropped.
//! A spawned task holds a strong sender until it reports back. Directives
//! produced after the last sender is gone are dropped.

use super::backend::VoiceBackend;
use super::controller::{ControllerEvent, Directive, VoiceController};
use super::session::VoiceSession;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Cloneable handle for feeding events to a running client.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl EventSender {
    /// Returns `false` once the client has shut down.
    pub fn send(&self, event: ControllerEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

pub struct EventInbox {
    rx: mpsc::UnboundedReceiver<ControllerEvent>,
}

impl EventInbox {
    /// Take the next queued event without waiting.
    pub fn try_next(&mut self) -> Option<ControllerEvent> {
        self.rx.try_recv().ok()
    }
}

/// Create the channel shared by capture providers and the client loop.
pub fn event_channel() -> (EventSender, EventInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventInbox { rx })
}

pub struct VoiceClient<B> {
    controller: VoiceController,
    backend: Arc<B>,
    events: mpsc::WeakUnboundedSender<ControllerEvent>,
    inbox: EventInbox,
}

impl<B> VoiceClient<B>
where
    B: VoiceBackend + 'static,
{
    /// `events` is only used to reach this client's channel; dropping it here
    /// does not keep the loop alive.
    pub fn new(controller: VoiceController, backend: B, events: EventSender, inbox: EventInbox) -> Self {
        Self {
            controller,
            backend: Arc::new(backend),
            events: events.tx.downgrade(),
            inbox,
        }
    }

    /// Run until `Teardown` is handled or all senders are gone. `observer` sees
    /// the session after every event.
    pub async fn run<F>(mut self, mut observer: F) -> VoiceSession
    where
        F: FnMut(&VoiceSession),
    {
        info!("Voice client started");

        while let Some(event) = self.inbox.rx.recv().await {
            let teardown = matches!(event, ControllerEvent::Teardown);
            let directive = self.controller.handle(event);
            observer(self.controller.session());

            if let Some(directive) = directive {
                self.dispatch(directive);
            }

            if teardown {
                break;
            }
        }

        info!("Voice client stopped");
        self.controller.session().clone()
    }

    fn dispatch(&self, directive: Directive) {
        let Some(tx) = self.events.upgrade() else {
            debug!(?directive, "No senders left; dropping directive");
            return;
        };
        let events = EventSender { tx };

        match directive {
            Directive::SubmitQuery(query) => {
                let backend = Arc::clone(&self.backend);
                tokio::spawn(async move {
                    let result = backend.ask(&query).await;
                    if !events.send(ControllerEvent::BackendReplied { query, result }) {
                        debug!("Client gone before backend replied");
                    }
                });
            }
            Directive::ScheduleRestart { delay, generation } => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    events.send(ControllerEvent::RestartDue { generation });
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::backend::BackendError;
    use crate::client::capability::{Capability, CaptureError, CaptureErrorKind, SpeechCapture, SpeechPlayback};
    use crate::client::controller::{BACKEND_FALLBACK, NO_SPEECH_RETRYING};
    use crate::client::session::Phase;
    use crate::responder::Responder;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct LocalBackend(Responder);

    #[async_trait]
    impl VoiceBackend for LocalBackend {
        async fn ask(&self, query: &str) -> Result<String, BackendError> {
            Ok(self.0.reply(query))
        }
    }

    struct DownBackend;

    #[async_trait]
    impl VoiceBackend for DownBackend {
        async fn ask(&self, _query: &str) -> Result<String, BackendError> {
            Err(BackendError::Status(503))
        }
    }

    struct CountingCapture(Arc<AtomicUsize>);

    impl SpeechCapture for CountingCapture {
        fn start(&mut self) -> Result<(), CaptureError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) {}
    }

    struct RecordingPlayback(Arc<Mutex<Vec<String>>>);

    impl SpeechPlayback for RecordingPlayback {
        fn speak(&mut self, text: &str) {
            self.0.lock().push(text.to_string());
        }
    }

    fn make_controller(starts: Arc<AtomicUsize>, spoken: Arc<Mutex<Vec<String>>>) -> VoiceController {
        VoiceController::new(
            Capability::Available(Box::new(CountingCapture(starts))),
            Capability::Available(Box::new(RecordingPlayback(spoken))),
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn test_query_round_trip() {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let (events, inbox) = event_channel();
        let client = VoiceClient::new(
            make_controller(Arc::new(AtomicUsize::new(0)), spoken.clone()),
            LocalBackend(Responder::default()),
            events.clone(),
            inbox,
        );

        events.send(ControllerEvent::EnterVoiceMode);
        events.send(ControllerEvent::CaptureStarted);
        events.send(ControllerEvent::CaptureResult("What is my checking account balance?".to_string()));
        events.send(ControllerEvent::CaptureEnded);

        let closer = events.clone();
        let session = tokio::time::timeout(
            Duration::from_secs(5),
            client.run(move |session| {
                if !session.history().is_empty() {
                    closer.send(ControllerEvent::Teardown);
                }
            }),
        )
        .await
        .expect("client did not finish");

        assert_eq!(session.response_text(), "Your checking account balance is $2540.34.");
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(spoken.lock().as_slice(), ["Your checking account balance is $2540.34."]);
    }

    #[tokio::test]
    async fn test_unreachable_backend_returns_to_idle() {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let (events, inbox) = event_channel();
        let client = VoiceClient::new(
            make_controller(Arc::new(AtomicUsize::new(0)), spoken.clone()),
            DownBackend,
            events.clone(),
            inbox,
        );

        events.send(ControllerEvent::EnterVoiceMode);
        events.send(ControllerEvent::CaptureResult("savings balance".to_string()));

        let closer = events.clone();
        let session = tokio::time::timeout(
            Duration::from_secs(5),
            client.run(move |session| {
                if session.response_text() == BACKEND_FALLBACK {
                    closer.send(ControllerEvent::Teardown);
                }
            }),
        )
        .await
        .expect("client did not finish");

        assert_eq!(session.response_text(), BACKEND_FALLBACK);
        assert_eq!(session.error(), Some(BACKEND_FALLBACK));
        assert!(!session.is_processing());
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(spoken.lock().as_slice(), [BACKEND_FALLBACK]);
    }

    #[tokio::test]
    async fn test_no_speech_restarts_capture() {
        let starts = Arc::new(AtomicUsize::new(0));
        let (events, inbox) = event_channel();
        let client = VoiceClient::new(
            make_controller(starts.clone(), Arc::new(Mutex::new(Vec::new()))),
            LocalBackend(Responder::default()),
            events.clone(),
            inbox,
        );

        events.send(ControllerEvent::EnterVoiceMode);
        events.send(ControllerEvent::CaptureError(CaptureErrorKind::NoSpeech));
        events.send(ControllerEvent::CaptureEnded);

        let closer = events.clone();
        let observed = starts.clone();
        let session = tokio::time::timeout(
            Duration::from_secs(5),
            client.run(move |_| {
                if observed.load(Ordering::SeqCst) >= 2 {
                    closer.send(ControllerEvent::Teardown);
                }
            }),
        )
        .await
        .expect("capture was not restarted");

        assert_eq!(starts.load(Ordering::SeqCst), 2);
        assert!(session.voice_mode());
    }

    #[tokio::test]
    async fn test_loop_ends_when_senders_dropped() {
        let starts = Arc::new(AtomicUsize::new(0));
        let (events, inbox) = event_channel();

        events.send(ControllerEvent::EnterVoiceMode);
        events.send(ControllerEvent::CaptureError(CaptureErrorKind::NoSpeech));
        events.send(ControllerEvent::CaptureEnded);

        // The only sender moves into the client; no Teardown is ever sent.
        let client = VoiceClient::new(
            make_controller(starts.clone(), Arc::new(Mutex::new(Vec::new()))),
            LocalBackend(Responder::default()),
            events,
            inbox,
        );

        let mut seen = 0;
        let session = tokio::time::timeout(Duration::from_secs(5), client.run(|_| seen += 1))
            .await
            .expect("client kept running with no senders left");

        // Queued events are still applied; the restart has nobody to report to.
        assert_eq!(seen, 3);
        assert_eq!(session.response_text(), NO_SPEECH_RETRYING);
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }
}
