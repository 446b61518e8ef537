//! # Voice Client
//!
//! Terminal front-end for the voice banking backend. Type `/voice` to enter
//! voice mode, then type what you would say. An empty line while listening
//! counts as silence and capture restarts on its own. Typing `/voice` again
//! leaves voice mode; `/quit` or end of input exits.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voice_banking_assistant::client::{
    event_channel,
    terminal::{ConsolePlayback, LineCapture},
    Capability, HttpBackend, Phase, SpeechCapture, SpeechPlayback, VoiceClient, VoiceController,
    VoiceSession,
};
use voice_banking_assistant::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr so they do not interleave with the conversation on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voice_banking_assistant=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    let config = AppConfig::load()?;
    config.validate()?;

    let backend = HttpBackend::from_config(&config.client).context("could not build backend client")?;

    let (events, inbox) = event_channel();
    let (capture, lines) = LineCapture::new(events.clone());

    let capture: Capability<Box<dyn SpeechCapture>> = Capability::Available(Box::new(capture));
    let playback: Capability<Box<dyn SpeechPlayback>> = if config.client.speech_playback {
        Capability::Available(Box::new(ConsolePlayback))
    } else {
        Capability::Unavailable
    };

    let controller = VoiceController::new(capture, playback, config.client.restart_delay());
    if !controller.playback_available() {
        println!("Voice playback is not available. Text responses still work.");
    }

    println!("Voice Banking Assistant ({})", backend.endpoint());
    println!("Example: \"What is my account balance?\"");
    println!("Type /voice to toggle voice mode, /quit to exit.");

    tokio::spawn(lines.pump(tokio::io::BufReader::new(tokio::io::stdin())));

    let mut view = SessionView::default();
    view.render(controller.session());

    let client = VoiceClient::new(controller, backend, events, inbox);
    let session = client.run(|session| view.render(session)).await;

    if !session.history().is_empty() {
        println!("\nRecent interactions:");
        for interaction in session.history().iter() {
            println!("  You: {}", interaction.query);
            println!("  Assistant: {}", interaction.reply);
        }
    }

    Ok(())
}

/// Prints only what changed since the last event.
#[derive(Default)]
struct SessionView {
    phase: Option<Phase>,
    response: String,
    error: Option<String>,
}

impl SessionView {
    fn render(&mut self, session: &VoiceSession) {
        if self.phase != Some(session.phase()) {
            self.phase = Some(session.phase());
            println!("[{}]", session.phase());
        }

        if self.response != session.response_text() {
            self.response = session.response_text().to_string();
            println!("Assistant: {}", self.response);
        }

        let error = session.error().map(str::to_string);
        if self.error != error {
            if let Some(message) = &error {
                println!("! {}", message);
            }
            self.error = error;
        }
    }
}
