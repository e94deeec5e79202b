//! Hint assistant: AI-written mnemonics for the current level.
//!
//! The panel issues at most one request per level activation. Requests run
//! on the tokio runtime owned by `main`; replies come back over an mpsc
//! channel that the game loop drains with [`HintAssistant::poll`] each frame,
//! so the board stays interactive while a request is outstanding.
//!
//! Failures never escape this module: every error is turned into a fixed,
//! human-readable message for the panel.

pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::domain::curriculum::Level;

pub const MSG_MISSING_KEY: &str = "API Key is missing. Please configure the environment variable.";
pub const MSG_EMPTY_REPLY: &str = "Sorry, I couldn't generate a hint right now.";
pub const MSG_SERVICE_ERROR: &str = "An error occurred while contacting the AI Tutor.";

#[derive(Debug, Error)]
pub enum HintError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("text generation service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

/// External text-generation collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce study prose for `letters` given a free-text `context`.
    async fn generate(&self, letters: &[&str], context: &str) -> Result<String, HintError>;
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum HintContent {
    Empty,
    Loading,
    Ready(String),
}

struct HintReply {
    activation: u64,
    text: String,
}

pub struct HintAssistant {
    generator: Arc<dyn TextGenerator>,
    runtime: Handle,
    tx: UnboundedSender<HintReply>,
    rx: UnboundedReceiver<HintReply>,
    pub visible: bool,
    pub content: HintContent,
    activation: u64,
}

impl HintAssistant {
    pub fn new(generator: Arc<dyn TextGenerator>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        HintAssistant {
            generator,
            runtime,
            tx,
            rx,
            visible: false,
            content: HintContent::Empty,
            activation: 0,
        }
    }

    /// Forget the panel if the game has been (re)activated since.
    pub fn sync(&mut self, activation: u64) {
        if self.activation != activation {
            self.activation = activation;
            self.visible = false;
            self.content = HintContent::Empty;
        }
    }

    /// Show the panel, fetching content if none is cached or pending.
    pub fn request(&mut self, level: &'static Level, activation: u64) {
        self.sync(activation);
        self.visible = true;
        if self.content != HintContent::Empty {
            debug!(level = level.id, "hint already cached or pending");
            return;
        }

        self.content = HintContent::Loading;
        info!(level = level.id, activation, "requesting hint");

        let generator = Arc::clone(&self.generator);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = generator.generate(level.letters, level.description).await;
            let text = reply_text(result);
            // Receiver gone means the game is shutting down.
            let _ = tx.send(HintReply { activation, text });
        });
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Open the panel if closed, close it if open.
    pub fn toggle(&mut self, level: &'static Level, activation: u64) {
        self.sync(activation);
        if self.visible {
            self.hide();
        } else {
            self.request(level, activation);
        }
    }

    /// Collect finished replies. Non-blocking.
    pub fn poll(&mut self) {
        while let Ok(reply) = self.rx.try_recv() {
            self.accept(reply);
        }
    }

    fn accept(&mut self, reply: HintReply) {
        if reply.activation != self.activation {
            debug!(reply = reply.activation, current = self.activation, "stale hint dropped");
            return;
        }
        self.content = HintContent::Ready(reply.text);
    }
}

/// Map a generator outcome onto the text shown in the panel.
fn reply_text(result: Result<String, HintError>) -> String {
    match result {
        Ok(text) if text.trim().is_empty() => MSG_EMPTY_REPLY.to_string(),
        Ok(text) => text,
        Err(HintError::MissingCredential) => {
            info!("hint requested without an API key");
            MSG_MISSING_KEY.to_string()
        }
        Err(e) => {
            warn!(error = %e, "hint request failed");
            MSG_SERVICE_ERROR.to_string()
        }
    }
}
