/// Spoken feedback through an external text-to-speech command.
///
/// The command is an argv template from config.toml; `{text}` and `{lang}`
/// are replaced per utterance. A new utterance cancels the previous one,
/// so only one voice is ever active.

use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

use crate::config::SpeechConfig;

pub struct Speaker {
    command: Vec<String>,
    enabled: bool,
    current: Option<Child>,
}

impl Speaker {
    pub fn new(cfg: &SpeechConfig) -> Self {
        Speaker {
            command: cfg.command.clone(),
            enabled: cfg.enabled && !cfg.command.is_empty(),
            current: None,
        }
    }

    /// Speak `text`, cancelling anything still playing.
    pub fn speak(&mut self, text: &str, lang: &str) {
        if !self.enabled {
            return;
        }
        self.cancel();

        let argv = expand_template(&self.command, text, lang);
        let Some((program, args)) = argv.split_first() else {
            return;
        };

        match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                debug!(%lang, "speaking: {text}");
                self.current = Some(child);
            }
            Err(e) => {
                // Missing binary would fail on every call; stop trying.
                warn!(program = %program, error = %e, "speech command failed, disabling speech");
                self.enabled = false;
            }
        }
    }

    /// Stop the active utterance, if any.
    pub fn cancel(&mut self) {
        if let Some(mut child) = self.current.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn expand_template(template: &[String], text: &str, lang: &str) -> Vec<String> {
    template
        .iter()
        .map(|arg| arg.replace("{text}", text).replace("{lang}", lang))
        .collect()
}
