/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Problems are collected in `warnings` and logged once logging is up.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::curriculum::level_by_id;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub general: GeneralConfig,
    pub hint: HintConfig,
    pub speech: SpeechConfig,
    pub sound_enabled: bool,
    pub gamepad: GamepadConfig,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub frame_rate_ms: u64,
    pub log_dir: PathBuf,
    /// Level id the title screen starts into.
    pub start_level: String,
}

#[derive(Clone, Debug)]
pub struct HintConfig {
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub api_key_env: String,
    /// Resolved from `api_key_env` at startup. `None` if unset or blank.
    pub api_key: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// argv template; `{text}` and `{lang}` are substituted per utterance.
    pub command: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub select: Vec<String>,
    pub check: Vec<String>,
    pub hint: Vec<String>,
    pub listen: Vec<String>,
    pub next: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    hint: TomlHint,
    #[serde(default)]
    speech: TomlSpeech,
    #[serde(default)]
    sound: TomlSound,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_frame_rate")]
    frame_rate_ms: u64,
    #[serde(default = "default_log_dir")]
    log_dir: String,
    #[serde(default = "default_start_level")]
    start_level: String,
}

#[derive(Deserialize, Debug)]
struct TomlHint {
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_endpoint")]
    endpoint: String,
    #[serde(default = "default_timeout")]
    timeout_secs: u64,
    #[serde(default = "default_api_key_env")]
    api_key_env: String,
}

#[derive(Deserialize, Debug)]
struct TomlSpeech {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_speech_command")]
    command: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlSound {
    #[serde(default = "default_true")]
    enabled: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_select")]
    select: Vec<String>,
    #[serde(default = "default_pad_check")]
    check: Vec<String>,
    #[serde(default = "default_pad_hint")]
    hint: Vec<String>,
    #[serde(default = "default_pad_listen")]
    listen: Vec<String>,
    #[serde(default = "default_pad_next")]
    next: Vec<String>,
    #[serde(default = "default_pad_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_frame_rate() -> u64 { 33 }
fn default_log_dir() -> String { "logs".into() }
fn default_start_level() -> String { "swar".into() }
fn default_model() -> String { "gemini-2.5-flash".into() }
fn default_endpoint() -> String { "https://generativelanguage.googleapis.com/v1beta".into() }
fn default_timeout() -> u64 { 30 }
fn default_api_key_env() -> String { "API_KEY".into() }
fn default_true() -> bool { true }
fn default_speech_command() -> Vec<String> {
    vec!["espeak-ng".into(), "-v".into(), "hi".into(), "{text}".into()]
}

fn default_pad_select() -> Vec<String> { vec!["A".into()] }
fn default_pad_check() -> Vec<String> { vec!["B".into()] }
fn default_pad_hint() -> Vec<String> { vec!["X".into()] }
fn default_pad_listen() -> Vec<String> { vec!["Y".into()] }
fn default_pad_next() -> Vec<String> { vec!["Start".into()] }
fn default_pad_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            frame_rate_ms: default_frame_rate(),
            log_dir: default_log_dir(),
            start_level: default_start_level(),
        }
    }
}

impl Default for TomlHint {
    fn default() -> Self {
        TomlHint {
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for TomlSpeech {
    fn default() -> Self {
        TomlSpeech {
            enabled: true,
            command: default_speech_command(),
        }
    }
}

impl Default for TomlSound {
    fn default() -> Self {
        TomlSound { enabled: true }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            select: default_pad_select(),
            check: default_pad_check(),
            hint: default_pad_hint(),
            listen: default_pad_listen(),
            next: default_pad_next(),
            cancel: default_pad_cancel(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/varnamala, (4) /usr/share/varnamala.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let mut warnings = vec![];
        let mut cfg = match read_config(&candidate_dirs(), &mut warnings) {
            Some((path, text)) => Self::parse(&text, env_var).unwrap_or_else(|e| {
                warnings.push(format!(
                    "{}: parse error, using default settings: {e}",
                    path.display()
                ));
                Self::from_toml(TomlConfig::default(), env_var)
            }),
            None => Self::from_toml(TomlConfig::default(), env_var),
        };
        warnings.append(&mut cfg.warnings);
        cfg.warnings = warnings;
        cfg
    }

    /// Parse config text. `lookup` reads an environment variable by name
    /// and supplies the API key.
    pub fn parse(
        text: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, toml::de::Error> {
        let parsed = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(parsed, lookup))
    }

    fn from_toml(t: TomlConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut warnings = vec![];

        let api_key = lookup(&t.hint.api_key_env)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let start_level = match level_by_id(&t.general.start_level) {
            Some(level) => level.id.to_string(),
            None => {
                warnings.push(format!(
                    "unknown start_level {:?}, starting at {}",
                    t.general.start_level,
                    default_start_level()
                ));
                default_start_level()
            }
        };

        GameConfig {
            general: GeneralConfig {
                frame_rate_ms: t.general.frame_rate_ms.max(1),
                log_dir: resolve_log_dir(&t.general.log_dir),
                start_level,
            },
            hint: HintConfig {
                model: t.hint.model,
                endpoint: t.hint.endpoint,
                timeout_secs: t.hint.timeout_secs,
                api_key_env: t.hint.api_key_env,
                api_key,
            },
            speech: SpeechConfig {
                enabled: t.speech.enabled,
                command: t.speech.command,
            },
            sound_enabled: t.sound.enabled,
            gamepad: GamepadConfig {
                select: t.gamepad.select,
                check: t.gamepad.check,
                hint: t.gamepad.hint,
                listen: t.gamepad.listen,
                next: t.gamepad.next,
                cancel: t.gamepad.cancel,
            },
            warnings,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Relative log dirs live under the user data directory.
fn resolve_log_dir(dir: &str) -> PathBuf {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        return path;
    }
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".local/share/varnamala").join(path),
        Err(_) => path,
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/varnamala");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/varnamala");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Text of the first readable config.toml in the candidate directories.
fn read_config(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> Option<(PathBuf, String)> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => return Some((path, text)),
            Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::parse("", no_env).unwrap();
        assert_eq!(cfg.general.frame_rate_ms, 33);
        assert_eq!(cfg.hint.model, "gemini-2.5-flash");
        assert_eq!(cfg.hint.api_key_env, "API_KEY");
        assert_eq!(cfg.hint.api_key, None);
        assert!(cfg.speech.enabled);
        assert_eq!(cfg.speech.command[0], "espeak-ng");
        assert!(cfg.sound_enabled);
        assert_eq!(cfg.gamepad.select, vec!["A".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [hint]
            model = "gemini-2.0-flash"
            timeout_secs = 10

            [speech]
            enabled = false
        "#;
        let cfg = GameConfig::parse(text, |var| (var == "API_KEY").then(|| "  AIzaKey \n".to_string())).unwrap();
        assert_eq!(cfg.hint.model, "gemini-2.0-flash");
        assert_eq!(cfg.hint.timeout_secs, 10);
        assert!(cfg.hint.endpoint.starts_with("https://generativelanguage"));
        assert_eq!(cfg.hint.api_key.as_deref(), Some("AIzaKey"));
        assert!(!cfg.speech.enabled);
        assert_eq!(cfg.speech.command.len(), 4);
    }

    #[test]
    fn blank_key_is_missing() {
        let cfg = GameConfig::parse("", |_| Some("   ".to_string())).unwrap();
        assert_eq!(cfg.hint.api_key, None);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(GameConfig::parse("[hint\nmodel = 3", no_env).is_err());
    }

    #[test]
    fn absolute_log_dir_is_kept() {
        let cfg = GameConfig::parse("[general]\nlog_dir = \"/tmp/vm-logs\"", no_env).unwrap();
        assert_eq!(cfg.general.log_dir, PathBuf::from("/tmp/vm-logs"));
    }

    #[test]
    fn key_is_read_from_the_configured_variable() {
        let text = "[hint]\napi_key_env = \"GEMINI_KEY\"";
        let cfg = GameConfig::parse(text, |var| (var == "GEMINI_KEY").then(|| "k1".to_string())).unwrap();
        assert_eq!(cfg.hint.api_key_env, "GEMINI_KEY");
        assert_eq!(cfg.hint.api_key.as_deref(), Some("k1"));
    }

    #[test]
    fn start_level_is_checked_against_the_curriculum() {
        let cfg = GameConfig::parse("[general]\nstart_level = \"p-varga\"", no_env).unwrap();
        assert_eq!(cfg.general.start_level, "p-varga");
        assert!(cfg.warnings.is_empty());

        let cfg = GameConfig::parse("[general]\nstart_level = \"x-varga\"", no_env).unwrap();
        assert_eq!(cfg.general.start_level, "swar");
        assert_eq!(cfg.warnings.len(), 1);
        assert!(cfg.warnings[0].contains("x-varga"));
    }
}
