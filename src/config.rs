//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` (or the path given with `-f`), follows any
//! `[meta] base = "..."` inheritance chain, then applies
//! `LAW_ENERGY_LOG_LEVEL` and `LAW_ENERGY_LOCALE` env overrides. Every key
//! has a default, so an empty file (or no file at all) is a valid config.

use std::{
    collections::HashSet,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::error::AppError;
use crate::knowledge::Locale;
use crate::logger;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

// ── Resolved config ───────────────────────────────────────────────────────────

/// Console channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    pub enabled: bool,
}

/// HTTP (axum) channel configuration.
#[derive(Debug, Clone)]
pub struct AxumChannelConfig {
    pub enabled: bool,
    /// Socket address to bind to.
    pub bind: String,
    /// Live sessions kept in memory; the oldest is dropped past this.
    pub max_sessions: usize,
}

#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub pty: PtyConfig,
    pub axum_channel: AxumChannelConfig,
}

/// Chat behaviour shared by all channels.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Locale new sessions start in.
    pub default_locale: Locale,
    /// How long the "thinking" caption shows before a reply.
    pub thinking_delay: Duration,
    /// Pause between words of the typewriter reveal.
    pub reveal_delay: Duration,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    pub log_level: String,
    /// Append logs here instead of stderr (already `~`-expanded).
    pub log_file: Option<PathBuf>,
    pub chat: ChatConfig,
    pub comms: CommsConfig,
}

impl Config {
    pub fn comms_pty_should_load(&self) -> bool {
        self.comms.pty.enabled
    }

    pub fn comms_axum_should_load(&self) -> bool {
        self.comms.axum_channel.enabled
    }
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    supervisor: RawSupervisor,
    #[serde(default)]
    chat: RawChat,
    #[serde(default)]
    comms: RawComms,
}

#[derive(Deserialize)]
struct RawSupervisor {
    #[serde(default = "default_bot_name")]
    bot_name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    log_file: Option<String>,
}

#[derive(Deserialize)]
struct RawChat {
    #[serde(default = "default_locale_code")]
    default_locale: String,
    #[serde(default = "default_thinking_delay_ms")]
    thinking_delay_ms: u64,
    #[serde(default = "default_reveal_delay_ms")]
    reveal_delay_ms: u64,
}

#[derive(Deserialize, Default)]
struct RawComms {
    #[serde(default)]
    pty: RawPty,
    #[serde(default, rename = "axum")]
    axum_channel: RawAxumChannel,
}

#[derive(Deserialize)]
struct RawPty {
    /// Defaults to `true`; the console still only runs with `-i`.
    #[serde(default = "default_true")]
    enabled: bool,
}

#[derive(Deserialize)]
struct RawAxumChannel {
    #[serde(default)]
    enabled: bool,
    #[serde(default = "default_http_bind")]
    bind: String,
    #[serde(default = "default_max_sessions")]
    max_sessions: usize,
}

impl Default for RawSupervisor {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl Default for RawChat {
    fn default() -> Self {
        Self {
            default_locale: default_locale_code(),
            thinking_delay_ms: default_thinking_delay_ms(),
            reveal_delay_ms: default_reveal_delay_ms(),
        }
    }
}

impl Default for RawPty {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for RawAxumChannel {
    fn default() -> Self {
        Self {
            enabled: false,
            bind: default_http_bind(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_bot_name() -> String { "law-energy".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_locale_code() -> String { Locale::default().code().to_string() }
fn default_thinking_delay_ms() -> u64 { 500 }
fn default_reveal_delay_ms() -> u64 { 50 }
fn default_http_bind() -> String { "127.0.0.1:8080".to_string() }
fn default_max_sessions() -> usize { 1024 }
fn default_true() -> bool { true }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Deep-merge two TOML values. Tables merge recursively; any other overlay
/// value replaces the base value.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read `path`, follow its `[meta] base` chain, and return the merged value.
/// `visited` holds canonical paths already seen so cycles are rejected.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let base = overlay
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
        .map(|b| {
            if Path::new(b).is_absolute() {
                PathBuf::from(b)
            } else {
                path.parent().unwrap_or(Path::new(".")).join(b)
            }
        });

    match base {
        Some(base_path) => Ok(merge_toml(load_raw_merged(&base_path, visited)?, overlay)),
        None => Ok(overlay),
    }
}

/// Load from `config_path`, else `config/default.toml` if it exists, else
/// built-in defaults; then apply env overrides.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let log_level_override = env::var("LAW_ENERGY_LOG_LEVEL").ok();
    let locale_override = env::var("LAW_ENERGY_LOCALE").ok();

    let path = match config_path {
        Some(p) => Some(Path::new(p)),
        None => Some(Path::new(DEFAULT_CONFIG_PATH)).filter(|p| p.exists()),
    };

    match path {
        Some(p) => load_from(p, log_level_override.as_deref(), locale_override.as_deref()),
        None => resolve(
            RawConfig::default(),
            log_level_override.as_deref(),
            locale_override.as_deref(),
        ),
    }
}

/// Load an explicit file. Tests pass overrides directly instead of
/// mutating env vars.
pub fn load_from(
    path: &Path,
    log_level_override: Option<&str>,
    locale_override: Option<&str>,
) -> Result<Config, AppError> {
    let merged = load_raw_merged(path, &mut HashSet::new())?;
    let parsed: RawConfig = merged
        .try_into()
        .map_err(|e| AppError::Config(format!("invalid config in {}: {e}", path.display())))?;
    resolve(parsed, log_level_override, locale_override)
}

fn resolve(
    raw: RawConfig,
    log_level_override: Option<&str>,
    locale_override: Option<&str>,
) -> Result<Config, AppError> {
    let locale_code = locale_override.unwrap_or(&raw.chat.default_locale);
    let default_locale = Locale::parse(locale_code)?;

    let log_level = log_level_override
        .map(str::to_string)
        .unwrap_or(raw.supervisor.log_level);
    // EnvFilter would read an unknown word as a target name and log nothing.
    logger::parse_level(&log_level)
        .map_err(|e| AppError::Config(format!("supervisor.log_level: {e}")))?;

    if raw.comms.axum_channel.max_sessions == 0 {
        return Err(AppError::Config("comms.axum.max_sessions must be at least 1".into()));
    }

    Ok(Config {
        bot_name: raw.supervisor.bot_name,
        log_level,
        log_file: raw.supervisor.log_file.as_deref().map(expand_home),
        chat: ChatConfig {
            default_locale,
            thinking_delay: Duration::from_millis(raw.chat.thinking_delay_ms),
            reveal_delay: Duration::from_millis(raw.chat.reveal_delay_ms),
        },
        comms: CommsConfig {
            pty: PtyConfig { enabled: raw.comms.pty.enabled },
            axum_channel: AxumChannelConfig {
                enabled: raw.comms.axum_channel.enabled,
                bind: raw.comms.axum_channel.bind,
                max_sessions: raw.comms.axum_channel.max_sessions,
            },
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

impl Config {
    /// Built-in defaults with no delays, for tests and embedding.
    pub fn test_default() -> Self {
        Self {
            bot_name: "test".into(),
            log_level: "info".into(),
            log_file: None,
            chat: ChatConfig {
                default_locale: Locale::default(),
                thinking_delay: Duration::ZERO,
                reveal_delay: Duration::ZERO,
            },
            comms: CommsConfig {
                pty: PtyConfig { enabled: true },
                axum_channel: AxumChannelConfig {
                    enabled: false,
                    bind: default_http_bind(),
                    max_sessions: default_max_sessions(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[supervisor]
bot_name = "test-bot"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.bot_name, "test-bot");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.chat.default_locale, Locale::Es);
        assert!(cfg.comms_pty_should_load());
        assert!(!cfg.comms_axum_should_load());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let f = write_toml("");
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.bot_name, "law-energy");
        assert_eq!(cfg.chat.thinking_delay, Duration::from_millis(500));
        assert_eq!(cfg.chat.reveal_delay, Duration::from_millis(50));
        assert_eq!(cfg.comms.axum_channel.bind, "127.0.0.1:8080");
        assert_eq!(cfg.comms.axum_channel.max_sessions, 1024);
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn chat_and_axum_sections_parse() {
        let f = write_toml(
            r#"
[chat]
default_locale = "en"
thinking_delay_ms = 0
reveal_delay_ms = 10

[comms.axum]
enabled = true
bind = "0.0.0.0:9000"
max_sessions = 3
"#,
        );
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.chat.default_locale, Locale::En);
        assert_eq!(cfg.chat.thinking_delay, Duration::ZERO);
        assert_eq!(cfg.chat.reveal_delay, Duration::from_millis(10));
        assert!(cfg.comms_axum_should_load());
        assert_eq!(cfg.comms.axum_channel.bind, "0.0.0.0:9000");
        assert_eq!(cfg.comms.axum_channel.max_sessions, 3);
    }

    #[test]
    fn unknown_locale_rejected() {
        let f = write_toml("[chat]\ndefault_locale = \"fr\"\n");
        let err = load_from(f.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("unsupported locale"));
    }

    #[test]
    fn unknown_log_level_rejected() {
        let f = write_toml("[supervisor]\nlog_level = \"verbose\"\n");
        let err = load_from(f.path(), None, None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("'verbose'"), "{err}");
    }

    #[test]
    fn unknown_log_level_override_rejected() {
        let f = write_toml(MINIMAL_TOML);
        assert!(load_from(f.path(), Some("loud"), None).is_err());
    }

    #[test]
    fn zero_max_sessions_rejected() {
        let f = write_toml("[comms.axum]\nmax_sessions = 0\n");
        assert!(load_from(f.path(), None, None).is_err());
    }

    #[test]
    fn overrides_win() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("debug"), Some("English")).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.chat.default_locale, Locale::En);
    }

    #[test]
    fn base_chain_merges_tables() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.toml");
        let child = dir.path().join("child.toml");
        fs::write(&base, "[supervisor]\nbot_name = \"base\"\nlog_level = \"warn\"\n").unwrap();
        fs::write(
            &child,
            "[meta]\nbase = \"base.toml\"\n\n[supervisor]\nlog_level = \"debug\"\n",
        )
        .unwrap();
        let cfg = load_from(&child, None, None).unwrap();
        assert_eq!(cfg.bot_name, "base");
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn circular_base_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.toml");
        let b = dir.path().join("b.toml");
        fs::write(&a, "[meta]\nbase = \"b.toml\"\n").unwrap();
        fs::write(&b, "[meta]\nbase = \"a.toml\"\n").unwrap();
        let err = load_from(&a, None, None).unwrap_err();
        assert!(err.to_string().contains("circular"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), None, None);
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.law-energy/bot.log");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with("bot.log"));
    }

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(expand_home("/var/log/bot.log"), PathBuf::from("/var/log/bot.log"));
    }

    #[test]
    fn test_default_has_no_delays() {
        let cfg = Config::test_default();
        assert_eq!(cfg.chat.reveal_delay, Duration::ZERO);
        assert_eq!(cfg.chat.default_locale, Locale::Es);
    }
}
