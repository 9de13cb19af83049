//! Configuration for the `ksh` front end.
//!
//! Loaded from `<config dir>/kestrel/config.toml`. Every section is
//! optional; missing keys take their defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use etcetera::BaseStrategy;
use kestrel_core::builtins::default_bindings;
use kestrel_core::keymap::{rebind, RawBinding};
use kestrel_core::SessionConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub logging: LoggingConfig,
    pub scroll: ScrollConfig,
    pub history: HistoryConfig,
    /// Key-sequence text to action text, applied over the default bindings.
    pub keys: BTreeMap<String, String>,
    /// Command lines run once the window exists.
    pub startup: Vec<String>,
    pub new_tab_page: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: Option<PathBuf>,
    pub level: String,
    pub suppressed_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Pixels per scroll builtin.
    pub delta: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Zero disables history.
    pub max_len: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            level: "warn".to_string(),
            suppressed_patterns: Vec::new(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self { delta: 40 }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_len: 1000 }
    }
}

impl ShellConfig {
    /// Where [`ShellConfig::load_default`] looks.
    pub fn default_path() -> Result<PathBuf> {
        let strategy = etcetera::choose_base_strategy().context("could not locate the home directory")?;
        Ok(strategy.config_dir().join("kestrel").join("config.toml"))
    }

    /// Load configuration from the default location.
    ///
    /// Falls back to defaults if the file doesn't exist.
    /// Returns an error only if the file exists but is malformed.
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str::<ShellConfig>(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.logging.log_file = Some(path.into());
        self
    }

    /// Set the log level (e.g., "info", "debug", "warn").
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    #[must_use]
    pub fn with_scroll_delta(mut self, delta: i64) -> Self {
        self.scroll.delta = delta;
        self
    }

    #[must_use]
    pub fn with_max_history_len(mut self, max_len: usize) -> Self {
        self.history.max_len = max_len;
        self
    }

    /// Bind `from` to `to`, replacing any configured binding of `from`.
    #[must_use]
    pub fn with_key(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.keys.insert(from.into(), to.into());
        self
    }

    #[must_use]
    pub fn with_startup_command(mut self, line: impl Into<String>) -> Self {
        self.startup.push(line.into());
        self
    }

    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        let defaults = SessionConfig::default();
        SessionConfig {
            scroll_delta: self.scroll.delta,
            max_history_len: self.history.max_len,
            new_tab_page: self.new_tab_page.clone().unwrap_or(defaults.new_tab_page),
        }
    }

    /// The default bindings with `[keys]` merged over them.
    #[must_use]
    pub fn raw_bindings(&self) -> Vec<RawBinding> {
        let mut raws = default_bindings();
        for (from, to) in &self.keys {
            rebind(&mut raws, RawBinding::new(from.as_str(), to.as_str()));
        }
        raws
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = ShellConfig::default();
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.log_file.is_none());
        assert_eq!(config.scroll.delta, 40);
        assert_eq!(config.history.max_len, 1000);
        assert!(config.keys.is_empty());
        assert_eq!(config.session_config(), SessionConfig::default());
    }

    #[test]
    fn builder_methods_override_defaults() {
        let config = ShellConfig::default()
            .with_log_level("debug")
            .with_log_file("/tmp/ksh.log")
            .with_scroll_delta(25)
            .with_max_history_len(0)
            .with_startup_command("set w:enable-javascript off");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.log_file.as_deref(), Some(Path::new("/tmp/ksh.log")));
        let session = config.session_config();
        assert_eq!(session.scroll_delta, 25);
        assert_eq!(session.max_history_len, 0);
        assert_eq!(config.startup, ["set w:enable-javascript off"]);
    }

    #[test]
    fn deserialize_partial_config() {
        let toml_str = r#"
new_tab_page = "https://start.example"
startup = ["aqm gh https://github.com"]

[scroll]
delta = 80

[keys]
",x" = "b:tabClose"
"#;
        let config = toml::from_str::<ShellConfig>(toml_str).expect("should deserialize");
        assert_eq!(config.scroll.delta, 80);
        // History should be default
        assert_eq!(config.history.max_len, 1000);
        assert_eq!(config.keys.get(",x").map(String::as_str), Some("b:tabClose"));
        assert_eq!(config.session_config().new_tab_page, "https://start.example");
        assert_eq!(config.startup.len(), 1);
    }

    #[test]
    fn keys_rebind_defaults_in_place() {
        let defaults = default_bindings();
        let config = ShellConfig::default().with_key("j", "b:scrollUp").with_key(",x", "b:tabClose");
        let raws = config.raw_bindings();

        assert_eq!(raws.len(), defaults.len() + 1);
        assert!(raws.iter().any(|r| r.from == "j" && r.to == "b:scrollUp"));
        assert_eq!(raws.last().map(|r| r.from.as_str()), Some(",x"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[logging]\nlevel = \"debug\"\nsuppressed_patterns = [\"noisy\"]").expect("write");

        let config = ShellConfig::load_from(file.path()).expect("should load");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.suppressed_patterns, ["noisy"]);
    }

    #[test]
    fn load_from_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[scroll]\ndelta = \"fast\"").expect("write");
        assert!(ShellConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn load_from_nonexistent_path_returns_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = ShellConfig::load_from(&dir.path().join("missing.toml"));
        assert!(result.is_err());
    }
}
