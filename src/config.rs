//! onyo configuration (`.onyo/config`).
//!
//! Defines the typed, onyo-tracked configuration file plus the layered
//! resolution of each recognised key against the git config chain.
//!
//! The onyo-tracked file is TOML, not YAML — YAML is reserved for asset
//! documents, so the two concerns stay visually distinct on disk. The file
//! lives at `.onyo/config` and is committed like any other tracked path.

use std::fmt;
use std::path::Path;

use onyo_git::{ConfigScope, GitAdapter};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// The onyo-tracked repository configuration.
///
/// Parsed from `.onyo/config`. Missing fields use sensible defaults; a
/// missing file is equivalent to all defaults (not an error).
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnyoConfig {
    /// `onyo.core.*` settings.
    #[serde(default, rename = "core")]
    pub core: CoreConfig,

    /// `onyo.history.*` settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// `onyo.new.*` settings.
    #[serde(default, rename = "new")]
    pub new: NewConfig,

    /// `onyo.assets.*` settings.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// `onyo.repo.*` settings.
    #[serde(default)]
    pub repo: RepoConfig,
}

// ---------------------------------------------------------------------------
// CoreConfig
// ---------------------------------------------------------------------------

/// `onyo.core.*` settings.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    /// Editor used for `onyo new`/`onyo edit`.
    ///
    /// Unset here falls back to git's `core.editor`, then `$EDITOR`, then
    /// `"nano"`. See [`OnyoConfig::resolve_editor`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

// ---------------------------------------------------------------------------
// HistoryConfig
// ---------------------------------------------------------------------------

/// `onyo.history.*` settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Command used by `onyo history` in an interactive terminal.
    #[serde(default = "default_history_interactive")]
    pub interactive: String,

    /// Command used by `onyo history` when output is not a terminal.
    #[serde(rename = "non-interactive", default = "default_history_non_interactive")]
    pub non_interactive: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            interactive: default_history_interactive(),
            non_interactive: default_history_non_interactive(),
        }
    }
}

fn default_history_interactive() -> String {
    "tig --follow".to_owned()
}

fn default_history_non_interactive() -> String {
    "git --no-pager log --follow".to_owned()
}

// ---------------------------------------------------------------------------
// NewConfig
// ---------------------------------------------------------------------------

/// `onyo.new.*` settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewConfig {
    /// Default template used by `onyo new` when `--template` is omitted.
    #[serde(default = "default_template")]
    pub template: String,
}

impl Default for NewConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
        }
    }
}

fn default_template() -> String {
    "empty".to_owned()
}

// ---------------------------------------------------------------------------
// AssetsConfig
// ---------------------------------------------------------------------------

/// `onyo.assets.*` settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsConfig {
    /// Name template used to derive a filename from bound fields.
    #[serde(rename = "name-format", default = "default_name_format")]
    pub name_format: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            name_format: default_name_format(),
        }
    }
}

fn default_name_format() -> String {
    "{type}_{make}_{model}.{serial}".to_owned()
}

// ---------------------------------------------------------------------------
// RepoConfig
// ---------------------------------------------------------------------------

/// `onyo.repo.*` settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    /// Repository format version, used to gate compatibility between onyo
    /// releases. `None` means unset (a fresh repository that hasn't recorded
    /// one yet).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

/// The repository format version written by `onyo init`.
pub const CURRENT_REPO_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading an onyo configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<std::path::PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl OnyoConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML or unknown fields,
    ///   returns a [`ConfigError`] with line-level detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError { path: None, message }
        })
    }

    /// Serialize back to TOML, for `onyo config set` against the
    /// `onyo-tracked` scope.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if serialization fails (should not happen
    /// for a value built only through this type's own setters).
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError {
            path: None,
            message: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Layered resolution
// ---------------------------------------------------------------------------

/// Resolves a recognised `onyo.*` key across scopes.
///
/// Resolution order: the git config chain (local, then global, then system)
/// takes precedence, then the repo-local onyo-tracked config
/// (`.onyo/config`), then the key's own hardcoded default.
pub struct ConfigResolver<'a> {
    onyo: &'a OnyoConfig,
    git: &'a dyn GitAdapter,
}

impl<'a> ConfigResolver<'a> {
    /// Build a resolver over an onyo-tracked config and a git adapter.
    #[must_use]
    pub const fn new(onyo: &'a OnyoConfig, git: &'a dyn GitAdapter) -> Self {
        Self { onyo, git }
    }

    fn git_chain(&self, key: &str) -> Option<String> {
        for scope in [ConfigScope::Local, ConfigScope::Global, ConfigScope::System] {
            if let Ok(Some(value)) = self.git.config_get(key, scope) {
                return Some(value);
            }
        }
        None
    }

    /// `onyo.core.editor`, falling back to git's `core.editor`, then the
    /// onyo-tracked config, then `$EDITOR`, then `"nano"`.
    #[must_use]
    pub fn editor(&self) -> String {
        if let Some(editor) = self.git_chain("onyo.core.editor") {
            return editor;
        }
        if let Some(editor) = self.git_chain("core.editor") {
            return editor;
        }
        if let Some(editor) = &self.onyo.core.editor {
            return editor.clone();
        }
        if let Ok(editor) = std::env::var("EDITOR") {
            if !editor.is_empty() {
                return editor;
            }
        }
        "nano".to_owned()
    }

    /// `onyo.history.interactive`.
    #[must_use]
    pub fn history_interactive(&self) -> String {
        self.git_chain("onyo.history.interactive")
            .unwrap_or_else(|| self.onyo.history.interactive.clone())
    }

    /// `onyo.history.non-interactive`.
    #[must_use]
    pub fn history_non_interactive(&self) -> String {
        self.git_chain("onyo.history.non-interactive")
            .unwrap_or_else(|| self.onyo.history.non_interactive.clone())
    }

    /// `onyo.new.template`.
    #[must_use]
    pub fn new_template(&self) -> String {
        self.git_chain("onyo.new.template")
            .unwrap_or_else(|| self.onyo.new.template.clone())
    }

    /// `onyo.assets.name-format`.
    #[must_use]
    pub fn name_format(&self) -> String {
        self.git_chain("onyo.assets.name-format")
            .unwrap_or_else(|| self.onyo.assets.name_format.clone())
    }

    /// `onyo.repo.version`, if recorded anywhere.
    #[must_use]
    pub fn repo_version(&self) -> Option<u32> {
        if let Some(version) = self.git_chain("onyo.repo.version").and_then(|v| v.parse().ok()) {
            return Some(version);
        }
        self.onyo.repo.version
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use onyo_git::FakeGitAdapter;
    use std::path::PathBuf;

    #[test]
    fn defaults_all_fields() {
        let cfg = OnyoConfig::default();
        assert_eq!(cfg.core.editor, None);
        assert_eq!(cfg.history.interactive, "tig --follow");
        assert_eq!(cfg.history.non_interactive, "git --no-pager log --follow");
        assert_eq!(cfg.new.template, "empty");
        assert_eq!(cfg.assets.name_format, "{type}_{make}_{model}.{serial}");
        assert_eq!(cfg.repo.version, None);
    }

    #[test]
    fn parse_empty_string() {
        let cfg = OnyoConfig::parse("").unwrap();
        assert_eq!(cfg, OnyoConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[core]
editor = "vim"

[history]
interactive = "lazygit"
non-interactive = "git log"

[new]
template = "laptop"

[assets]
name-format = "{type}.{serial}"

[repo]
version = 1
"#;
        let cfg = OnyoConfig::parse(toml).unwrap();
        assert_eq!(cfg.core.editor.as_deref(), Some("vim"));
        assert_eq!(cfg.history.interactive, "lazygit");
        assert_eq!(cfg.history.non_interactive, "git log");
        assert_eq!(cfg.new.template, "laptop");
        assert_eq!(cfg.assets.name_format, "{type}.{serial}");
        assert_eq!(cfg.repo.version, Some(1));
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let toml = r#"
[new]
template = "minimal"
"#;
        let cfg = OnyoConfig::parse(toml).unwrap();
        assert_eq!(cfg.new.template, "minimal");
        assert_eq!(cfg.assets.name_format, "{type}_{make}_{model}.{serial}");
    }

    #[test]
    fn parse_rejects_unknown_top_level_field() {
        let err = OnyoConfig::parse("unknown_field = true\n").unwrap_err();
        assert!(err.message.contains("unknown field"));
    }

    #[test]
    fn parse_rejects_unknown_nested_field() {
        let toml = "[core]\nextra = \"oops\"\n";
        let err = OnyoConfig::parse(toml).unwrap_err();
        assert!(err.message.contains("unknown field"));
    }

    #[test]
    fn parse_includes_line_number_on_error() {
        let toml = "good = 1\n[core]\neditor = 1\n";
        let err = OnyoConfig::parse(toml).unwrap_err();
        assert!(err.message.contains("line"));
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let cfg = OnyoConfig::load(Path::new("/nonexistent/.onyo/config")).unwrap();
        assert_eq!(cfg, OnyoConfig::default());
    }

    #[test]
    fn load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "[new]\ntemplate = \"server\"\n").unwrap();
        let cfg = OnyoConfig::load(&path).unwrap();
        assert_eq!(cfg.new.template, "server");
    }

    #[test]
    fn load_invalid_file_shows_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "not valid [[[toml").unwrap();
        let err = OnyoConfig::load(&path).unwrap_err();
        assert_eq!(err.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn round_trips_through_to_toml_string() {
        let mut cfg = OnyoConfig::default();
        cfg.new.template = "laptop".to_owned();
        let rendered = cfg.to_toml_string().unwrap();
        let reparsed = OnyoConfig::parse(&rendered).unwrap();
        assert_eq!(cfg, reparsed);
    }

    // -- ConfigResolver --

    #[test]
    fn resolve_editor_prefers_git_chain_over_onyo_tracked() {
        let mut onyo = OnyoConfig::default();
        onyo.core.editor = Some("emacs".to_owned());
        let git = FakeGitAdapter::new(PathBuf::from("/repo"));
        git.config_set("core.editor", "vim", ConfigScope::Global).unwrap();
        let resolver = ConfigResolver::new(&onyo, &git);
        assert_eq!(resolver.editor(), "vim");
    }

    #[test]
    fn resolve_editor_falls_back_to_onyo_tracked_when_git_chain_unset() {
        let mut onyo = OnyoConfig::default();
        onyo.core.editor = Some("emacs".to_owned());
        let git = FakeGitAdapter::new(PathBuf::from("/repo"));
        let resolver = ConfigResolver::new(&onyo, &git);
        assert_eq!(resolver.editor(), "emacs");
    }

    #[test]
    fn resolve_editor_falls_back_to_git_core_editor() {
        let onyo = OnyoConfig::default();
        let git = FakeGitAdapter::new(PathBuf::from("/repo"));
        git.config_set("core.editor", "vim", ConfigScope::Global).unwrap();
        let resolver = ConfigResolver::new(&onyo, &git);
        assert_eq!(resolver.editor(), "vim");
    }

    #[test]
    fn resolve_editor_falls_back_to_nano() {
        // SAFETY: single-threaded test process; no other test reads EDITOR
        // concurrently with this one mutating it.
        unsafe {
            std::env::remove_var("EDITOR");
        }
        let onyo = OnyoConfig::default();
        let git = FakeGitAdapter::new(PathBuf::from("/repo"));
        let resolver = ConfigResolver::new(&onyo, &git);
        assert_eq!(resolver.editor(), "nano");
    }

    #[test]
    fn resolve_name_format_prefers_git_chain_over_hardcoded_default() {
        let onyo = OnyoConfig::default();
        let git = FakeGitAdapter::new(PathBuf::from("/repo"));
        git.config_set("onyo.assets.name-format", "{serial}", ConfigScope::Local)
            .unwrap();
        let resolver = ConfigResolver::new(&onyo, &git);
        assert_eq!(resolver.name_format(), "{serial}");
    }

    #[test]
    fn resolve_repo_version_reads_git_chain_first() {
        let mut onyo = OnyoConfig::default();
        onyo.repo.version = Some(2);
        let git = FakeGitAdapter::new(PathBuf::from("/repo"));
        git.config_set("onyo.repo.version", "1", ConfigScope::Local).unwrap();
        let resolver = ConfigResolver::new(&onyo, &git);
        assert_eq!(resolver.repo_version(), Some(1));
    }

    #[test]
    fn resolve_repo_version_falls_back_to_onyo_tracked() {
        let mut onyo = OnyoConfig::default();
        onyo.repo.version = Some(2);
        let git = FakeGitAdapter::new(PathBuf::from("/repo"));
        let resolver = ConfigResolver::new(&onyo, &git);
        assert_eq!(resolver.repo_version(), Some(2));
    }
}
