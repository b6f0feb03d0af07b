//! Output format selection for commands that can render structured data.
//!
//! Grounded on the teacher's `src/format.rs::OutputFormat`: an explicit
//! flag wins, then an environment variable, then TTY detection — text when
//! piped, pretty when attached to a terminal.

use std::io::IsTerminal;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::Serialize;

/// Output format for structured data (`tree`, `show`, `fsck`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Colored, human-friendly output for terminals.
    Pretty,
    /// JSON, machine-parseable.
    Json,
    /// Compact plain text.
    #[default]
    Text,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => bail!("invalid format '{s}'. Use: text, json, or pretty"),
        }
    }
}

impl OutputFormat {
    /// Resolve the output format: explicit flag, then `ONYO_FORMAT`, then
    /// TTY detection.
    #[must_use]
    pub fn resolve(explicit: Option<Self>) -> Self {
        if let Some(fmt) = explicit {
            return fmt;
        }
        if let Ok(env_format) = std::env::var("ONYO_FORMAT")
            && let Ok(fmt) = env_format.parse::<Self>()
        {
            return fmt;
        }
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Text
        }
    }

    /// Serialize `data` for this format. `Text`/`Pretty` are expected to be
    /// rendered by a format-specific printer instead; this only covers JSON.
    pub fn serialize<T: Serialize>(self, data: &T) -> Result<String> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(data)?),
            Self::Text | Self::Pretty => bail!("{self:?} format should not use serialize()"),
        }
    }
}
