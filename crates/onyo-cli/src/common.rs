//! Flags shared by every subcommand: `-C/-q/-y/-m/--no-auto-message`.
//!
//! Flattened into each subcommand's `Args` struct, the same pattern the
//! teacher uses for its own repeated `--format`/`--json` pair.

use std::path::PathBuf;

use clap::Args;
use onyo_git::GixGitAdapter;

/// Flags every subcommand accepts, regardless of what it does.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Run as if onyo was started in PATH instead of the current directory.
    #[arg(short = 'C', long = "directory", value_name = "PATH", global = true)]
    pub directory: Option<PathBuf>,

    /// Suppress informational output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Assume "yes" to any confirmation prompt.
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,

    /// A paragraph to append to the commit message (repeatable).
    #[arg(short = 'm', long = "message", value_name = "TEXT", global = true)]
    pub message: Vec<String>,

    /// Don't generate a subject line from the operations performed; use a
    /// generic placeholder unless `--message` is given.
    #[arg(long = "no-auto-message", global = true)]
    pub no_auto_message: bool,
}

impl CommonArgs {
    /// The directory to treat as the starting point for repository discovery.
    #[must_use]
    pub fn start_path(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// The commit subject override from `-m`, if any paragraphs were given.
    #[must_use]
    pub fn subject_override(&self) -> Option<String> {
        if self.message.is_empty() {
            None
        } else {
            Some(self.message.join("\n\n"))
        }
    }

    /// Whether a commit should get an auto-generated subject line.
    #[must_use]
    pub const fn auto_message(&self) -> bool {
        !self.no_auto_message
    }
}

/// Open the git adapter for the repository reachable from `common`'s start
/// path.
///
/// # Errors
/// Propagates [`onyo_git::GitError`] if no working tree is found there.
pub fn open_adapter(common: &CommonArgs) -> anyhow::Result<GixGitAdapter> {
    Ok(GixGitAdapter::open(&common.start_path())?)
}
