//! `onyo` -- a text-based inventory manager built on a git working tree.

mod cat;
mod common;
mod config;
mod edit;
mod fsck;
mod format;
mod get;
mod history;
mod init;
mod kv;
mod mkdir;
mod mv;
mod new;
mod rm;
mod rmdir;
mod set;
mod shell_completion;
mod show;
mod tree;
mod tsv_to_yaml;
mod unset;

use clap::{Parser, Subcommand};

/// Manage a text-based asset inventory tracked in git.
#[derive(Parser, Debug)]
#[command(name = "onyo")]
#[command(version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize an onyo repository.
    Init(init::InitArgs),
    /// Create a new asset.
    New(new::NewArgs),
    /// Create one or more tracked directories.
    Mkdir(mkdir::MkdirArgs),
    /// Rename or move assets and directories.
    Mv(mv::MvArgs),
    /// Remove assets or directories.
    Rm(rm::RmArgs),
    /// Remove empty tracked directories.
    Rmdir(rmdir::RmdirArgs),
    /// Set document fields on assets.
    Set(set::SetArgs),
    /// Remove document fields from assets.
    Unset(unset::UnsetArgs),
    /// Open assets in the configured editor.
    Edit(edit::EditArgs),
    /// Query tracked assets.
    Get(get::GetArgs),
    /// Print the tracked directory tree.
    Tree(tree::TreeArgs),
    /// Print a rendered summary of assets or directories.
    Show(show::ShowArgs),
    /// Print the raw YAML document of one or more assets.
    Cat(cat::CatArgs),
    /// Convert a TSV file into YAML documents.
    #[command(name = "tsv-to-yaml")]
    TsvToYaml(tsv_to_yaml::TsvToYamlArgs),
    /// Read or write onyo-tracked configuration.
    Config(config::ConfigArgs),
    /// Check repository invariants.
    Fsck(fsck::FsckArgs),
    /// Show the commit history touching a path.
    History(history::HistoryArgs),
    /// Print a shell completion script.
    #[command(name = "shell-completion")]
    ShellCompletion(shell_completion::ShellCompletionArgs),
}

fn main() {
    onyo::telemetry::init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "dispatching");
    let result = match &cli.command {
        Commands::Init(args) => init::run(args),
        Commands::New(args) => new::run(args),
        Commands::Mkdir(args) => mkdir::run(args),
        Commands::Mv(args) => mv::run(args),
        Commands::Rm(args) => rm::run(args),
        Commands::Rmdir(args) => rmdir::run(args),
        Commands::Set(args) => set::run(args),
        Commands::Unset(args) => unset::run(args),
        Commands::Edit(args) => edit::run(args),
        Commands::Get(args) => get::run(args),
        Commands::Tree(args) => tree::run(args),
        Commands::Show(args) => show::run(args),
        Commands::Cat(args) => cat::run(args),
        Commands::TsvToYaml(args) => tsv_to_yaml::run(args),
        Commands::Config(args) => config::run(args),
        Commands::Fsck(args) => fsck::run(args),
        Commands::History(args) => history::run(args),
        Commands::ShellCompletion(args) => shell_completion::run(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("onyo: {err}");
            let exit_code = if err.downcast_ref::<onyo::OnyoError>().is_some()
                || err.downcast_ref::<onyo_git::GitError>().is_some()
            {
                1
            } else {
                2
            };
            std::process::exit(exit_code);
        }
    }
}
