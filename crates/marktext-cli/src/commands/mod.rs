//! CLI command definitions and handlers.

pub mod fonts;
pub mod prefs;
pub mod render;

use clap::{Parser, Subcommand};

/// MarkText - Label photo batches with name placards
#[derive(Parser)]
#[command(name = "marktext")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared render arguments (paths, label text, output).
    #[command(flatten)]
    pub render: render::RenderArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Draw labels onto a batch of photos
    Render(render::RenderArgs),
    /// Show or reset remembered label settings
    Prefs(prefs::PrefsArgs),
    /// Locate fonts used for labels
    Fonts(fonts::FontsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every photo was labeled and saved.
    Success = 0,
    /// Some photos were skipped or could not be saved.
    Partial = 1,
    /// The command failed.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
