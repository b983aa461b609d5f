//! Prefs command - inspect remembered label settings.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use marktext_adapters::{PreferenceStore, Preferences};

use crate::config::AppConfig;

/// Arguments for the prefs command
#[derive(Args)]
pub struct PrefsArgs {
    #[command(subcommand)]
    pub command: PrefsCommand,

    /// Preference file (overrides default and config)
    #[arg(long, value_name = "FILE", global = true)]
    pub file: Option<PathBuf>,
}

/// Prefs subcommands
#[derive(Subcommand)]
pub enum PrefsCommand {
    /// Print the settings the next render starts from
    Show,
    /// Print preference file path
    Path,
    /// Forget remembered settings
    Reset,
}

/// Run the prefs command.
pub fn run(args: &PrefsArgs, config: &AppConfig) -> Result<()> {
    let store = args
        .file
        .as_ref()
        .or(config.preferences.path.as_ref())
        .map_or_else(PreferenceStore::open_default, PreferenceStore::at);

    match args.command {
        PrefsCommand::Show => show(&store),
        PrefsCommand::Path => {
            println!("{}", store.path().display());
            Ok(())
        }
        PrefsCommand::Reset => {
            store.reset()?;
            eprintln!("Preferences reset");
            Ok(())
        }
    }
}

fn show(store: &PreferenceStore) -> Result<()> {
    let stored = store.load();
    // Fill defaults so every key is printed
    let effective = Preferences {
        prefix: Some(stored.prefix().to_string()),
        selected_suffix: Some(stored.selected_suffix().to_string()),
        unselected_suffix: Some(stored.unselected_suffix().to_string()),
        auto_index_on: Some(stored.auto_index_on()),
        multi_prefix: Some(stored.multi_prefix()),
    };
    let text = toml::to_string(&effective).context("Failed to format preferences")?;
    print!("{text}");
    Ok(())
}
