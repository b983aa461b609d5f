//! Fonts command - locate label fonts.

use anyhow::Result;
use clap::{Args, Subcommand};
use marktext_adapters::fonts::{fonts_dir, list_fonts as adapter_list_fonts, resolve_font};

use crate::config::AppConfig;

/// Arguments for the fonts command
#[derive(Args)]
pub struct FontsArgs {
    #[command(subcommand)]
    pub command: FontsCommand,
}

/// Fonts subcommands
#[derive(Subcommand)]
pub enum FontsCommand {
    /// List known fonts and whether they are installed
    List,
    /// Print the font the next render will use
    Path,
    /// Print the user font directory
    Dir,
}

/// Run the fonts command.
pub fn run(args: &FontsArgs, config: &AppConfig) -> Result<()> {
    match args.command {
        FontsCommand::List => list_fonts(),
        FontsCommand::Path => print_font(config),
        FontsCommand::Dir => {
            println!("{}", fonts_dir().display());
            Ok(())
        }
    }
}

#[allow(clippy::unnecessary_wraps)]
fn list_fonts() -> Result<()> {
    let fonts = adapter_list_fonts();

    println!("User font directory: {}", fonts_dir().display());
    println!();

    for (info, path) in &fonts {
        let status = if path.is_some() { "✓" } else { "✗" };
        let script = if info.cjk { "CJK" } else { "Latin" };
        match path {
            Some(p) => println!("  {status} {} [{script}] {}", info.name, p.display()),
            None => println!("  {status} {} [{script}] ({})", info.name, info.filename),
        }
    }

    println!();
    let installed = fonts.iter().filter(|(_, path)| path.is_some()).count();
    println!("{}/{} fonts installed", installed, fonts.len());

    Ok(())
}

fn print_font(config: &AppConfig) -> Result<()> {
    let path = resolve_font(config.render.font.as_deref())?;
    println!("{}", path.display());
    Ok(())
}
