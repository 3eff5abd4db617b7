//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod settings;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use crate::cli::settings::{apply_set, apply_unset, SettingRegistry};
use crate::core::completion::PopupView;
use crate::core::config::Config;
use crate::core::editor::{EditorEvent, MentionEditor};
use crate::core::registry::MentionRegistry;
use crate::core::serializer::parse_with_defaults;
use crate::ui::composer::{run_composer, ComposerOutcome};
use crate::utils::logging::init_tracing;

#[derive(Parser)]
#[command(name = "promptchip")]
#[command(about = "Compose prompts with inline @model and @tool mentions")]
#[command(
    long_about = "Promptchip is a terminal prompt composer. Type @ followed by part of a model \
or tool name to open the completion popup; the chosen entry becomes a chip that \
serializes as [Model:Label] or [Tool:Label].\n\n\
Controls:\n\
  Up/Down           Move through completion candidates\n\
  Enter/Tab         Insert the highlighted candidate (Enter submits when no popup is open)\n\
  Esc               Close the popup, or cancel when no popup is open\n\
  Alt+Enter/Ctrl+J  Insert a line break\n\
  Backspace/Delete  Remove a character, or a whole chip\n\n\
Environment Variables:\n\
  RUST_LOG          Diagnostic log filter (defaults to warn)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// JSON file of mention entries (overrides the configured registry)
    #[arg(short = 'r', long, global = true, value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Write diagnostic logs to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive composer (default)
    Compose {
        /// Text to start with; [Model:X] and [Tool:Y] tokens become chips
        #[arg(short, long)]
        initial: Option<String>,
    },
    /// Parse serialized text and print the document as JSON
    Parse {
        /// Serialized prompt text
        text: String,
    },
    /// Print the completion popup for TEXT with the caret at --caret as JSON
    Complete {
        /// Serialized prompt text
        text: String,
        /// Caret offset (defaults to the end of TEXT)
        #[arg(short, long)]
        caret: Option<usize>,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

#[derive(Debug, Serialize)]
struct CompletionReport {
    caret: usize,
    popup: PopupView,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    let config = Config::load()?;
    match args.command.unwrap_or(Commands::Compose { initial: None }) {
        Commands::Compose { initial } => {
            let registry = load_registry(&config, args.registry.as_deref())?;
            match run_composer(initial.as_deref().unwrap_or(""), registry, &config)? {
                ComposerOutcome::Submitted(text) => println!("{text}"),
                ComposerOutcome::Cancelled => debug!("composer cancelled"),
            }
            Ok(())
        }
        Commands::Parse { text } => {
            let registry = load_registry(&config, args.registry.as_deref())?;
            let document = parse_with_defaults(&text, &registry, &config.kind_defaults());
            debug!(segments = document.segments().len(), "parsed prompt");
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        Commands::Complete { text, caret } => {
            let registry = load_registry(&config, args.registry.as_deref())?;
            let report = complete(&text, caret, registry, &config);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Set { key, value } => {
            let settings = SettingRegistry::new();
            let Some(key) = key.filter(|_| !value.is_empty()) else {
                print_settings(&settings, &config);
                return Ok(());
            };
            let mut config = config;
            match apply_set(&settings, &key, &value, &mut config, |c| c.save()) {
                Ok(message) => println!("{message}"),
                Err(err) => {
                    err.print();
                    std::process::exit(err.exit_code());
                }
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let settings = SettingRegistry::new();
            let mut config = config;
            match apply_unset(&settings, &key, &mut config, |c| c.save()) {
                Ok(message) => println!("{message}"),
                Err(err) => {
                    err.print();
                    std::process::exit(err.exit_code());
                }
            }
            Ok(())
        }
    }
}

fn load_registry(
    config: &Config,
    registry_override: Option<&Path>,
) -> Result<MentionRegistry, Box<dyn Error>> {
    let registry = config.load_registry(registry_override)?;
    debug!(entries = registry.len(), "mention registry loaded");
    Ok(registry)
}

fn complete(
    text: &str,
    caret: Option<usize>,
    registry: MentionRegistry,
    config: &Config,
) -> CompletionReport {
    let mut editor = MentionEditor::new(text, registry, config.editor_config());
    if let Some(caret) = caret {
        editor.handle(EditorEvent::SetCaret(caret));
    }
    CompletionReport {
        caret: editor.caret(),
        popup: editor.popup(),
    }
}

fn print_settings(settings: &SettingRegistry, config: &Config) {
    println!("Current configuration:");
    for line in settings.format_all(config) {
        println!("{line}");
    }
    for line in config.mention_lines() {
        println!("{line}");
    }
    println!();
    println!("Keys: {}", settings.keys_display_order().join(", "));
}
