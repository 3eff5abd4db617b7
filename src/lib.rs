//! Promptchip is a mention-aware prompt editor for terminal and embedded hosts.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the prompt document model, the `[Model:X]`/`[Tool:Y]`
//!   serializer, trigger scanning, candidate filtering, the completion state
//!   machine, atomic mention insertion, and the [`core::editor::MentionEditor`]
//!   session that ties them together.
//! - [`ui`] renders an editor session in an inline terminal viewport.
//! - [`cli`] parses arguments and dispatches to the composer, the `parse` and
//!   `complete` inspection commands, and configuration settings.
//! - [`utils`] holds input sanitizing and logging setup.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
