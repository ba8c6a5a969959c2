//! CLI module for Tapeflow
//!
//! One-shot subcommands (`move`, `lookup`, `list`, `config`) and the
//! interactive menu share the output helpers and error types here.

pub mod config;
pub mod error;
pub mod list;
pub mod lookup;
pub mod menu;
pub mod move_tape;
pub mod output;
