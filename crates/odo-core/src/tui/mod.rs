//! Terminal user interface using cliclack
//!
//! This module is optional and only available when the `tui` feature is enabled.

mod prompts;
mod terminal;

pub use prompts::{run_init, InitArgs};
pub use terminal::TerminalPrompter;
