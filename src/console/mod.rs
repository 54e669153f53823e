//! Serial console for tone control and diagnostics
//!
//! Polled from the main loop, one byte at a time. No heap allocation.

pub mod commands;
#[allow(clippy::module_inception)]
pub mod console;
pub mod error;
pub mod line_buffer;
pub mod parser;

pub use commands::{command_names, execute, Context, COMMANDS, VERSION};
pub use console::Console;
pub use error::ConsoleError;
pub use line_buffer::{LineBuffer, LINE_SIZE};
pub use parser::{parse_line, ParsedCommand};
