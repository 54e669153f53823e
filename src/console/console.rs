//! Console state machine: bytes in, echo and command output out.

use core::fmt::Write;

use super::commands::{execute, Context, VERSION};
use super::{parse_line, ConsoleError, LineBuffer};
use crate::audio::ToneControl;

#[derive(Clone, Copy, PartialEq)]
enum EscapeState {
    Normal,
    Escape,  // Got ESC
    Bracket, // Got ESC [
}

/// Console state machine
pub struct Console {
    line: LineBuffer,
    escape_state: EscapeState,
    /// Previous byte was CR; swallow a following LF
    after_cr: bool,
}

impl Console {
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            escape_state: EscapeState::Normal,
            after_cr: false,
        }
    }

    /// Process a single input byte.
    ///
    /// Returns `Some(result)` when a non-empty line was executed.
    pub fn process_byte(
        &mut self,
        byte: u8,
        engine: &mut dyn ToneControl,
        now_us: u64,
        out: &mut dyn Write,
    ) -> Option<Result<(), ConsoleError>> {
        let after_cr = core::mem::replace(&mut self.after_cr, byte == b'\r');

        match self.escape_state {
            EscapeState::Escape => {
                self.escape_state = if byte == b'[' {
                    EscapeState::Bracket
                } else {
                    EscapeState::Normal
                };
                return None;
            }
            // Cursor keys and the like are not supported
            EscapeState::Bracket => {
                if (0x40..=0x7E).contains(&byte) {
                    self.escape_state = EscapeState::Normal;
                }
                return None;
            }
            EscapeState::Normal => {}
        }

        match byte {
            b'\n' if after_cr => None,

            // Enter
            b'\r' | b'\n' => {
                let _ = write!(out, "\r\n");
                let result = if self.line.is_empty() {
                    None
                } else {
                    let cmd = parse_line(self.line.as_str());
                    let mut ctx = Context { engine, now_us, out: &mut *out };
                    let result = execute(&cmd, &mut ctx);
                    if let Err(err) = result {
                        let _ = write!(out, "{}\r\n", err);
                    }
                    Some(result)
                };
                self.line.clear();
                self.print_prompt(out);
                result
            }

            // Backspace
            0x7F | 0x08 => {
                if self.line.backspace() {
                    let _ = write!(out, "\x08 \x08");
                }
                None
            }

            0x1B => {
                self.escape_state = EscapeState::Escape;
                None
            }

            // Ctrl+C
            0x03 => {
                let _ = write!(out, "^C\r\n");
                self.line.clear();
                self.print_prompt(out);
                None
            }

            // Printable character
            0x20..=0x7E => {
                if self.line.push(byte) {
                    let _ = out.write_char(byte as char);
                }
                None
            }

            _ => None,
        }
    }

    /// Current unfinished line
    pub fn pending_line(&self) -> &str {
        self.line.as_str()
    }

    pub fn print_prompt(&self, out: &mut dyn Write) {
        let _ = write!(out, "> ");
    }

    pub fn print_banner(&self, out: &mut dyn Write) {
        let _ = write!(out, "\r\n{}\r\nType 'help' for commands.\r\n", VERSION);
        self.print_prompt(out);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
