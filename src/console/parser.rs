//! Command line parser
//!
//! Whitespace split; the command is lowercased by the caller if needed.

/// Maximum arguments after the command name
pub const MAX_ARGS: usize = 3;

/// Parsed command with up to `MAX_ARGS` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub command: &'a str,
    pub args: [Option<&'a str>; MAX_ARGS],
    /// More tokens than `MAX_ARGS` were given
    pub overflow: bool,
}

impl<'a> ParsedCommand<'a> {
    pub const fn empty() -> Self {
        Self {
            command: "",
            args: [None; MAX_ARGS],
            overflow: false,
        }
    }

    /// Argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied().flatten()
    }

    /// Number of arguments present
    pub fn arg_count(&self) -> usize {
        self.args.iter().take_while(|a| a.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }
}

/// Split a command line into command and arguments
pub fn parse_line(line: &str) -> ParsedCommand<'_> {
    let mut parts = line.split_whitespace();
    let mut cmd = ParsedCommand::empty();

    cmd.command = parts.next().unwrap_or("");
    for (slot, arg) in cmd.args.iter_mut().zip(&mut parts) {
        *slot = Some(arg);
    }
    cmd.overflow = parts.next().is_some();
    cmd
}

/// Parse a number argument, mapping format errors to `InvalidValue`
pub(crate) fn parse_arg<T: core::str::FromStr>(
    cmd: &ParsedCommand<'_>,
    idx: usize,
) -> Result<T, super::ConsoleError> {
    cmd.arg(idx)
        .ok_or(super::ConsoleError::MissingArg)?
        .parse()
        .map_err(|_| super::ConsoleError::InvalidValue)
}
