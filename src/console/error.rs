//! Console errors, printed as `Exx: text`

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    UnknownCommand,
    /// Argument did not parse
    InvalidValue,
    MissingArg,
    OutOfRange,
    /// Control refused while a fault holds the engine down
    EngineDisabled,
    /// More arguments than the parser keeps
    TooManyArgs,
}

impl ConsoleError {
    const TABLE: [(&'static str, &'static str); 6] = [
        ("E01", "unknown command"),
        ("E02", "invalid value"),
        ("E03", "missing argument"),
        ("E04", "out of range"),
        ("E05", "engine disabled"),
        ("E06", "too many arguments"),
    ];

    fn entry(self) -> (&'static str, &'static str) {
        Self::TABLE[self as usize]
    }

    pub fn code(&self) -> &'static str {
        self.entry().0
    }

    pub fn message(&self) -> &'static str {
        self.entry().1
    }
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (code, text) = self.entry();
        write!(f, "{}: {}", code, text)
    }
}
