use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Numeral system used to print results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Decimal,
    Hex,
    Binary,
    Octal,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Decimal, Mode::Hex, Mode::Binary, Mode::Octal];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Decimal => "decimal",
            Mode::Hex => "hex",
            Mode::Binary => "binary",
            Mode::Octal => "octal",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    // exact match only, `Hex` and ` hex` are rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| ConfigError::InvalidMode(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidMode(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMode(name) => write!(f, "Invalid mode type ‘{name}’"),
        }
    }
}

impl Error for ConfigError {}

/// Everything the session needs to know about output, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub mode: Mode,
    /// Mantissa bits for non-integer decimal results, `0` picks a precision
    /// from the value itself.
    pub precision: u32,
}
