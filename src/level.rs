use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Severity attached to every shipped record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

/// Returned when a level name is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl Level {
    /// Upper-case name used on the wire and in the queue encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Closest `log` crate level; `log` has no critical tier.
    pub fn to_log_level(self) -> log::Level {
        match self {
            Level::Debug => log::Level::Debug,
            Level::Info => log::Level::Info,
            Level::Warning => log::Level::Warn,
            Level::Error | Level::Critical => log::Level::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("debug", Level::Debug)]
    #[case("INFO", Level::Info)]
    #[case("warn", Level::Warning)]
    #[case("Warning", Level::Warning)]
    #[case("error", Level::Error)]
    #[case("CRITICAL", Level::Critical)]
    fn parses_names_case_insensitively(#[case] input: &str, #[case] expected: Level) {
        assert_eq!(input.parse::<Level>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            "verbose".parse::<Level>(),
            Err(ParseLevelError("verbose".into()))
        );
    }

    #[test]
    fn critical_maps_to_log_error() {
        assert_eq!(Level::Critical.to_log_level(), log::Level::Error);
        assert_eq!(Level::Warning.to_string(), "WARNING");
    }

    #[test]
    fn defaults_to_info() {
        assert_eq!(Level::default(), Level::Info);
    }
}
