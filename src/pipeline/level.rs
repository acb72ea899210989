//! Record severity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(alias = "debug")]
    Debug,
    #[serde(alias = "information", alias = "info", alias = "Info")]
    Information,
    #[serde(alias = "warning", alias = "warn", alias = "Warn")]
    Warning,
    #[serde(alias = "error")]
    Error,
    #[serde(alias = "fatal")]
    Fatal,
}

impl Level {
    /// Full name as sent to collectors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "Debug",
            Level::Information => "Information",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
        }
    }

    /// Three-letter tag used on the console.
    pub fn short(&self) -> &'static str {
        match self {
            Level::Debug => "DBG",
            Level::Information => "INF",
            Level::Warning => "WRN",
            Level::Error => "ERR",
            Level::Fatal => "FTL",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Information
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "dbg" => Ok(Level::Debug),
            "information" | "info" | "inf" => Ok(Level::Information),
            "warning" | "warn" | "wrn" => Ok(Level::Warning),
            "error" | "err" => Ok(Level::Error),
            "fatal" | "ftl" => Ok(Level::Fatal),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::Debug < Level::Information);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Fatal > Level::Error);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("Information".parse::<Level>().unwrap(), Level::Information);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_serialized_name() {
        assert_eq!(serde_json::to_string(&Level::Information).unwrap(), "\"Information\"");
        let parsed: Level = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(parsed, Level::Warning);
    }
}
