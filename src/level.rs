use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Severity scale used for admission filtering and for the `Level` field of
/// shipped documents.
///
/// Ordered from most to least severe. `tracing` itself has no panic/fatal
/// levels; they are part of the scale so records land on the same axis as
/// those of other producers writing into a shared index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Panic,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
}

/// The full scale, most severe first.
pub const SCALE: [Severity; 6] = [
    Severity::Panic,
    Severity::Fatal,
    Severity::Error,
    Severity::Warn,
    Severity::Info,
    Severity::Debug,
];

impl Severity {
    /// All severities at least as severe as `min`, most severe first.
    pub fn accepted_from(min: Severity) -> Vec<Severity> {
        SCALE.iter().copied().filter(|level| *level <= min).collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Panic => "panic",
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        // TRACE has no slot on the scale and maps to the least severe level.
        if *level == tracing::Level::ERROR {
            Severity::Error
        } else if *level == tracing::Level::WARN {
            Severity::Warn
        } else if *level == tracing::Level::INFO {
            Severity::Info
        } else {
            Severity::Debug
        }
    }
}

/// Error type returned when parsing a severity from a string.
#[derive(thiserror::Error, Debug)]
#[error("unknown severity level: {0:?}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "panic" => Ok(Severity::Panic),
            "fatal" => Ok(Severity::Fatal),
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warn),
            "info" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}
