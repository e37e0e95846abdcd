//! Ordered log severities, including the non-standard TRACE, NOTICE, PANIC
//! and FATAL levels.

use std::fmt;

use colored::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ordered log severity.
///
/// Levels are opaque integers so that the gaps between the standard
/// severities can host the non-standard ones: TRACE below DEBUG, NOTICE
/// between INFO and WARN, and the two terminal severities PANIC and FATAL
/// above ERROR. A logger emits a record iff the record's level is greater
/// than or equal to the logger's configured minimum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i8);

impl Level {
    /// Fine-grained diagnostics, below DEBUG.
    pub const TRACE: Self = Self(-8);
    /// Developer diagnostics.
    pub const DEBUG: Self = Self(-4);
    /// Routine operational messages. The default minimum.
    pub const INFO: Self = Self(0);
    /// Normal but significant events, between INFO and WARN.
    pub const NOTICE: Self = Self(2);
    /// Something unexpected that the application can tolerate.
    pub const WARN: Self = Self(4);
    /// An operation failed.
    pub const ERROR: Self = Self(8);
    /// Terminal: the record is emitted, then a runtime fault is raised.
    pub const PANIC: Self = Self(12);
    /// Terminal: the record is emitted, then the process exits with status 1.
    pub const FATAL: Self = Self(16);

    /// Parses a level from its name, case-insensitively.
    ///
    /// `"WARNING"` is accepted as an alias for WARN. Unrecognized or empty
    /// input yields [`Level::INFO`]; this is a total function and never
    /// errors. The terminal severities are deliberately not parseable as a
    /// minimum level.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "TRACE" => Self::TRACE,
            "DEBUG" => Self::DEBUG,
            "INFO" => Self::INFO,
            "NOTICE" => Self::NOTICE,
            "WARN" | "WARNING" => Self::WARN,
            "ERROR" => Self::ERROR,
            _ => Self::INFO,
        }
    }

    /// The raw severity offset.
    pub const fn severity(self) -> i8 {
        self.0
    }

    /// The canonical uppercase name, or `"UNKNOWN"` for a severity outside
    /// the defined set.
    pub const fn as_str(self) -> &'static str {
        match self.0 {
            -8 => "TRACE",
            -4 => "DEBUG",
            0 => "INFO",
            2 => "NOTICE",
            4 => "WARN",
            8 => "ERROR",
            12 => "PANIC",
            16 => "FATAL",
            _ => "UNKNOWN",
        }
    }

    /// The display color for this level, consumed only by the text handler.
    pub const fn color(self) -> Color {
        match self.0 {
            -8 => Color::TrueColor {
                r: 88,
                g: 88,
                b: 88,
            },
            -4 => Color::TrueColor {
                r: 95,
                g: 95,
                b: 255,
            },
            0 => Color::TrueColor {
                r: 95,
                g: 255,
                b: 215,
            },
            2 => Color::TrueColor {
                r: 255,
                g: 215,
                b: 0,
            },
            4 => Color::TrueColor {
                r: 215,
                g: 255,
                b: 135,
            },
            8 => Color::TrueColor {
                r: 255,
                g: 95,
                b: 135,
            },
            12 => Color::TrueColor {
                r: 175,
                g: 95,
                b: 215,
            },
            16 => Color::TrueColor {
                r: 215,
                g: 0,
                b: 0,
            },
            _ => Color::White,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_maps_every_severity() {
        let cases = [
            ("", Level::INFO),
            ("TRACE", Level::TRACE),
            ("DEBUG", Level::DEBUG),
            ("INFO", Level::INFO),
            ("NOTICE", Level::NOTICE),
            ("WARN", Level::WARN),
            ("WARNING", Level::WARN),
            ("ERROR", Level::ERROR),
            ("gibberish", Level::INFO),
            ("PANIC", Level::INFO),
            ("FATAL", Level::INFO),
        ];
        for (input, want) in cases {
            assert_eq!(Level::from_name(input), want, "input: {input:?}");
        }
    }

    #[test]
    fn name_round_trips_case_varied() {
        for name in ["trace", "Debug", "INFO", "nOtIcE", "warn", "ERROR"] {
            assert_eq!(
                Level::from_name(name).as_str(),
                name.to_ascii_uppercase(),
                "input: {name:?}"
            );
        }
    }

    #[test]
    fn levels_are_totally_ordered() {
        let ascending = [
            Level::TRACE,
            Level::DEBUG,
            Level::INFO,
            Level::NOTICE,
            Level::WARN,
            Level::ERROR,
            Level::PANIC,
            Level::FATAL,
        ];
        for pair in ascending.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn unknown_severity_displays_as_unknown() {
        assert_eq!(Level(7).to_string(), "UNKNOWN");
    }
}
