//! Logger configuration and its environment-aware resolution.

use std::{fmt, str::FromStr, sync::Arc};

use serde::Deserialize;
use strum::{Display, EnumString};

use crate::handler::Handler;

/// Environment variable naming the minimum severity.
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Environment variable naming the output format.
pub const LOG_FORMAT: &str = "LOG_FORMAT";

/// Output format of the base handlers.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum LogFormat {
    /// Colorized human-readable text on the error stream.
    Text,
    /// Line-delimited structured JSON on the error stream.
    #[default]
    Json,
}

/// Optional logger configuration.
///
/// All fields are layered over environment-derived defaults by
/// [`Options::merge_with_env`]; see that method for the precedence rules.
#[derive(Clone, Default)]
pub struct Options {
    /// Minimum severity name. Unrecognized or empty means INFO.
    pub level: Option<String>,
    /// Output format name. Anything other than `"text"` means JSON.
    pub format: Option<String>,
    /// Enables the OpenTelemetry correlation decorator.
    pub open_telemetry: bool,
    /// A fully caller-owned handler, overriding everything else.
    pub handler: Option<Arc<dyn Handler>>,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("level", &self.level)
            .field("format", &self.format)
            .field("open_telemetry", &self.open_telemetry)
            .field("handler", &self.handler.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl Options {
    /// Defaults taken from the process environment, read afresh on every
    /// call. Callers mutating `LOG_LEVEL`/`LOG_FORMAT` between logger
    /// constructions see the updated values; nothing is cached.
    fn from_env() -> Self {
        Self {
            level: std::env::var(LOG_LEVEL).ok(),
            format: std::env::var(LOG_FORMAT).ok(),
            open_telemetry: false,
            handler: None,
        }
    }

    /// Merges these options with the environment-derived defaults.
    ///
    /// Precedence:
    /// - `level`/`format`: the environment wins whenever the variable is
    ///   set (even to an empty string); otherwise the caller's value holds;
    /// - `open_telemetry`: only an explicit `true` carries over; the
    ///   environment never enables or disables correlation;
    /// - `handler`: only a present handler carries over, and the
    ///   environment can never replace it.
    pub(crate) fn merge_with_env(&self) -> Self {
        let mut merged = Self::from_env();
        if std::env::var_os(LOG_LEVEL).is_none() {
            merged.level.clone_from(&self.level);
        }
        if std::env::var_os(LOG_FORMAT).is_none() {
            merged.format.clone_from(&self.format);
        }
        if self.open_telemetry {
            merged.open_telemetry = true;
        }
        if let Some(handler) = &self.handler {
            merged.handler = Some(Arc::clone(handler));
        }
        merged
    }

    /// The effective output format. Unrecognized names fall back to JSON.
    pub(crate) fn resolved_format(&self) -> LogFormat {
        self.format
            .as_deref()
            .map(|name| LogFormat::from_str(name).unwrap_or_default())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;
    use crate::handlers::test_util::CapturingHandler;

    // The merge reads process-global environment; tests touching it must
    // not interleave.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(Mutex::default);

    fn with_env<R>(vars: &[(&str, Option<&str>)], body: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved: Vec<_> = vars
            .iter()
            .map(|(name, _)| (*name, std::env::var(name).ok()))
            .collect();
        for (name, value) in vars {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
        let result = body();
        for (name, value) in saved {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
        result
    }

    #[test]
    fn environment_wins_over_caller_level_and_format() {
        with_env(
            &[(LOG_LEVEL, Some("DEBUG")), (LOG_FORMAT, Some("TEXT"))],
            || {
                let options = Options {
                    level: Some("ERROR".to_owned()),
                    format: Some("JSON".to_owned()),
                    ..Options::default()
                };
                let merged = options.merge_with_env();
                assert_eq!(merged.level.as_deref(), Some("DEBUG"));
                assert_eq!(merged.format.as_deref(), Some("TEXT"));
                assert_eq!(merged.resolved_format(), LogFormat::Text);
            },
        );
    }

    #[test]
    fn caller_values_hold_when_environment_is_unset() {
        with_env(&[(LOG_LEVEL, None), (LOG_FORMAT, None)], || {
            let options = Options {
                level: Some("WARN".to_owned()),
                format: Some("text".to_owned()),
                ..Options::default()
            };
            let merged = options.merge_with_env();
            assert_eq!(merged.level.as_deref(), Some("WARN"));
            assert_eq!(merged.resolved_format(), LogFormat::Text);
        });
    }

    #[test]
    fn handler_and_correlation_are_never_env_overridden() {
        with_env(
            &[(LOG_LEVEL, Some("INFO")), (LOG_FORMAT, Some("JSON"))],
            || {
                let handler = CapturingHandler::shared();
                let options = Options {
                    open_telemetry: true,
                    handler: Some(handler.clone()),
                    ..Options::default()
                };
                let merged = options.merge_with_env();
                assert!(merged.open_telemetry);
                assert!(merged.handler.is_some());
            },
        );
    }

    #[test]
    fn unrecognized_format_falls_back_to_json() {
        with_env(&[(LOG_LEVEL, None), (LOG_FORMAT, Some("xml"))], || {
            let merged = Options::default().merge_with_env();
            assert_eq!(merged.resolved_format(), LogFormat::Json);
        });
    }
}
