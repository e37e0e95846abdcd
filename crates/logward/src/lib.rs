#![forbid(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

//! Leveled structured-logging facade.
//!
//! This crate wraps record output behind a narrow [`Handler`] capability
//! and puts a convenience facade in front of it: custom severities beyond
//! the usual set ([`Level::TRACE`], [`Level::NOTICE`], plus the terminal
//! [`Level::PANIC`] and [`Level::FATAL`]), printf-style and context-aware
//! variants of every logging call, persistent attributes and key groups on
//! derived loggers, environment-aware configuration, and propagation of a
//! logger through request-scoped [`Context`] values and tower middleware.
//!
//! Encoding, coloring and I/O live in the handlers. The facade only
//! filters, builds records and forwards. Logging is best-effort by
//! contract: no logging method ever returns an error, and a handler write
//! failure is silently discarded.
//!
//! ```
//! use logward::{Logger, Options};
//!
//! let log = Logger::with_options(Options {
//!     level: Some("DEBUG".to_owned()),
//!     ..Options::default()
//! });
//! log.info("listening", &["addr".into(), "0.0.0.0:8080".into()]);
//! log.debugf(format_args!("attempt {}", 2));
//! ```

pub mod bridge;
pub mod context;
pub mod facade;
pub mod handler;
pub mod handlers;
pub mod level;
pub mod options;
pub mod record;

pub use self::{
    context::{from_context, logger_from_extensions, Context, LoggerLayer, LoggerService},
    facade::Logger,
    handler::{EmitError, Handler},
    handlers::{json::JsonHandler, otel::OtelHandler, text::TextHandler},
    level::Level,
    options::{LogFormat, Options, LOG_FORMAT, LOG_LEVEL},
    record::{pair_args, Attr, LogArg, Record, BAD_KEY},
};
