//! The leveled-logging facade.

use std::{fmt, panic::Location, sync::Arc};

use crate::{
    context::Context,
    handler::{select_handler, Handler},
    level::Level,
    options::Options,
    record::{pair_args, Attr, LogArg, Record},
};

type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

/// A leveled structured logger.
///
/// The logger is a thin forwarding wrapper around one [`Handler`]: every
/// call checks the handler's level filter, builds a [`Record`] carrying the
/// caller's file/line, and hands it over. Handler write failures are
/// deliberately discarded.
///
/// Cloning is cheap and derivation ([`Logger::with`], [`Logger::with_group`])
/// never mutates the receiver, so a logger can be freely shared across
/// threads. The facade holds no lock of its own; write serialization under
/// concurrency is the handler's responsibility.
#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
    exit: ExitHook,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// A logger with default options: configuration read from the
    /// environment, records to the error stream.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// A logger configured by `options`, merged with the environment per
    /// [`Options::merge_with_env`].
    pub fn with_options(options: Options) -> Self {
        Self::from_handler(select_handler(&options))
    }

    /// A logger carrying a persistent `name` attribute.
    pub fn named(name: &str) -> Self {
        Self::new().with(&["name".into(), name.into()])
    }

    /// A named logger configured by `options`.
    pub fn named_with_options(name: &str, options: Options) -> Self {
        Self::with_options(options).with(&["name".into(), name.into()])
    }

    /// Wraps an existing handler directly, bypassing option resolution.
    pub fn from_handler(handler: Arc<dyn Handler>) -> Self {
        Self {
            handler,
            exit: Arc::new(|code| std::process::exit(code)),
        }
    }

    /// Replaces the process-termination seam used by the fatal methods.
    ///
    /// Defaults to [`std::process::exit`]; tests substitute a probe to
    /// observe the exit status without terminating the test process.
    #[must_use]
    pub fn with_exit_hook(mut self, hook: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.exit = Arc::new(hook);
        self
    }

    /// The handler this logger emits records to.
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Reports whether records at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        self.handler.enabled(level)
    }

    /// Returns a logger whose records persistently carry the attributes
    /// paired from `args`.
    #[must_use]
    pub fn with(&self, args: &[LogArg]) -> Self {
        let attrs = pair_args(args);
        if attrs.is_empty() {
            return self.clone();
        }
        Self {
            handler: self.handler.with_attrs(attrs),
            exit: Arc::clone(&self.exit),
        }
    }

    /// Returns a logger that qualifies subsequent attribute keys by `name`.
    ///
    /// An empty name returns the receiver unchanged.
    #[must_use]
    pub fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        Self {
            handler: self.handler.with_group(name),
            exit: Arc::clone(&self.exit),
        }
    }

    // Emission plumbing. Everything public above these helpers is
    // `#[track_caller]` so the captured location is the caller's, not ours.

    #[track_caller]
    fn emit(&self, cx: &Context, level: Level, message: &str, args: &[LogArg]) {
        if !self.handler.enabled(level) {
            return;
        }
        let location = Location::caller();
        let record = Record::at(level, message.to_owned(), location, pair_args(args));
        let _ = self.handler.handle(cx, record);
    }

    #[track_caller]
    fn emitf(&self, cx: &Context, level: Level, args: fmt::Arguments<'_>) {
        // Enabled-check before rendering: a filtered call must not pay for
        // formatting or record construction.
        if !self.handler.enabled(level) {
            return;
        }
        let location = Location::caller();
        let record = Record::at(level, args.to_string(), location, Vec::new());
        let _ = self.handler.handle(cx, record);
    }

    /// Terminal emission: never level-filtered on this side. The handler
    /// may still decline the record; the fault or exit happens regardless.
    #[track_caller]
    fn emit_terminal(&self, cx: &Context, level: Level, message: String, attrs: Vec<Attr>) {
        let location = Location::caller();
        let record = Record::at(level, message, location, attrs);
        let _ = self.handler.handle(cx, record);
    }

    /// Emits a record at an arbitrary level, pairing `args` into attributes.
    #[track_caller]
    pub fn log(&self, cx: &Context, level: Level, message: &str, args: &[LogArg]) {
        self.emit(cx, level, message, args);
    }

    /// Emits a record at an arbitrary level with ready-made attributes.
    #[track_caller]
    pub fn log_attrs(&self, cx: &Context, level: Level, message: &str, attrs: Vec<Attr>) {
        if !self.handler.enabled(level) {
            return;
        }
        let location = Location::caller();
        let record = Record::at(level, message.to_owned(), location, attrs);
        let _ = self.handler.handle(cx, record);
    }

    /// Logs at [`Level::TRACE`].
    #[track_caller]
    pub fn trace(&self, message: &str, args: &[LogArg]) {
        self.emit(&Context::background(), Level::TRACE, message, args);
    }

    /// Logs at [`Level::TRACE`], formatting the message eagerly only when
    /// the level is enabled.
    #[track_caller]
    pub fn tracef(&self, args: fmt::Arguments<'_>) {
        self.emitf(&Context::background(), Level::TRACE, args);
    }

    /// Logs at [`Level::TRACE`] with the given context.
    #[track_caller]
    pub fn trace_context(&self, cx: &Context, message: &str, args: &[LogArg]) {
        self.emit(cx, Level::TRACE, message, args);
    }

    /// Logs at [`Level::DEBUG`].
    #[track_caller]
    pub fn debug(&self, message: &str, args: &[LogArg]) {
        self.emit(&Context::background(), Level::DEBUG, message, args);
    }

    /// Logs at [`Level::DEBUG`], formatting the message eagerly only when
    /// the level is enabled.
    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emitf(&Context::background(), Level::DEBUG, args);
    }

    /// Logs at [`Level::DEBUG`] with the given context.
    #[track_caller]
    pub fn debug_context(&self, cx: &Context, message: &str, args: &[LogArg]) {
        self.emit(cx, Level::DEBUG, message, args);
    }

    /// Logs at [`Level::INFO`].
    #[track_caller]
    pub fn info(&self, message: &str, args: &[LogArg]) {
        self.emit(&Context::background(), Level::INFO, message, args);
    }

    /// Logs at [`Level::INFO`], formatting the message eagerly only when
    /// the level is enabled.
    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.emitf(&Context::background(), Level::INFO, args);
    }

    /// Logs at [`Level::INFO`] with the given context.
    #[track_caller]
    pub fn info_context(&self, cx: &Context, message: &str, args: &[LogArg]) {
        self.emit(cx, Level::INFO, message, args);
    }

    /// Logs at [`Level::NOTICE`].
    #[track_caller]
    pub fn notice(&self, message: &str, args: &[LogArg]) {
        self.emit(&Context::background(), Level::NOTICE, message, args);
    }

    /// Logs at [`Level::NOTICE`], formatting the message eagerly only when
    /// the level is enabled.
    #[track_caller]
    pub fn noticef(&self, args: fmt::Arguments<'_>) {
        self.emitf(&Context::background(), Level::NOTICE, args);
    }

    /// Logs at [`Level::NOTICE`] with the given context.
    #[track_caller]
    pub fn notice_context(&self, cx: &Context, message: &str, args: &[LogArg]) {
        self.emit(cx, Level::NOTICE, message, args);
    }

    /// Logs at [`Level::WARN`].
    #[track_caller]
    pub fn warn(&self, message: &str, args: &[LogArg]) {
        self.emit(&Context::background(), Level::WARN, message, args);
    }

    /// Logs at [`Level::WARN`], formatting the message eagerly only when
    /// the level is enabled.
    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.emitf(&Context::background(), Level::WARN, args);
    }

    /// Logs at [`Level::WARN`] with the given context.
    #[track_caller]
    pub fn warn_context(&self, cx: &Context, message: &str, args: &[LogArg]) {
        self.emit(cx, Level::WARN, message, args);
    }

    /// Logs at [`Level::ERROR`].
    #[track_caller]
    pub fn error(&self, message: &str, args: &[LogArg]) {
        self.emit(&Context::background(), Level::ERROR, message, args);
    }

    /// Logs at [`Level::ERROR`], formatting the message eagerly only when
    /// the level is enabled.
    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emitf(&Context::background(), Level::ERROR, args);
    }

    /// Logs at [`Level::ERROR`] with the given context.
    #[track_caller]
    pub fn error_context(&self, cx: &Context, message: &str, args: &[LogArg]) {
        self.emit(cx, Level::ERROR, message, args);
    }

    /// Logs at [`Level::PANIC`], then raises a runtime fault carrying the
    /// literal message. The record is emitted regardless of the minimum
    /// level; the fault is not interceptable by the logging layer.
    #[track_caller]
    pub fn panic(&self, message: &str, args: &[LogArg]) -> ! {
        self.emit_terminal(
            &Context::background(),
            Level::PANIC,
            message.to_owned(),
            pair_args(args),
        );
        std::panic::panic_any(message.to_owned())
    }

    /// Logs at [`Level::PANIC`], then raises a runtime fault carrying the
    /// formatted message.
    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        let message = args.to_string();
        self.emit_terminal(
            &Context::background(),
            Level::PANIC,
            message.clone(),
            Vec::new(),
        );
        std::panic::panic_any(message)
    }

    /// Logs at [`Level::PANIC`] with the given context, then raises a
    /// runtime fault carrying the literal message.
    #[track_caller]
    pub fn panic_context(&self, cx: &Context, message: &str, args: &[LogArg]) -> ! {
        self.emit_terminal(cx, Level::PANIC, message.to_owned(), pair_args(args));
        std::panic::panic_any(message.to_owned())
    }

    /// Logs at [`Level::FATAL`], then invokes the termination seam with
    /// status 1. With the default seam this does not return.
    #[track_caller]
    pub fn fatal(&self, message: &str, args: &[LogArg]) {
        self.emit_terminal(
            &Context::background(),
            Level::FATAL,
            message.to_owned(),
            pair_args(args),
        );
        (self.exit)(1);
    }

    /// Logs at [`Level::FATAL`] with a formatted message, then invokes the
    /// termination seam with status 1.
    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.emit_terminal(
            &Context::background(),
            Level::FATAL,
            args.to_string(),
            Vec::new(),
        );
        (self.exit)(1);
    }

    /// Logs at [`Level::FATAL`] with the given context, then invokes the
    /// termination seam with status 1.
    #[track_caller]
    pub fn fatal_context(&self, cx: &Context, message: &str, args: &[LogArg]) {
        self.emit_terminal(cx, Level::FATAL, message.to_owned(), pair_args(args));
        (self.exit)(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_util::CapturingHandler;

    #[test]
    fn filtered_levels_never_reach_the_handler() {
        let capture = CapturingHandler::with_min_level(Level::WARN);
        let log = Logger::from_handler(capture.clone());

        log.trace("t", &[]);
        log.debug("d", &[]);
        log.infof(format_args!("{}-{}", "a", "b"));
        log.notice("n", &[]);
        assert!(capture.is_empty());

        log.warn("w", &[]);
        log.error("e", &[]);
        assert_eq!(capture.len(), 2);
    }

    #[test]
    fn with_adds_persistent_attributes() {
        let capture = CapturingHandler::new();
        let log = Logger::from_handler(capture.clone());

        log.info("bare", &[]);
        log.with(&["key".into(), "value".into()]).info("derived", &[]);

        let records = capture.records();
        assert!(records[0].attrs.is_empty());
        assert_eq!(records[1].attrs.len(), 1);
        assert_eq!(records[1].attrs[0].key, "key");
    }

    #[test]
    fn with_group_empty_name_is_identity() {
        let log = Logger::new();
        let same = log.with_group("");
        assert!(Arc::ptr_eq(log.handler(), same.handler()));
    }

    #[test]
    fn derivation_does_not_mutate_the_parent() {
        let capture = CapturingHandler::new();
        let log = Logger::from_handler(capture.clone());
        let _derived = log.with(&["k".into(), "v".into()]);

        log.info("parent", &[]);
        assert!(capture.records()[0].attrs.is_empty());
    }

    #[test]
    fn caller_location_is_the_call_site() {
        let capture = CapturingHandler::new();
        let log = Logger::from_handler(capture.clone());
        log.info("here", &[]);

        let records = capture.records();
        assert!(records[0].file.ends_with("facade.rs"));
        assert!(records[0].line > 0);
    }

    #[test]
    fn named_logger_carries_name_attribute() {
        let capture = CapturingHandler::new();
        let log = Logger::from_handler(capture.clone()).with(&["name".into(), "svc".into()]);
        log.info("x", &[]);
        assert_eq!(capture.records()[0].attrs[0].key, "name");
    }
}
