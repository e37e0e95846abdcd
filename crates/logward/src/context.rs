//! Propagating a logger through request-scoped contexts.

use std::{
    sync::Arc,
    task::{self, Poll},
};

use tokio_util::sync::CancellationToken;
use tower::{Layer, Service};

use crate::facade::Logger;

#[derive(Debug)]
struct Inner {
    logger: Option<Logger>,
    cancellation: Option<CancellationToken>,
}

/// A request-scoped value chain carrying at most one logger association.
///
/// Contexts are immutable: deriving a child never mutates the parent, and
/// cloning shares the underlying association. Lookup is total — a context
/// with no association hands out a freshly constructed default logger.
#[derive(Clone, Debug, Default)]
pub struct Context {
    inner: Option<Arc<Inner>>,
}

impl Context {
    /// The empty root context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a derived context associated with `logger`.
    ///
    /// Any cancellation carried by the receiver is inherited; the
    /// receiver's own association, if present, is shadowed, not replaced.
    #[must_use]
    pub fn with_logger(&self, logger: Logger) -> Self {
        Self {
            inner: Some(Arc::new(Inner {
                logger: Some(logger),
                cancellation: self.cancellation().cloned(),
            })),
        }
    }

    /// The associated logger, or a default-configuration logger when the
    /// context carries none. Never fails.
    pub fn logger(&self) -> Logger {
        self.inner
            .as_ref()
            .and_then(|inner| inner.logger.clone())
            .unwrap_or_default()
    }

    /// Derives a cancellable child context inheriting this context's
    /// logger (or a default when none is associated).
    ///
    /// The returned token is the explicit cancel handle. There is no
    /// background work to stop; cancelling exists purely for context-tree
    /// hygiene, and dropping the token uncancelled leaks nothing.
    pub fn with_cancellation(&self) -> (Self, CancellationToken) {
        let token = match self.cancellation() {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let child = Self {
            inner: Some(Arc::new(Inner {
                logger: Some(self.logger()),
                cancellation: Some(token.clone()),
            })),
        };
        (child, token)
    }

    /// The cancellation token of this context, if it is cancellable.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.inner
            .as_ref()
            .and_then(|inner| inner.cancellation.as_ref())
    }

    /// Whether this context (or an ancestor it inherited from) was
    /// cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation()
            .map(CancellationToken::is_cancelled)
            .unwrap_or(false)
    }
}

/// Retrieves the logger of an optional context, or a default logger when
/// the context is absent or carries no association.
pub fn from_context(cx: Option<&Context>) -> Logger {
    cx.map(Context::logger).unwrap_or_default()
}

/// Retrieves the logger a [`LoggerLayer`] attached to a request, or a
/// default logger when the middleware did not run.
pub fn logger_from_extensions(extensions: &http::Extensions) -> Logger {
    extensions.get::<Logger>().cloned().unwrap_or_default()
}

/// Tower layer that injects a captured logger into every inbound request.
///
/// The logger is captured once, from the context given at construction
/// time; each request then finds it in its own extensions via
/// [`logger_from_extensions`].
#[derive(Clone, Debug)]
pub struct LoggerLayer {
    logger: Logger,
}

impl LoggerLayer {
    /// Captures the logger associated with `cx`.
    pub fn new(cx: &Context) -> Self {
        Self { logger: cx.logger() }
    }

    /// Uses `logger` directly, without going through a context.
    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for LoggerLayer {
    type Service = LoggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggerService {
            inner,
            logger: self.logger.clone(),
        }
    }
}

/// The service produced by [`LoggerLayer`].
#[derive(Clone, Debug)]
pub struct LoggerService<S> {
    inner: S,
    logger: Logger,
}

impl<S, B> Service<http::Request<B>> for LoggerService<S>
where
    S: Service<http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: http::Request<B>) -> Self::Future {
        request.extensions_mut().insert(self.logger.clone());
        self.inner.call(request)
    }
}
