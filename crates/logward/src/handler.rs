//! The handler capability consumed by the facade, and handler selection.

use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::{
    context::Context,
    handlers::{json::JsonHandler, otel::OtelHandler, text::TextHandler},
    level::Level,
    options::{LogFormat, Options},
    record::{Attr, Record},
};

/// Failure while encoding or writing a record.
///
/// Handlers surface this; the facade swallows it. Logging is best-effort
/// and must never propagate a failure into caller business logic.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// The record could not be serialized.
    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
    /// The record could not be written to the output stream.
    #[error("failed to write log record: {0}")]
    Io(#[from] std::io::Error),
}

/// A pluggable log output.
///
/// The facade holds a `dyn Handler` and never inspects its internals: all
/// record formatting, attribute encoding and I/O belong to the handler.
/// Handlers own their own write serialization; the facade adds no locking,
/// so a single handler shared by concurrent loggers must serialize writes
/// itself (the built-in handlers do, through an internal mutex).
pub trait Handler: Send + Sync + fmt::Debug {
    /// Reports whether records at `level` should be emitted.
    fn enabled(&self, level: Level) -> bool;

    /// Formats and writes one record.
    fn handle(&self, cx: &Context, record: Record) -> Result<(), EmitError>;

    /// Returns a handler whose records carry `attrs` persistently.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// Returns a handler that nests subsequent attribute keys under `name`.
    ///
    /// An empty name is the identity.
    fn with_group(&self, name: &str) -> Arc<dyn Handler>;
}

/// Picks the handler for a merged set of options.
///
/// An explicitly supplied handler wins outright; its behavior is owned by
/// the caller, so the level/format fields are ignored for it. Otherwise a
/// base handler is built from the resolved format and minimum level, and
/// wrapped in the OpenTelemetry decorator when correlation is enabled.
pub(crate) fn select_handler(options: &Options) -> Arc<dyn Handler> {
    let mut merged = options.merge_with_env();
    if let Some(handler) = merged.handler.take() {
        return handler;
    }

    let level = Level::from_name(merged.level.as_deref().unwrap_or_default());
    let base: Arc<dyn Handler> = match merged.resolved_format() {
        LogFormat::Text => Arc::new(TextHandler::stderr(level)),
        LogFormat::Json => Arc::new(JsonHandler::stderr(level)),
    };

    if merged.open_telemetry {
        Arc::new(OtelHandler::new(base))
    } else {
        base
    }
}

/// Persistent attribute/group lineage accumulated through `with_attrs` and
/// `with_group` derivations.
///
/// Attributes recorded after a group are qualified by that group; handlers
/// decide the concrete qualification (nested objects for JSON, dotted keys
/// for text). Call-site attributes always land in the innermost group.
#[derive(Clone, Debug, Default)]
pub(crate) struct AttrChain {
    segments: Vec<Segment>,
}

#[derive(Clone, Debug)]
enum Segment {
    Group(String),
    Attrs(Vec<Attr>),
}

impl AttrChain {
    pub(crate) fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        let mut chain = self.clone();
        if !attrs.is_empty() {
            chain.segments.push(Segment::Attrs(attrs));
        }
        chain
    }

    pub(crate) fn with_group(&self, name: &str) -> Self {
        let mut chain = self.clone();
        chain.segments.push(Segment::Group(name.to_owned()));
        chain
    }

    /// Folds the lineage plus call-site attributes into a JSON object with
    /// groups as nested objects.
    pub(crate) fn to_object(&self, call_attrs: &[Attr]) -> serde_json::Map<String, Value> {
        Self::fold(&self.segments, call_attrs)
    }

    fn fold(segments: &[Segment], call_attrs: &[Attr]) -> serde_json::Map<String, Value> {
        let mut object = serde_json::Map::new();
        for (position, segment) in segments.iter().enumerate() {
            match segment {
                Segment::Attrs(attrs) => {
                    for attr in attrs {
                        object.insert(attr.key.clone(), attr.value.clone());
                    }
                }
                Segment::Group(name) => {
                    let rest = segments.get(position + 1..).unwrap_or_default();
                    let inner = Self::fold(rest, call_attrs);
                    if !inner.is_empty() {
                        object.insert(name.clone(), Value::Object(inner));
                    }
                    return object;
                }
            }
        }
        for attr in call_attrs {
            object.insert(attr.key.clone(), attr.value.clone());
        }
        object
    }

    /// Flattens the lineage plus call-site attributes into dotted keys.
    pub(crate) fn flatten(&self, call_attrs: &[Attr]) -> Vec<(String, Value)> {
        let mut prefix = String::new();
        let mut flat = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Group(name) => {
                    prefix.push_str(name);
                    prefix.push('.');
                }
                Segment::Attrs(attrs) => {
                    for attr in attrs {
                        flat.push((format!("{prefix}{}", attr.key), attr.value.clone()));
                    }
                }
            }
        }
        for attr in call_attrs {
            flat.push((format!("{prefix}{}", attr.key), attr.value.clone()));
        }
        flat
    }
}
