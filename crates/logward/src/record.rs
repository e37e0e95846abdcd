//! Log records and the untyped attribute arguments accepted by the facade.

use std::panic::Location;

use serde_json::Value;
use time::OffsetDateTime;

use crate::level::Level;

/// Sentinel key substituted for a malformed trailing argument.
///
/// A dangling key with no following value, or a bare non-string value, is
/// encoded under this key rather than rejected. Compatibility behavior;
/// logging never errors on bad input.
pub const BAD_KEY: &str = "!BADKEY";

/// A key/value attribute attached to a record or a logger.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    /// Attribute key.
    pub key: String,
    /// Attribute value.
    pub value: Value,
}

impl Attr {
    /// Builds an attribute from anything JSON-representable.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One cell of a trailing argument list.
///
/// Argument lists are interpreted as alternating key/value pairs, with a
/// pre-built [`Attr`] passing through unchanged. See [`pair_args`] for the
/// exact pairing rules.
#[derive(Clone, Debug)]
pub enum LogArg {
    /// A ready-made attribute, used as is.
    Attr(Attr),
    /// A bare value; a string in key position names the value that follows.
    Value(Value),
}

impl LogArg {
    fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Attr(attr) => {
                let mut object = serde_json::Map::with_capacity(1);
                object.insert(attr.key, attr.value);
                Value::Object(object)
            }
        }
    }
}

impl From<Attr> for LogArg {
    fn from(attr: Attr) -> Self {
        Self::Attr(attr)
    }
}

impl From<Value> for LogArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for LogArg {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for LogArg {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for LogArg {
    fn from(value: bool) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i32> for LogArg {
    fn from(value: i32) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for LogArg {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<u64> for LogArg {
    fn from(value: u64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<f64> for LogArg {
    fn from(value: f64) -> Self {
        Self::Value(Value::from(value))
    }
}

/// Pairs a trailing argument list into attributes.
///
/// Rules, in order:
/// - an [`Attr`] is used as is;
/// - a string that is not the last argument becomes the key for the
///   argument that follows (a following `Attr` collapses into a one-entry
///   object value);
/// - anything else, including a dangling final string, becomes a
///   [`BAD_KEY`] attribute carrying the stray value.
pub fn pair_args(args: &[LogArg]) -> Vec<Attr> {
    let mut attrs = Vec::with_capacity(args.len() / 2 + 1);
    let mut iter = args.iter().cloned();
    while let Some(arg) = iter.next() {
        match arg {
            LogArg::Attr(attr) => attrs.push(attr),
            LogArg::Value(Value::String(key)) => match iter.next() {
                Some(next) => attrs.push(Attr::new(key, next.into_value())),
                None => attrs.push(Attr::new(BAD_KEY, key)),
            },
            LogArg::Value(value) => attrs.push(Attr::new(BAD_KEY, value)),
        }
    }
    attrs
}

/// A single log record handed to a [`Handler`](crate::Handler).
///
/// The file/line pair points at the public call site that produced the
/// record, not at any forwarding helper inside this crate.
#[derive(Clone, Debug)]
pub struct Record {
    /// Wall-clock time the record was produced.
    pub time: OffsetDateTime,
    /// Severity of the record.
    pub level: Level,
    /// The log message.
    pub message: String,
    /// Source file of the call site.
    pub file: &'static str,
    /// Source line of the call site.
    pub line: u32,
    /// Call-site attributes, already paired.
    pub attrs: Vec<Attr>,
}

impl Record {
    pub(crate) fn at(
        level: Level,
        message: String,
        location: &'static Location<'static>,
        attrs: Vec<Attr>,
    ) -> Self {
        Self::with_source(level, message, location.file(), location.line(), attrs)
    }

    pub(crate) fn with_source(
        level: Level,
        message: String,
        file: &'static str,
        line: u32,
        attrs: Vec<Attr>,
    ) -> Self {
        Self {
            time: OffsetDateTime::now_utc(),
            level,
            message,
            file,
            line,
            attrs,
        }
    }
}
