//! Colorized human-readable handler.

use std::{
    fmt::Write as _,
    io::Write,
    sync::{Arc, Mutex, PoisonError},
};

use colored::Colorize;
use serde_json::Value;
use time::macros::format_description;

use crate::{
    context::Context,
    handler::{AttrChain, EmitError, Handler},
    level::Level,
    record::{Attr, Record},
};

struct Shared {
    writer: Mutex<Box<dyn Write + Send>>,
    min_level: Level,
}

/// Writes one human-readable line per record, with the level tag rendered
/// in its display color.
///
/// Attribute keys are qualified by their groups with dots. Like the JSON
/// handler, each record goes out in a single `write_all`.
#[derive(Clone)]
pub struct TextHandler {
    shared: Arc<Shared>,
    chain: AttrChain,
}

impl std::fmt::Debug for TextHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextHandler")
            .field("min_level", &self.shared.min_level)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl TextHandler {
    /// A handler writing to the error stream with the given minimum level.
    pub fn stderr(min_level: Level) -> Self {
        Self::new(min_level, std::io::stderr())
    }

    /// A handler writing to an arbitrary sink, mainly for tests.
    pub fn new(min_level: Level, writer: impl Write + Send + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                writer: Mutex::new(Box::new(writer)),
                min_level,
            }),
            chain: AttrChain::default(),
        }
    }

    fn render(&self, record: &Record) -> String {
        let mut line = String::new();

        // Kitchen clock, e.g. "3:04PM".
        let clock = format_description!("[hour padding:none repr:12]:[minute][period]");
        if let Ok(time) = record.time.format(&clock) {
            let _ = write!(line, "{time} ");
        }

        let tag = record.level.as_str().color(record.level.color()).bold();
        let _ = write!(
            line,
            "{tag} {}:{} {}",
            record.file, record.line, record.message
        );

        for (key, value) in self.chain.flatten(&record.attrs) {
            let _ = write!(line, " {key}={}", display_value(&value));
        }
        line.push('\n');
        line
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl Handler for TextHandler {
    fn enabled(&self, level: Level) -> bool {
        level >= self.shared.min_level
    }

    fn handle(&self, _cx: &Context, record: Record) -> Result<(), EmitError> {
        let line = self.render(&record);
        let mut writer = self
            .shared
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(Self {
            shared: Arc::clone(&self.shared),
            chain: self.chain.with_attrs(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        if name.is_empty() {
            return Arc::new(self.clone());
        }
        Arc::new(Self {
            shared: Arc::clone(&self.shared),
            chain: self.chain.with_group(name),
        })
    }
}
