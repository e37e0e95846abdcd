//! Structured JSON handler.

use std::{
    io::Write,
    sync::{Arc, Mutex, PoisonError},
};

use once_cell::sync::Lazy;
use serde::ser::{SerializeMap, Serializer};
use time::format_description::well_known::Iso8601;

use crate::{
    context::Context,
    handler::{AttrChain, EmitError, Handler},
    level::Level,
    record::{Attr, Record},
};

// Implicit keys, written for every record.

const TIME: &str = "time";
const LEVEL: &str = "level";
const MESSAGE: &str = "message";
const HOSTNAME: &str = "hostname";
const PID: &str = "pid";
const FILE: &str = "file";
const LINE: &str = "line";

/// Keys reserved for the handler itself. A user attribute colliding with
/// one of these is skipped rather than allowed to clobber the record shape.
static IMPLICIT_KEYS: Lazy<rustc_hash::FxHashSet<&str>> = Lazy::new(|| {
    let mut set = rustc_hash::FxHashSet::default();

    set.insert(TIME);
    set.insert(LEVEL);
    set.insert(MESSAGE);
    set.insert(HOSTNAME);
    set.insert(PID);
    set.insert(FILE);
    set.insert(LINE);

    set
});

struct Shared {
    writer: Mutex<Box<dyn Write + Send>>,
    min_level: Level,
    hostname: String,
    pid: u32,
}

/// Writes one JSON object per record, newline-delimited.
///
/// The level field is rendered as its display name rather than a raw
/// numeric offset. Each record is flushed with a single `write_all` so
/// concurrent writers cannot interleave fragments of a line.
#[derive(Clone)]
pub struct JsonHandler {
    shared: Arc<Shared>,
    chain: AttrChain,
}

impl std::fmt::Debug for JsonHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonHandler")
            .field("min_level", &self.shared.min_level)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl JsonHandler {
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
                hostname: gethostname::gethostname().to_string_lossy().into_owned(),
                pid: std::process::id(),
            }),
            chain: AttrChain::default(),
        }
    }

    fn serialize(&self, record: &Record) -> Result<Vec<u8>, EmitError> {
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::new(&mut buffer);
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry(MESSAGE, &record.message)?;
        map.serialize_entry(HOSTNAME, &self.shared.hostname)?;
        map.serialize_entry(PID, &self.shared.pid)?;
        map.serialize_entry(LEVEL, record.level.as_str())?;
        map.serialize_entry(FILE, record.file)?;
        map.serialize_entry(LINE, &record.line)?;
        if let Ok(time) = record.time.format(&Iso8601::DEFAULT) {
            map.serialize_entry(TIME, &time)?;
        }

        for (key, value) in self.chain.to_object(&record.attrs) {
            if !IMPLICIT_KEYS.contains(key.as_str()) {
                map.serialize_entry(&key, &value)?;
            }
        }

        map.end()?;
        Ok(buffer)
    }

    /// Single-write flush; avoids fragmented lines under concurrency.
    fn flush(&self, mut buffer: Vec<u8>) -> Result<(), EmitError> {
        buffer.push(b'\n');
        let mut writer = self
            .shared
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&buffer)?;
        Ok(())
    }
}

impl Handler for JsonHandler {
    fn enabled(&self, level: Level) -> bool {
        level >= self.shared.min_level
    }

    fn handle(&self, _cx: &Context, record: Record) -> Result<(), EmitError> {
        let buffer = self.serialize(&record)?;
        self.flush(buffer)
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
