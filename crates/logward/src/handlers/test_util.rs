//! Test doubles: a capturing handler and a shareable output buffer.
//!
//! Not gated behind `cfg(test)` so integration tests and downstream crates
//! can drive a logger against a stub without touching real output streams.

use std::{
    io::Write,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    context::Context,
    handler::{AttrChain, EmitError, Handler},
    level::Level,
    record::{Attr, Record},
};

#[derive(Debug)]
struct Captured {
    min_level: Option<Level>,
    records: Mutex<Vec<Record>>,
}

/// A handler that stores every record it is handed.
///
/// Persistent attributes and groups from `with_attrs`/`with_group` are
/// merged into each stored record's attribute list (dotted group keys), so
/// assertions can look at one flat list.
#[derive(Clone, Debug)]
pub struct CapturingHandler {
    captured: Arc<Captured>,
    chain: AttrChain,
}

impl CapturingHandler {
    /// A capturing handler that accepts every level.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            captured: Arc::new(Captured {
                min_level: None,
                records: Mutex::default(),
            }),
            chain: AttrChain::default(),
        })
    }

    /// A capturing handler that filters below `min_level`.
    pub fn with_min_level(min_level: Level) -> Arc<Self> {
        Arc::new(Self {
            captured: Arc::new(Captured {
                min_level: Some(min_level),
                records: Mutex::default(),
            }),
            chain: AttrChain::default(),
        })
    }

    /// Same as [`CapturingHandler::new`], pre-erased to `Arc<dyn Handler>`.
    pub fn shared() -> Arc<dyn Handler> {
        Self::new()
    }

    /// Snapshot of the records captured so far, in emission order.
    pub fn records(&self) -> Vec<Record> {
        self.captured
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records captured so far.
    pub fn len(&self) -> usize {
        self.captured
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Handler for CapturingHandler {
    fn enabled(&self, level: Level) -> bool {
        match self.captured.min_level {
            Some(min_level) => level >= min_level,
            None => true,
        }
    }

    fn handle(&self, _cx: &Context, record: Record) -> Result<(), EmitError> {
        let merged = self
            .chain
            .flatten(&record.attrs)
            .into_iter()
            .map(|(key, value)| Attr::new(key, value))
            .collect();
        let record = Record { attrs: merged, ..record };
        self.captured
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(Self {
            captured: Arc::clone(&self.captured),
            chain: self.chain.with_attrs(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        if name.is_empty() {
            return Arc::new(self.clone());
        }
        Arc::new(Self {
            captured: Arc::clone(&self.captured),
            chain: self.chain.with_group(name),
        })
    }
}

/// An in-memory `Write` target that clones share, for asserting on raw
/// handler output.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
