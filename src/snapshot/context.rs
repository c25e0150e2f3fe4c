//! Read-only accessor over a static memory-snapshot image.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::snapshot::{SnapshotError, Value};

/// Read-only symbol resolution over a loaded snapshot.
///
/// Implementations must be deterministic: the same symbol query against
/// the same snapshot state returns the same value for the whole run.
pub trait Snapshot {
    /// Resolve a named symbol from the snapshot.
    fn lookup(&self, symbol: &str) -> Result<&Value, SnapshotError>;

    /// Whether a symbol resolves at all. Used by group gates.
    fn has_symbol(&self, symbol: &str) -> bool {
        self.lookup(symbol).is_ok()
    }

    /// Resolve a symbol and coerce it to text in one step.
    fn lookup_text(&self, symbol: &str) -> Result<String, SnapshotError> {
        self.lookup(symbol)?.as_text()
    }

    /// Resolve a symbol and coerce it to an integer in `min..=max`.
    fn lookup_integer_in(&self, symbol: &str, min: i64, max: i64) -> Result<i64, SnapshotError> {
        self.lookup(symbol)?.as_integer_in(min, max)
    }
}

/// Snapshot backed by a JSON image file: one top-level object mapping
/// symbol names to values.
#[derive(Debug)]
pub struct JsonSnapshot {
    symbols: IndexMap<String, Value>,
}

impl JsonSnapshot {
    /// Load a snapshot image from a JSON file.
    ///
    /// Any failure here (missing file, bad JSON, non-object root,
    /// unsupported value shapes) means the backend is unavailable and
    /// the run cannot start.
    pub fn open(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| SnapshotError::Backend(format!("cannot read {}: {e}", path.display())))?;
        let json: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| SnapshotError::Backend(format!("cannot parse {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Build a snapshot from an already-parsed JSON image.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, SnapshotError> {
        let serde_json::Value::Object(fields) = json else {
            return Err(SnapshotError::Backend(
                "image root must be an object".to_string(),
            ));
        };
        let mut symbols = IndexMap::with_capacity(fields.len());
        for (name, value) in fields {
            symbols.insert(name.clone(), Value::from_json(value)?);
        }
        Ok(Self { symbols })
    }

    /// Number of symbols in the image.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Snapshot for JsonSnapshot {
    fn lookup(&self, symbol: &str) -> Result<&Value, SnapshotError> {
        self.symbols
            .get(symbol)
            .ok_or_else(|| SnapshotError::SymbolNotFound(symbol.to_string()))
    }
}
