//! In-memory snapshot for tests and examples.

use indexmap::IndexMap;

use crate::snapshot::{Snapshot, SnapshotError, Value};

/// Builder-style snapshot used by unit and integration tests.
///
/// ```
/// use vmrecon::snapshot::{MockSnapshot, Snapshot};
///
/// let snap = MockSnapshot::new()
///     .with("saved_command_line", "ro quiet")
///     .with("nr_cpu_ids", 2);
/// assert!(snap.has_symbol("nr_cpu_ids"));
/// ```
#[derive(Debug, Default)]
pub struct MockSnapshot {
    symbols: IndexMap<String, Value>,
}

impl MockSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol, replacing any previous value.
    pub fn with(mut self, symbol: &str, value: impl Into<Value>) -> Self {
        self.symbols.insert(symbol.to_string(), value.into());
        self
    }

    /// Insert a symbol from a JSON literal; panics on unsupported shapes
    /// (tests only).
    pub fn with_json(mut self, symbol: &str, json: serde_json::Value) -> Self {
        let value = Value::from_json(&json).expect("mock symbol value");
        self.symbols.insert(symbol.to_string(), value);
        self
    }

    /// Remove a symbol, simulating a snapshot that cannot resolve it.
    pub fn without(mut self, symbol: &str) -> Self {
        self.symbols.shift_remove(symbol);
        self
    }
}

impl Snapshot for MockSnapshot {
    fn lookup(&self, symbol: &str) -> Result<&Value, SnapshotError> {
        self.symbols
            .get(symbol)
            .ok_or_else(|| SnapshotError::SymbolNotFound(symbol.to_string()))
    }
}
