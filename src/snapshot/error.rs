//! Error type for snapshot symbol resolution and value decoding.

/// Error raised by snapshot lookups and value coercions.
///
/// The first three variants are the contained failure kinds: the
/// execution engine converts them into stub artifacts and they never
/// escape a task boundary. `Backend` is fatal and aborts the run before
/// any producer work starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Symbol absent from the snapshot image.
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    /// Record field absent from a resolved value.
    #[error("missing member '{member}' on {context}")]
    MissingMember { context: String, member: String },

    /// Decoded value has an unexpected shape.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Numeric value outside the plausible range for its use.
    #[error("invalid coercion: value {value} outside {min}..={max}")]
    InvalidCoercion { value: i64, min: i64, max: i64 },

    /// Snapshot image cannot be opened or decoded at all.
    #[error("snapshot backend unavailable: {0}")]
    Backend(String),
}
