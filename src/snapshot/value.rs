//! Decoded snapshot value model.
//!
//! Every piece of data a producer sees flows through [`Value`]. Byte/text
//! normalization and integer plausibility checks live here, at one
//! boundary, so producers never deal with raw image encoding themselves.

use indexmap::IndexMap;

use crate::snapshot::SnapshotError;

/// A value resolved from the snapshot symbol table.
///
/// Records preserve field order so that iteration over them is
/// deterministic run to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Text(String),
    List(Vec<Value>),
    Record(IndexMap<String, Value>),
}

impl Value {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Access a named field of a record value.
    pub fn field(&self, name: &str) -> Result<&Value, SnapshotError> {
        match self {
            Value::Record(fields) => {
                fields
                    .get(name)
                    .ok_or_else(|| SnapshotError::MissingMember {
                        context: "record".to_string(),
                        member: name.to_string(),
                    })
            }
            other => Err(SnapshotError::TypeMismatch {
                expected: "record",
                actual: other.type_name(),
            }),
        }
    }

    /// Coerce to an integer, rejecting non-integer shapes.
    pub fn as_integer(&self) -> Result<i64, SnapshotError> {
        match self {
            Value::Integer(n) => Ok(*n),
            other => Err(SnapshotError::TypeMismatch {
                expected: "integer",
                actual: other.type_name(),
            }),
        }
    }

    /// Coerce to an integer and reject values outside `min..=max`.
    ///
    /// Out-of-range values are an error, never truncated or wrapped:
    /// snapshot images for other kernel versions can carry pointers or
    /// sentinel values where a count is expected.
    pub fn as_integer_in(&self, min: i64, max: i64) -> Result<i64, SnapshotError> {
        let n = self.as_integer()?;
        if n < min || n > max {
            return Err(SnapshotError::InvalidCoercion { value: n, min, max });
        }
        Ok(n)
    }

    /// Canonical text coercion. Integers render in decimal; lists and
    /// records are not text.
    pub fn as_text(&self) -> Result<String, SnapshotError> {
        match self {
            Value::Text(s) => Ok(s.clone()),
            Value::Integer(n) => Ok(n.to_string()),
            other => Err(SnapshotError::TypeMismatch {
                expected: "text",
                actual: other.type_name(),
            }),
        }
    }

    /// Access list items.
    pub fn items(&self) -> Result<&[Value], SnapshotError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(SnapshotError::TypeMismatch {
                expected: "list",
                actual: other.type_name(),
            }),
        }
    }

    /// Decode from a JSON snapshot image value.
    ///
    /// Floats, booleans, and nulls have no place in the image format and
    /// are rejected; integers must fit in `i64`.
    pub fn from_json(json: &serde_json::Value) -> Result<Value, SnapshotError> {
        match json {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Integer)
                .ok_or_else(|| SnapshotError::Backend(format!("non-integer number {n} in image"))),
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(Value::from_json(item)?);
                }
                Ok(Value::List(out))
            }
            serde_json::Value::Object(fields) => {
                let mut out = IndexMap::with_capacity(fields.len());
                for (k, v) in fields {
                    out.insert(k.clone(), Value::from_json(v)?);
                }
                Ok(Value::Record(out))
            }
            other => Err(SnapshotError::Backend(format!(
                "unsupported value {other} in image"
            ))),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_on_record() {
        let v = Value::from_json(&serde_json::json!({"pid": 42})).unwrap();
        assert_eq!(v.field("pid").unwrap().as_integer().unwrap(), 42);
    }

    #[test]
    fn field_missing_member() {
        let v = Value::from_json(&serde_json::json!({"pid": 42})).unwrap();
        assert!(matches!(
            v.field("comm"),
            Err(SnapshotError::MissingMember { .. })
        ));
    }

    #[test]
    fn field_on_non_record_is_type_mismatch() {
        let v = Value::Integer(1);
        assert!(matches!(
            v.field("pid"),
            Err(SnapshotError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn integer_range_rejects_out_of_bounds() {
        let v = Value::Integer(5_000_000_000);
        assert!(matches!(
            v.as_integer_in(0, 1_000_000),
            Err(SnapshotError::InvalidCoercion { .. })
        ));
        assert_eq!(Value::Integer(7).as_integer_in(0, 1_000_000).unwrap(), 7);
    }

    #[test]
    fn text_coercion_covers_integers() {
        assert_eq!(Value::Integer(3).as_text().unwrap(), "3");
        assert_eq!(Value::Text("x".into()).as_text().unwrap(), "x");
        assert!(Value::List(vec![]).as_text().is_err());
    }

    #[test]
    fn from_json_rejects_floats_and_bools() {
        assert!(Value::from_json(&serde_json::json!(1.5)).is_err());
        assert!(Value::from_json(&serde_json::json!(true)).is_err());
        assert!(Value::from_json(&serde_json::json!(null)).is_err());
    }

    #[test]
    fn record_preserves_field_order() {
        let v = Value::from_json(&serde_json::json!({"b": 1, "a": 2, "c": 3})).unwrap();
        let Value::Record(fields) = v else {
            panic!("expected record")
        };
        let keys: Vec<_> = fields.keys().cloned().collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }
}
