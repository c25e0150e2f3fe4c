//! Enumeration keys and path templates.
//!
//! A templated producer declares a path like `proc/{pid}/status`; its
//! enumerator yields one [`EnumerationKey`] per concrete instance. The
//! template's placeholder names are parsed once at registration so that
//! mismatches against the enumerator's declared keys fail at startup,
//! not mid-run.

use indexmap::IndexMap;

/// One placeholder binding value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValue {
    Int(i64),
    Text(String),
}

impl KeyValue {
    fn render(&self) -> String {
        match self {
            KeyValue::Int(n) => n.to_string(),
            KeyValue::Text(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Ordered mapping of placeholder name to value, produced by an
/// enumerator. Order matters only for diagnostics; lookups are by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerationKey {
    bindings: IndexMap<String, KeyValue>,
}

impl EnumerationKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-binding integer key, the common case (`{pid: 42}`).
    pub fn int(name: &str, value: i64) -> Self {
        let mut key = Self::new();
        key.bindings.insert(name.to_string(), KeyValue::Int(value));
        key
    }

    pub fn with_text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.bindings
            .insert(name.to_string(), KeyValue::Text(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&KeyValue> {
        self.bindings.get(name)
    }

    /// Integer binding for a placeholder, if present and numeric.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.bindings.get(name) {
            Some(KeyValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl std::fmt::Display for EnumerationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        write!(f, "{{")?;
        for (name, value) in &self.bindings {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

/// Error parsing a path template at registration time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unbalanced braces in path template '{0}'")]
    UnbalancedBraces(String),

    #[error("empty placeholder in path template '{0}'")]
    EmptyPlaceholder(String),

    #[error("duplicate placeholder '{name}' in path template '{template}'")]
    DuplicatePlaceholder { template: String, name: String },
}

/// A declared artifact path: fixed, or parameterized with `{name}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    placeholders: Vec<String>,
}

impl PathTemplate {
    /// Parse a template, extracting placeholder names.
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let mut placeholders = Vec::new();
        let mut rest = raw;
        loop {
            match (rest.find('{'), rest.find('}')) {
                (None, None) => break,
                (Some(open), Some(close)) if open < close => {
                    let name = &rest[open + 1..close];
                    if name.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder(raw.to_string()));
                    }
                    if name.contains('{') {
                        return Err(TemplateError::UnbalancedBraces(raw.to_string()));
                    }
                    if placeholders.iter().any(|p| p == name) {
                        return Err(TemplateError::DuplicatePlaceholder {
                            template: raw.to_string(),
                            name: name.to_string(),
                        });
                    }
                    placeholders.push(name.to_string());
                    rest = &rest[close + 1..];
                }
                _ => return Err(TemplateError::UnbalancedBraces(raw.to_string())),
            }
        }
        Ok(Self {
            raw: raw.to_string(),
            placeholders,
        })
    }

    /// The template text as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in left-to-right order.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    pub fn is_fixed(&self) -> bool {
        self.placeholders.is_empty()
    }

    /// Render the concrete path for one enumeration key.
    ///
    /// Registration guarantees the key covers every placeholder; a
    /// binding missing at run time (a buggy enumerator) degrades to a
    /// brace-stripped path so the artifact still lands somewhere valid.
    pub fn render(&self, key: &EnumerationKey) -> String {
        let mut path = self.raw.clone();
        for name in &self.placeholders {
            let pattern = format!("{{{name}}}");
            match key.get(name) {
                Some(value) => path = path.replace(&pattern, &value.to_string()),
                None => path = path.replace(&pattern, &format!("_{name}_")),
            }
        }
        path
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}
