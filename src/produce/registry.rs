//! Static producer catalog.
//!
//! Producers are registered once during a bounded startup phase
//! (`producers::install` collects each module's `register` calls) and
//! never mutated afterwards. All configuration mistakes a registration
//! can carry (duplicate fixed paths, template placeholders that do not
//! match the enumerator's declared keys) fail here, before any
//! snapshot work begins.

use crate::produce::enumerate::EnumeratorId;
use crate::produce::key::{EnumerationKey, PathTemplate, TemplateError};
use crate::snapshot::{Snapshot, SnapshotError};

/// Producer callable for a fixed-path artifact.
pub type FixedFn = fn(&dyn Snapshot) -> Result<String, SnapshotError>;

/// Producer callable for a templated artifact, invoked once per
/// enumeration key.
pub type TemplatedFn = fn(&dyn Snapshot, &EnumerationKey) -> Result<String, SnapshotError>;

/// Named partition of the producer namespace, run as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Proc,
    Sys,
    Commands,
    KernelInfo,
    Sched,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Proc => "proc",
            Scope::Sys => "sys",
            Scope::Commands => "commands",
            Scope::KernelInfo => "kernel-info",
            Scope::Sched => "sched",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

enum ProducerFn {
    Fixed(FixedFn),
    Templated(TemplatedFn),
}

impl std::fmt::Debug for ProducerFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProducerFn::Fixed(_) => f.write_str("Fixed(..)"),
            ProducerFn::Templated(_) => f.write_str("Templated(..)"),
        }
    }
}

/// One registered producer: a declared path (fixed or templated), the
/// callable, and for templated paths the enumerator that expands it.
/// Immutable after registration.
#[derive(Debug)]
pub struct ProducerSpec {
    scope: Scope,
    template: PathTemplate,
    producer: ProducerFn,
    enumerator: Option<EnumeratorId>,
}

impl ProducerSpec {
    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn enumerator(&self) -> Option<EnumeratorId> {
        self.enumerator
    }

    /// Invoke the producer for one concrete task.
    pub(crate) fn produce(
        &self,
        snap: &dyn Snapshot,
        key: &EnumerationKey,
    ) -> Result<String, SnapshotError> {
        match &self.producer {
            ProducerFn::Fixed(f) => f(snap),
            ProducerFn::Templated(f) => f(snap, key),
        }
    }
}

/// Registration-time configuration error. Fatal before any run starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate declared path '{path}' in scope {scope}")]
    DuplicatePath { scope: Scope, path: String },

    #[error(
        "template '{template}' placeholders {placeholders:?} do not match \
         enumerator '{enumerator}' keys {keys:?}"
    )]
    PlaceholderMismatch {
        template: String,
        placeholders: Vec<String>,
        enumerator: &'static str,
        keys: Vec<&'static str>,
    },

    #[error("fixed registration for templated path '{0}'")]
    UnexpectedPlaceholder(String),

    #[error("templated registration for fixed path '{0}'")]
    MissingPlaceholder(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// The static catalog of producers, in declared registration order.
#[derive(Debug, Default)]
pub struct Registry {
    specs: Vec<ProducerSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixed-path producer.
    pub fn fixed(&mut self, scope: Scope, path: &str, f: FixedFn) -> Result<(), RegistryError> {
        let template = PathTemplate::parse(path)?;
        if !template.is_fixed() {
            return Err(RegistryError::UnexpectedPlaceholder(path.to_string()));
        }
        self.check_unique(scope, path)?;
        self.specs.push(ProducerSpec {
            scope,
            template,
            producer: ProducerFn::Fixed(f),
            enumerator: None,
        });
        Ok(())
    }

    /// Register a templated producer expanded by `enumerator`.
    ///
    /// The template's placeholders must exactly match the enumerator's
    /// declared key names (same set, order-insensitive).
    pub fn templated(
        &mut self,
        scope: Scope,
        path: &str,
        enumerator: EnumeratorId,
        f: TemplatedFn,
    ) -> Result<(), RegistryError> {
        let template = PathTemplate::parse(path)?;
        if template.is_fixed() {
            return Err(RegistryError::MissingPlaceholder(path.to_string()));
        }
        let keys = enumerator.declared_keys();
        let placeholders = template.placeholders();
        let matches = placeholders.len() == keys.len()
            && keys.iter().all(|k| placeholders.iter().any(|p| p == k));
        if !matches {
            return Err(RegistryError::PlaceholderMismatch {
                template: path.to_string(),
                placeholders: placeholders.to_vec(),
                enumerator: enumerator.name(),
                keys: keys.to_vec(),
            });
        }
        self.check_unique(scope, path)?;
        self.specs.push(ProducerSpec {
            scope,
            template,
            producer: ProducerFn::Templated(f),
            enumerator: Some(enumerator),
        });
        Ok(())
    }

    /// Declared paths must be unique per scope, fixed and templated
    /// alike: two identical templates would collide at the sink on
    /// every expansion, so catch them before any run starts.
    fn check_unique(&self, scope: Scope, path: &str) -> Result<(), RegistryError> {
        if self
            .specs
            .iter()
            .any(|s| s.scope == scope && s.template.as_str() == path)
        {
            return Err(RegistryError::DuplicatePath {
                scope,
                path: path.to_string(),
            });
        }
        Ok(())
    }

    /// All specs tagged to a scope, in registration order.
    pub fn list(&self, scope: Scope) -> impl Iterator<Item = &ProducerSpec> {
        self.specs.iter().filter(move |s| s.scope == scope)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
