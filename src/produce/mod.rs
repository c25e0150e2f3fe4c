pub mod artifact;
pub mod engine;
pub mod enumerate;
pub mod key;
pub mod registry;

pub use artifact::{ArtifactResult, ArtifactStatus, PARTIAL_MARKER, stub_content};
pub use engine::{AbortFlag, Engine};
pub use enumerate::{EnumerateError, EnumeratorId};
pub use key::{EnumerationKey, KeyValue, PathTemplate, TemplateError};
pub use registry::{FixedFn, ProducerSpec, Registry, RegistryError, Scope, TemplatedFn};
