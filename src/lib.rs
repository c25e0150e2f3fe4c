pub mod cli;
pub mod config;
pub mod produce;
pub mod producers;
pub mod report;
pub mod sink;
pub mod snapshot;

pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use produce::{AbortFlag, ArtifactResult, ArtifactStatus, Engine, Registry};
pub use report::{builtin_groups, Orchestrator, ReportError, RunSummary, SelectionPolicy};
pub use sink::{DirectorySink, MemorySink, OutputSink, SinkError};
pub use snapshot::{JsonSnapshot, MockSnapshot, Snapshot, SnapshotError, Value};
