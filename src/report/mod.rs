pub mod group;
pub mod orchestrator;
pub mod selection;

pub use group::{builtin_groups, GroupSpec};
pub use orchestrator::{GroupOutcome, Orchestrator, ReportError, RunSummary};
pub use selection::{resolve, SelectionError, SelectionPolicy};
