pub mod context;
pub mod error;
pub mod mock;
pub mod value;

pub use context::{JsonSnapshot, Snapshot};
pub use error::SnapshotError;
pub use mock::MockSnapshot;
pub use value::Value;
