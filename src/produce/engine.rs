//! Execution engine: expands a scope's producers into concrete tasks
//! and runs them against the snapshot with fault containment.
//!
//! Execution is strictly sequential. The snapshot is shared and
//! read-only, its internal resolution caches are not guaranteed safe
//! for concurrent access, and run-to-run determinism matters more than
//! parallel speedup for diffable output trees. An abort request is
//! honored between tasks, never mid-task; everything produced before an
//! abort remains a valid, consistent partial result set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::produce::artifact::ArtifactResult;
use crate::produce::key::EnumerationKey;
use crate::produce::registry::{ProducerSpec, Registry, Scope};
use crate::snapshot::Snapshot;

/// Cooperative abort signal shared between the caller and the engine.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A producer bound to zero or one enumeration key, yielding exactly
/// one concrete path.
struct Task<'a> {
    spec: &'a ProducerSpec,
    key: EnumerationKey,
    path: String,
}

/// Runs a scope's producers in declared order against one snapshot.
#[derive(Debug)]
pub struct Engine<'a> {
    registry: &'a Registry,
}

impl<'a> Engine<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Run every producer in `scope`, returning one result per expanded
    /// task in stable order: producers in registration order, templated
    /// instances in enumerator key order.
    ///
    /// Producer failures become stub results at the declared path; an
    /// enumerator failing outright degrades that template to zero tasks,
    /// logged once. Neither aborts the scope.
    pub fn run_scope(
        &self,
        scope: Scope,
        snap: &dyn Snapshot,
        abort: &AbortFlag,
    ) -> Vec<ArtifactResult> {
        let mut results = Vec::new();
        for task in self.expand(scope, snap) {
            if abort.is_set() {
                tracing::info!(scope = %scope, "abort requested, stopping before next task");
                break;
            }
            results.push(self.execute(&task, snap));
        }
        results
    }

    /// Expand fixed specs to one task each and templated specs to one
    /// task per enumeration key.
    fn expand(&self, scope: Scope, snap: &dyn Snapshot) -> Vec<Task<'a>> {
        let mut tasks = Vec::new();
        for spec in self.registry.list(scope) {
            match spec.enumerator() {
                None => tasks.push(Task {
                    spec,
                    key: EnumerationKey::new(),
                    path: spec.template().as_str().to_string(),
                }),
                Some(enumerator) => match enumerator.run(snap) {
                    Ok(keys) => {
                        for key in keys {
                            let path = spec.template().render(&key);
                            tasks.push(Task { spec, key, path });
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            template = %spec.template(),
                            enumerator = %enumerator,
                            error = %e,
                            "enumeration failed, skipping template"
                        );
                    }
                },
            }
        }
        tasks
    }

    /// Run one task inside the failure boundary.
    fn execute(&self, task: &Task<'_>, snap: &dyn Snapshot) -> ArtifactResult {
        match task.spec.produce(snap, &task.key) {
            Ok(content) => ArtifactResult::reconstructed(&task.path, content),
            Err(e) => {
                tracing::debug!(path = %task.path, error = %e, "producer failed, emitting stub");
                ArtifactResult::stub(&task.path, e.to_string())
            }
        }
    }
}
