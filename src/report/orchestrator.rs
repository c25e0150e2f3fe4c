//! Run orchestration: selection, per-group execution, aggregation.

use crate::produce::{AbortFlag, ArtifactResult, Engine, Registry};
use crate::report::group::GroupSpec;
use crate::report::selection::{self, SelectionError, SelectionPolicy};
use crate::sink::{OutputSink, SinkError};
use crate::snapshot::Snapshot;

/// Fatal orchestration error. Contained per-task failures never reach
/// this type; see the produce module for those.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Per-group tally reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOutcome {
    pub name: &'static str,
    /// Fully reconstructed artifacts.
    pub reconstructed: usize,
    /// Stub artifacts (producer failed, path preserved).
    pub stubbed: usize,
    /// Group was selected but its runtime gate said no.
    pub gated: bool,
}

impl GroupOutcome {
    pub fn total(&self) -> usize {
        self.reconstructed + self.stubbed
    }
}

/// Whole-run result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub groups: Vec<GroupOutcome>,
    pub aborted: bool,
}

impl RunSummary {
    pub fn total_artifacts(&self) -> usize {
        self.groups.iter().map(GroupOutcome::total).sum()
    }
}

/// Drives one run: resolves active groups, invokes the execution engine
/// once per group in declaration order against the shared snapshot, and
/// forwards results to the sink.
#[derive(Debug)]
pub struct Orchestrator {
    registry: Registry,
    groups: Vec<GroupSpec>,
}

impl Orchestrator {
    pub fn new(registry: Registry, groups: Vec<GroupSpec>) -> Self {
        Self { registry, groups }
    }

    pub fn groups(&self) -> &[GroupSpec] {
        &self.groups
    }

    /// Run all groups selected by `policy`.
    ///
    /// Execution is strictly sequential: one group at a time, one task
    /// at a time, all against the same read-only snapshot. An abort is
    /// honored between tasks; the sink then holds a partial but
    /// consistent set (every attempted path has a result).
    pub fn run(
        &self,
        snap: &dyn Snapshot,
        policy: &SelectionPolicy,
        sink: &mut dyn OutputSink,
        abort: &AbortFlag,
    ) -> Result<RunSummary, ReportError> {
        let selected = selection::resolve(&self.groups, policy)?;
        tracing::info!(
            groups = selected.len(),
            "selection resolved, starting collection"
        );

        let engine = Engine::new(&self.registry);
        let mut summary = RunSummary::default();

        for group in selected {
            if abort.is_set() {
                summary.aborted = true;
                tracing::info!("abort requested, stopping before group '{}'", group.name);
                break;
            }
            if !(group.gate)(snap) {
                tracing::info!(group = %group.name, "gate declined, group inactive for this run");
                summary.groups.push(GroupOutcome {
                    name: group.name,
                    reconstructed: 0,
                    stubbed: 0,
                    gated: true,
                });
                continue;
            }
            (group.setup)(snap);

            let results = engine.run_scope(group.scope, snap, abort);
            if abort.is_set() {
                summary.aborted = true;
            }

            let mut outcome = GroupOutcome {
                name: group.name,
                reconstructed: 0,
                stubbed: 0,
                gated: false,
            };
            for result in &results {
                if result.status.is_stub() {
                    outcome.stubbed += 1;
                } else {
                    outcome.reconstructed += 1;
                }
            }
            self.persist(&results, sink)?;

            tracing::info!(
                group = %group.name,
                reconstructed = outcome.reconstructed,
                stubbed = outcome.stubbed,
                "group collected"
            );
            summary.groups.push(outcome);
        }

        Ok(summary)
    }

    fn persist(
        &self,
        results: &[ArtifactResult],
        sink: &mut dyn OutputSink,
    ) -> Result<(), ReportError> {
        for result in results {
            sink.write(&result.path, &result.content)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::produce::{EnumerationKey, Scope};
    use crate::snapshot::{MockSnapshot, SnapshotError};
    use crate::sink::MemorySink;

    fn cmdline(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
        Ok(snap.lookup_text("saved_command_line")? + "\n")
    }

    fn pid_line(_: &dyn Snapshot, key: &EnumerationKey) -> Result<String, SnapshotError> {
        Ok(format!("{}\n", key.get_int("pid").unwrap_or(0)))
    }

    fn gate_never(_: &dyn Snapshot) -> bool {
        false
    }

    fn fixture() -> Orchestrator {
        let mut registry = Registry::new();
        registry.fixed(Scope::Proc, "proc/cmdline", cmdline).unwrap();
        registry
            .templated(
                Scope::Proc,
                "proc/{pid}/pidline",
                crate::produce::EnumeratorId::Pids,
                pid_line,
            )
            .unwrap();
        registry
            .fixed(Scope::Sys, "sys/devices/system/cpu/online", |snap| {
                snap.lookup_text("cpu_online").map(|s| s + "\n")
            })
            .unwrap();

        let groups = vec![
            GroupSpec::new("procfs", "", Scope::Proc),
            GroupSpec::new("sysfs", "", Scope::Sys),
            GroupSpec::new("gated", "", Scope::Sched).with_gate(gate_never),
        ];
        Orchestrator::new(registry, groups)
    }

    fn snapshot() -> MockSnapshot {
        MockSnapshot::new()
            .with("saved_command_line", "ro quiet")
            .with("pid_list", vec![1i64, 42])
            .with("cpu_online", "0-3")
    }

    #[test]
    fn runs_groups_in_declaration_order() {
        let orch = fixture();
        let mut sink = MemorySink::new();
        let summary = orch
            .run(
                &snapshot(),
                &SelectionPolicy::default(),
                &mut sink,
                &AbortFlag::new(),
            )
            .unwrap();

        assert_eq!(
            sink.paths(),
            [
                "proc/cmdline",
                "proc/1/pidline",
                "proc/42/pidline",
                "sys/devices/system/cpu/online",
            ]
        );
        assert!(!summary.aborted);
        assert_eq!(summary.total_artifacts(), 4);
    }

    #[test]
    fn per_group_counts_split_stubs() {
        let orch = fixture();
        // No command line symbol: proc/cmdline becomes a stub, pidline
        // still reconstructs.
        let snap = MockSnapshot::new()
            .with("pid_list", vec![7i64])
            .with("cpu_online", "0");
        let mut sink = MemorySink::new();
        let summary = orch
            .run(&snap, &SelectionPolicy::default(), &mut sink, &AbortFlag::new())
            .unwrap();

        let procfs = summary.groups.iter().find(|g| g.name == "procfs").unwrap();
        assert_eq!(procfs.stubbed, 1);
        assert_eq!(procfs.reconstructed, 1);
        assert!(sink.content("proc/cmdline").unwrap().contains("stub"));
    }

    #[test]
    fn gate_false_marks_group_inactive() {
        let orch = fixture();
        let mut sink = MemorySink::new();
        let summary = orch
            .run(
                &snapshot(),
                &SelectionPolicy::default(),
                &mut sink,
                &AbortFlag::new(),
            )
            .unwrap();
        let gated = summary.groups.iter().find(|g| g.name == "gated").unwrap();
        assert!(gated.gated);
        assert_eq!(gated.total(), 0);
    }

    #[test]
    fn unknown_only_fails_before_any_output() {
        let orch = fixture();
        let mut sink = MemorySink::new();
        let err = orch
            .run(
                &snapshot(),
                &SelectionPolicy {
                    only: vec!["nope".into()],
                    ..Default::default()
                },
                &mut sink,
                &AbortFlag::new(),
            )
            .unwrap_err();
        assert!(matches!(err, ReportError::Selection(_)));
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn abort_between_groups_keeps_partial_output() {
        let orch = fixture();
        let mut sink = MemorySink::new();
        let abort = AbortFlag::new();
        abort.set();
        let summary = orch
            .run(&snapshot(), &SelectionPolicy::default(), &mut sink, &abort)
            .unwrap();
        assert!(summary.aborted);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn two_runs_are_byte_identical() {
        let orch = fixture();
        let snap = snapshot();
        let mut a = MemorySink::new();
        let mut b = MemorySink::new();
        orch.run(&snap, &SelectionPolicy::default(), &mut a, &AbortFlag::new())
            .unwrap();
        orch.run(&snap, &SelectionPolicy::default(), &mut b, &AbortFlag::new())
            .unwrap();
        assert_eq!(a.entries(), b.entries());
    }
}
