//! Producer groups: the unit of selection.
//!
//! A group is a capability record over one scope. Optional behavior is
//! expressed as plain function pointers with explicit defaults supplied
//! here (`always_enabled` gate, no-op setup) rather than inherited
//! hooks: what a group can do is visible at its registration site.

use crate::produce::Scope;
use crate::snapshot::Snapshot;

/// Runtime gate: may the group run against this snapshot?
pub type GateFn = fn(&dyn Snapshot) -> bool;

/// Pre-collection hook, e.g. for logging context once per group.
pub type SetupFn = fn(&dyn Snapshot);

fn always_enabled(_: &dyn Snapshot) -> bool {
    true
}

fn no_setup(_: &dyn Snapshot) {}

/// Named, independently selectable bundle of producers.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub scope: Scope,
    pub default_enabled: bool,
    pub experimental: bool,
    pub gate: GateFn,
    pub setup: SetupFn,
}

impl GroupSpec {
    pub fn new(name: &'static str, description: &'static str, scope: Scope) -> Self {
        Self {
            name,
            description,
            scope,
            default_enabled: true,
            experimental: false,
            gate: always_enabled,
            setup: no_setup,
        }
    }

    pub fn experimental(mut self) -> Self {
        self.experimental = true;
        self
    }

    pub fn disabled_by_default(mut self) -> Self {
        self.default_enabled = false;
        self
    }

    pub fn with_gate(mut self, gate: GateFn) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_setup(mut self, setup: SetupFn) -> Self {
        self.setup = setup;
        self
    }
}

fn has_runqueues(snap: &dyn Snapshot) -> bool {
    snap.has_symbol("runqueues")
}

fn log_kernel_release(snap: &dyn Snapshot) {
    if let Ok(uts) = snap.lookup("init_uts_ns") {
        if let Ok(release) = uts
            .field("name")
            .and_then(|n| n.field("release"))
            .and_then(|r| r.as_text())
        {
            tracing::info!(release = %release.trim(), "snapshot kernel");
        }
    }
}

/// The built-in groups, in declaration (run) order.
pub fn builtin_groups() -> Vec<GroupSpec> {
    vec![
        GroupSpec::new(
            "procfs",
            "Reconstruct proc/ tree from the snapshot (best-effort)",
            Scope::Proc,
        ),
        GroupSpec::new(
            "sysfs",
            "Reconstruct sys/ tree from the snapshot (best-effort)",
            Scope::Sys,
        ),
        GroupSpec::new(
            "commands",
            "Reconstruct command outputs (uname, lsmod) from the snapshot",
            Scope::Commands,
        ),
        GroupSpec::new(
            "kernel-info",
            "Kernel basics (utsname, banner, taints)",
            Scope::KernelInfo,
        )
        .with_setup(log_kernel_release),
        GroupSpec::new(
            "sched-debug",
            "Scheduler debug dump similar to /sys/kernel/debug/sched/debug",
            Scope::Sched,
        )
        .experimental()
        .with_gate(has_runqueues),
    ]
}
