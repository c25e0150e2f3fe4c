//! Built-in enumerators for templated producers.
//!
//! Enumerators turn snapshot state into a deterministic, ordered key
//! set. Each one implements a fallback chain over the symbols different
//! kernel versions expose; the first chain link yielding a non-empty,
//! plausible result wins. Partial failure never raises past the engine:
//! total failure surfaces as an [`EnumerateError`] which the engine
//! logs once and converts to zero expansions.

use crate::produce::key::EnumerationKey;
use crate::snapshot::{Snapshot, Value};

/// Default PID plausibility bound when the snapshot has no `pid_max`.
const DEFAULT_PID_MAX: i64 = 1_000_000;

/// Upper bound on a believable CPU count. Counts beyond this are
/// treated as corrupt (a pointer read where a count was expected).
const MAX_PLAUSIBLE_CPUS: i64 = 8192;

/// Error when an enumerator cannot produce any keys at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumerateError {
    #[error("enumerator '{enumerator}' found no usable source: {reason}")]
    NoSource {
        enumerator: &'static str,
        reason: String,
    },
}

/// Identifier of a built-in enumerator, referenced by name from
/// templated producer registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumeratorId {
    /// Process identifiers, ascending, deduplicated, plausibility-checked.
    Pids,
    /// CPU identifiers, ascending; never fails (degrades to cpu 0).
    Cpus,
}

impl EnumeratorId {
    /// Placeholder names this enumerator binds. Registration validates
    /// these against the path template's placeholders.
    pub fn declared_keys(&self) -> &'static [&'static str] {
        match self {
            EnumeratorId::Pids => &["pid"],
            EnumeratorId::Cpus => &["cpu"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnumeratorId::Pids => "pids",
            EnumeratorId::Cpus => "cpus",
        }
    }

    /// Produce the ordered key set for this enumerator.
    pub fn run(&self, snap: &dyn Snapshot) -> Result<Vec<EnumerationKey>, EnumerateError> {
        match self {
            EnumeratorId::Pids => enumerate_pids(snap),
            EnumeratorId::Cpus => Ok(enumerate_cpus(snap)),
        }
    }
}

impl std::fmt::Display for EnumeratorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Collect plausible integers from a list-of-integers symbol.
/// Implausible entries are skipped, not propagated.
fn plausible_ints(value: &Value, min: i64, max: i64) -> Vec<i64> {
    let Ok(items) = value.items() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if let Ok(n) = item.as_integer_in(min, max) {
            out.push(n);
        }
    }
    out
}

fn sorted_dedup(mut vals: Vec<i64>) -> Vec<i64> {
    vals.sort_unstable();
    vals.dedup();
    vals
}

/// PID enumeration chain:
/// 1. `pid_list`: canonical list of PIDs
/// 2. `tasks`: task records, collecting the `pid` field
///
/// Entries failing the plausibility check (`0 < pid <= pid_max`) are
/// rejected individually; some snapshot readers hand back raw pointers
/// where PIDs are expected and those must not become artifact paths.
fn enumerate_pids(snap: &dyn Snapshot) -> Result<Vec<EnumerationKey>, EnumerateError> {
    let pid_max = snap
        .lookup_integer_in("pid_max", 1, i64::MAX)
        .unwrap_or(DEFAULT_PID_MAX);

    if let Ok(value) = snap.lookup("pid_list") {
        let pids = sorted_dedup(plausible_ints(value, 1, pid_max));
        if !pids.is_empty() {
            return Ok(pids
                .into_iter()
                .map(|pid| EnumerationKey::int("pid", pid))
                .collect());
        }
        tracing::debug!("pid_list present but yielded no plausible pids, trying tasks");
    }

    if let Ok(value) = snap.lookup("tasks") {
        let mut pids = Vec::new();
        if let Ok(items) = value.items() {
            for task in items {
                let Ok(pid_field) = task.field("pid") else {
                    continue;
                };
                if let Ok(pid) = pid_field.as_integer_in(1, pid_max) {
                    pids.push(pid);
                }
            }
        }
        let pids = sorted_dedup(pids);
        if !pids.is_empty() {
            return Ok(pids
                .into_iter()
                .map(|pid| EnumerationKey::int("pid", pid))
                .collect());
        }
    }

    Err(EnumerateError::NoSource {
        enumerator: "pids",
        reason: "neither pid_list nor tasks yielded plausible pids".to_string(),
    })
}

/// CPU enumeration chain:
/// 1. `cpu_online_mask`
/// 2. `cpu_present_mask`
/// 3. `cpu_possible_mask`
/// 4. `nr_cpu_ids` as a `0..n` range
/// 5. single default entry `{cpu: 0}`
///
/// The last link guarantees this enumerator never fails: per-CPU
/// artifacts must exist even for a snapshot with no CPU topology.
fn enumerate_cpus(snap: &dyn Snapshot) -> Vec<EnumerationKey> {
    for mask in ["cpu_online_mask", "cpu_present_mask", "cpu_possible_mask"] {
        if let Ok(value) = snap.lookup(mask) {
            let cpus = sorted_dedup(plausible_ints(value, 0, MAX_PLAUSIBLE_CPUS));
            if !cpus.is_empty() {
                return cpus
                    .into_iter()
                    .map(|cpu| EnumerationKey::int("cpu", cpu))
                    .collect();
            }
        }
    }

    if let Ok(n) = snap.lookup_integer_in("nr_cpu_ids", 1, MAX_PLAUSIBLE_CPUS) {
        return (0..n).map(|cpu| EnumerationKey::int("cpu", cpu)).collect();
    }

    tracing::debug!("no cpu topology in snapshot, assuming a single cpu");
    vec![EnumerationKey::int("cpu", 0)]
}
