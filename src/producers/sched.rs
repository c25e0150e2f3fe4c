//! Scheduler debug dump, analogous to /sys/kernel/debug/sched/debug.
//!
//! Experimental: the runqueue layout shifts between kernel versions
//! more than anything else we read, so this group is off unless
//! explicitly enabled and gated on the `runqueues` symbol resolving.

use crate::produce::{Registry, RegistryError, Scope};
use crate::snapshot::{Snapshot, SnapshotError, Value};

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.fixed(Scope::Sched, "sys/kernel/debug/sched/debug", sched_debug)?;
    Ok(())
}

fn int_line(out: &mut String, name: &str, value: Result<i64, SnapshotError>) {
    if let Ok(v) = value {
        out.push_str(&format!("  .{name:<30}: {v}\n"));
    }
}

/// Per-CPU runqueue summary. Fields missing from an individual
/// runqueue record are skipped line by line, keeping the rest of the
/// dump usable.
fn sched_debug(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let runqueues = snap.lookup("runqueues")?.items()?;
    if runqueues.is_empty() {
        return Err(SnapshotError::SymbolNotFound(
            "runqueues (empty)".to_string(),
        ));
    }

    let mut out = String::new();
    for rq in runqueues {
        let cpu = rq
            .field("cpu")
            .and_then(|v| v.as_integer_in(0, 8192))
            .unwrap_or(0);
        out.push_str(&format!("cpu#{cpu}\n"));
        int_line(&mut out, "nr_running", rq.field("nr_running").and_then(Value::as_integer));
        int_line(&mut out, "nr_switches", rq.field("nr_switches").and_then(Value::as_integer));
        int_line(&mut out, "curr->pid", rq.field("curr_pid").and_then(Value::as_integer));
        if let Ok(comm) = rq.field("curr_comm").and_then(Value::as_text) {
            out.push_str(&format!("  .{:<30}: {}\n", "curr->comm", comm));
        }
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MockSnapshot;

    #[test]
    fn dumps_per_cpu_sections() {
        let snap = MockSnapshot::new().with_json(
            "runqueues",
            serde_json::json!([
                {"cpu": 0, "nr_running": 2, "nr_switches": 91842, "curr_pid": 1423, "curr_comm": "rsyslogd"},
                {"cpu": 1, "nr_running": 0},
            ]),
        );
        let text = sched_debug(&snap).unwrap();
        assert!(text.contains("cpu#0\n"));
        assert!(text.contains("cpu#1\n"));
        assert!(text.contains(": 91842\n"));
        assert!(text.contains("rsyslogd"));
        // cpu#1 has no switches line at all.
        assert_eq!(text.matches("nr_switches").count(), 1);
    }

    #[test]
    fn missing_runqueues_errors() {
        assert!(sched_debug(&MockSnapshot::new()).is_err());
    }
}
