//! Templated `proc/{pid}/*` producers: status, cgroup, oom_score_adj.
//!
//! All three share one task-record lookup: the snapshot's `tasks`
//! symbol is a list of records keyed by `pid`. A pid the enumerator
//! yielded but the list no longer contains produces a stub, preserving
//! path presence.

use crate::produce::{EnumerationKey, EnumeratorId, Registry, RegistryError, Scope};
use crate::snapshot::{Snapshot, SnapshotError, Value};

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.templated(Scope::Proc, "proc/{pid}/status", EnumeratorId::Pids, status)?;
    registry.templated(Scope::Proc, "proc/{pid}/cgroup", EnumeratorId::Pids, cgroup)?;
    registry.templated(Scope::Proc, "proc/{pid}/cpuset", EnumeratorId::Pids, cpuset)?;
    registry.templated(
        Scope::Proc,
        "proc/{pid}/oom_adj",
        EnumeratorId::Pids,
        oom_adj,
    )?;
    registry.templated(
        Scope::Proc,
        "proc/{pid}/oom_score",
        EnumeratorId::Pids,
        oom_score,
    )?;
    registry.templated(
        Scope::Proc,
        "proc/{pid}/oom_score_adj",
        EnumeratorId::Pids,
        oom_score_adj,
    )?;
    Ok(())
}

/// Find the task record bound to this enumeration key.
fn task_for<'a>(snap: &'a dyn Snapshot, key: &EnumerationKey) -> Result<&'a Value, SnapshotError> {
    let pid = key.get_int("pid").ok_or(SnapshotError::InvalidCoercion {
        value: -1,
        min: 1,
        max: i64::MAX,
    })?;
    let tasks = snap.lookup("tasks")?.items()?;
    tasks
        .iter()
        .find(|t| {
            t.field("pid")
                .and_then(Value::as_integer)
                .map(|p| p == pid)
                .unwrap_or(false)
        })
        .ok_or_else(|| SnapshotError::MissingMember {
            context: "tasks".to_string(),
            member: format!("pid {pid}"),
        })
}

fn text_or(task: &Value, field: &str, default: &str) -> String {
    task.field(field)
        .and_then(Value::as_text)
        .unwrap_or_else(|_| default.to_string())
}

fn int_or(task: &Value, field: &str, default: i64) -> i64 {
    task.field(field)
        .and_then(Value::as_integer)
        .unwrap_or(default)
}

/// Minimal /proc/<pid>/status field set. Credentials and group lists
/// are not reliably recoverable, so Uid/Gid rows default to 0 and
/// Groups stays empty, matching what a stripped-down kernel image
/// would show.
fn status(snap: &dyn Snapshot, key: &EnumerationKey) -> Result<String, SnapshotError> {
    let task = task_for(snap, key)?;
    let pid = int_or(task, "pid", 0);

    let mut out = String::new();
    out.push_str(&format!("Name:\t{}\n", text_or(task, "comm", "unknown")));
    out.push_str("Umask:\t0000\n");
    out.push_str(&format!(
        "State:\t{} ({})\n",
        text_or(task, "state", "?"),
        int_or(task, "state_value", 0)
    ));
    out.push_str(&format!("Tgid:\t{}\n", int_or(task, "tgid", pid)));
    out.push_str("Ngid:\t0\n");
    out.push_str(&format!("Pid:\t{pid}\n"));
    out.push_str(&format!("PPid:\t{}\n", int_or(task, "ppid", 0)));
    out.push_str(&format!("TracerPid:\t{}\n", int_or(task, "tracer_pid", 0)));
    out.push_str("Uid:\t0\t0\t0\t0\n");
    out.push_str("Gid:\t0\t0\t0\t0\n");
    out.push_str("Groups:\n");
    out.push_str(&format!("NStgid:\t{pid}\n"));
    out.push_str(&format!("NSpid:\t{pid}\n"));
    out.push_str(&format!("Kthread:\t{}\n", int_or(task, "kthread", 0)));
    out.push_str(&format!("Threads:\t{}\n", int_or(task, "threads", 1)));
    Ok(out)
}

/// Unified cgroup v2 line, `0::<path>`.
fn cgroup(snap: &dyn Snapshot, key: &EnumerationKey) -> Result<String, SnapshotError> {
    let task = task_for(snap, key)?;
    let path = text_or(task, "cgroup", "/");
    Ok(format!("0::{path}\n"))
}

/// Cpuset path: dedicated controller path when recorded, else the
/// unified hierarchy path, else root.
fn cpuset(snap: &dyn Snapshot, key: &EnumerationKey) -> Result<String, SnapshotError> {
    let task = task_for(snap, key)?;
    let path = task
        .field("cpuset")
        .and_then(Value::as_text)
        .or_else(|_| task.field("cgroup").and_then(Value::as_text))
        .unwrap_or_else(|_| "/".to_string());
    Ok(format!("{path}\n"))
}

fn clamped_adj(task: &Value) -> i64 {
    // Kernel clamps to -1000..=1000; anything else in the image is a
    // decoding artifact and collapses to the default.
    task.field("oom_score_adj")
        .and_then(|v| v.as_integer_in(-1000, 1000))
        .unwrap_or(0)
}

/// Deprecated knob; kernels report 0 regardless of the adj value.
fn oom_adj(snap: &dyn Snapshot, key: &EnumerationKey) -> Result<String, SnapshotError> {
    task_for(snap, key)?;
    Ok("0\n".to_string())
}

/// Real OOM scoring needs live memory accounting; a stable mapping of
/// the adj value keeps relative ordering between tasks.
fn oom_score(snap: &dyn Snapshot, key: &EnumerationKey) -> Result<String, SnapshotError> {
    let task = task_for(snap, key)?;
    Ok(format!("{}\n", clamped_adj(task) * 1000))
}

fn oom_score_adj(snap: &dyn Snapshot, key: &EnumerationKey) -> Result<String, SnapshotError> {
    let task = task_for(snap, key)?;
    Ok(format!("{}\n", clamped_adj(task)))
}
