//! Command-summary producers: reconstructions of what `uname -a` and
//! `lsmod` would have printed on the live system.

use crate::produce::{Registry, RegistryError, Scope};
use crate::snapshot::{Snapshot, SnapshotError, Value};

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.fixed(Scope::Commands, "commands/kernel/uname_-a", uname_a)?;
    registry.fixed(Scope::Commands, "commands/kernel/lsmod", lsmod)?;
    Ok(())
}

fn uts_field(snap: &dyn Snapshot, field: &str) -> Option<String> {
    snap.lookup("init_uts_ns")
        .and_then(|uts| uts.field("name"))
        .and_then(|name| name.field(field))
        .and_then(Value::as_text)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `sysname nodename release version machine`, skipping fields the
/// snapshot cannot provide. Falls back to the kernel banner as a
/// version line when utsname is gone entirely.
fn uname_a(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let mut parts: Vec<String> = ["sysname", "nodename", "release", "version", "machine"]
        .iter()
        .filter_map(|f| uts_field(snap, f))
        .collect();

    if parts.is_empty() {
        if let Ok(banner) = snap.lookup_text("linux_banner") {
            parts.push(banner.trim().to_string());
        }
    }

    if parts.is_empty() {
        return Err(SnapshotError::SymbolNotFound(
            "init_uts_ns/linux_banner".to_string(),
        ));
    }
    Ok(parts.join(" ") + "\n")
}

/// Minimal lsmod table from the module list.
fn lsmod(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let list = snap.lookup("modules")?.items()?;
    if list.is_empty() {
        return Err(SnapshotError::SymbolNotFound("modules (empty)".to_string()));
    }
    let mut out = String::from("Module                  Size  Used by\n");
    for module in list {
        let name = module
            .field("name")
            .and_then(Value::as_text)
            .unwrap_or_else(|_| "unknown".to_string());
        let size = module
            .field("size")
            .and_then(Value::as_integer)
            .unwrap_or(0);
        let refcnt = module
            .field("refcnt")
            .and_then(Value::as_integer)
            .unwrap_or(0);
        out.push_str(&format!("{name:<22}{size:>6}  {refcnt}\n"));
    }
    Ok(out)
}
