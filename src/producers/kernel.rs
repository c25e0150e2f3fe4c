//! Kernel identity summary: utsname fields, boot banner, taint flags.

use crate::produce::{Registry, RegistryError, Scope};
use crate::snapshot::{Snapshot, SnapshotError, Value};

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.fixed(Scope::KernelInfo, "kernel-info/uts", uts)?;
    registry.fixed(Scope::KernelInfo, "kernel-info/banner", banner)?;
    registry.fixed(Scope::KernelInfo, "kernel-info/taints", taints)?;
    Ok(())
}

const UTS_FIELDS: [&str; 6] = [
    "sysname",
    "nodename",
    "release",
    "version",
    "machine",
    "domainname",
];

/// Aligned field summary of the utsname record.
fn uts(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let name = snap.lookup("init_uts_ns")?.field("name")?;
    let mut out = String::new();
    for field in UTS_FIELDS {
        let value = name
            .field(field)
            .and_then(Value::as_text)
            .unwrap_or_default();
        out.push_str(&format!("{:<12}{}\n", format!("{field}:"), value.trim()));
    }
    Ok(out)
}

fn banner(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let text = snap.lookup_text("linux_banner")?;
    Ok(format!("{}\n", text.trim()))
}

/// One taint flag per line, or `not tainted`.
fn taints(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let flags = snap.lookup("kernel_taints")?.items()?;
    if flags.is_empty() {
        return Ok("not tainted\n".to_string());
    }
    let mut out = String::new();
    for flag in flags {
        out.push_str(&format!("{}\n", flag.as_text()?.trim()));
    }
    Ok(out)
}
