//! Fixed-path `proc/` producers: cmdline, cpuinfo, meminfo, modules,
//! mounts.
//!
//! Everything here is best-effort reconstruction. Fields that cannot be
//! derived from a snapshot get a stable `unknown` token or are dropped,
//! and partially reconstructed files carry the advisory marker line.

use crate::produce::{EnumeratorId, Registry, RegistryError, Scope, PARTIAL_MARKER};
use crate::snapshot::{Snapshot, SnapshotError, Value};

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.fixed(Scope::Proc, "proc/cmdline", cmdline)?;
    registry.fixed(Scope::Proc, "proc/cpuinfo", cpuinfo)?;
    registry.fixed(Scope::Proc, "proc/interrupts", interrupts)?;
    registry.fixed(Scope::Proc, "proc/meminfo", meminfo)?;
    registry.fixed(Scope::Proc, "proc/modules", modules)?;
    registry.fixed(Scope::Proc, "proc/mounts", mounts)?;
    registry.fixed(Scope::Proc, "proc/softirqs", softirqs)?;
    Ok(())
}

fn cmdline(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let line = snap.lookup_text("saved_command_line")?;
    Ok(format!("{}\n", line.trim_end_matches('\n')))
}

/// Machine architecture from the utsname record, empty when absent.
pub(crate) fn uts_machine(snap: &dyn Snapshot) -> String {
    snap.lookup("init_uts_ns")
        .and_then(|uts| uts.field("name"))
        .and_then(|name| name.field("machine"))
        .and_then(Value::as_text)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// One stanza per CPU with the commonly parsed fields. Per-CPU brand
/// strings are not recoverable from a snapshot, so vendor_id and model
/// name stay `unknown` and the file carries the partial marker.
fn cpuinfo(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let arch = uts_machine(snap);
    let mut out = String::new();
    out.push_str(PARTIAL_MARKER);
    for cpu in table_cpus(snap) {
        out.push_str(&format!("processor\t: {cpu}\n"));
        out.push_str(&format!(
            "architecture\t: {}\n",
            if arch.is_empty() { "unknown" } else { &arch }
        ));
        out.push_str("vendor_id\t: unknown\n");
        out.push_str("model name\t: unknown\n");
        out.push('\n');
    }
    Ok(out)
}

/// Enumerated CPU ids for per-CPU stanzas and table columns. The cpu
/// enumerator degrades to a single default entry rather than failing,
/// but keep the guard in case that contract ever loosens.
fn table_cpus(snap: &dyn Snapshot) -> Vec<i64> {
    EnumeratorId::Cpus
        .run(snap)
        .unwrap_or_else(|_| vec![crate::produce::EnumerationKey::int("cpu", 0)])
        .iter()
        .map(|key| key.get_int("cpu").unwrap_or(0))
        .collect()
}

fn cpu_header(indent: usize, cpus: &[i64]) -> String {
    let cols: Vec<String> = cpus.iter().map(|c| format!("CPU{c:>7}")).collect();
    format!("{}{}\n", " ".repeat(indent), cols.join(" "))
}

/// Per-CPU counts for one table row, padded with zeros to the column
/// count when the record's list is short.
fn row_counts(record: &Value, cpus: &[i64]) -> String {
    let counts = record
        .field("counts")
        .and_then(Value::items)
        .map(<[Value]>::to_vec)
        .unwrap_or_default();
    let mut out = String::new();
    for i in 0..cpus.len() {
        let n = counts
            .get(i)
            .and_then(|v| v.as_integer().ok())
            .unwrap_or(0);
        out.push_str(&format!("{n:>10}"));
    }
    out
}

/// One row per in-use interrupt with per-CPU counts, chip, and action
/// name, mirroring the /proc/interrupts layout.
fn interrupts(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let list = snap.lookup("irqs")?.items()?;
    if list.is_empty() {
        return Err(SnapshotError::SymbolNotFound("irqs (empty)".to_string()));
    }
    let cpus = table_cpus(snap);

    let mut out = cpu_header(11, &cpus);
    for desc in list {
        let irq = desc
            .field("irq")
            .and_then(Value::as_integer)
            .unwrap_or(0);
        let mut tail = String::new();
        if let Ok(chip) = desc.field("chip").and_then(Value::as_text) {
            tail.push_str(&format!(" {chip}"));
        }
        if let Ok(name) = desc.field("name").and_then(Value::as_text) {
            tail.push_str(&format!(" {name}"));
        }
        out.push_str(&format!("{irq:>5}: {}{tail}\n", row_counts(desc, &cpus)));
    }
    Ok(out)
}

/// Per-CPU softirq counts, one row per softirq type.
fn softirqs(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let list = snap.lookup("softirqs")?.items()?;
    if list.is_empty() {
        return Err(SnapshotError::SymbolNotFound(
            "softirqs (empty)".to_string(),
        ));
    }
    let cpus = table_cpus(snap);

    let mut out = cpu_header(20, &cpus);
    for row in list {
        let name = row
            .field("name")
            .and_then(Value::as_text)
            .unwrap_or_else(|_| "unknown".to_string());
        out.push_str(&format!(
            "{:<16}{}\n",
            format!("{name}:"),
            row_counts(row, &cpus)
        ));
    }
    Ok(out)
}

fn page_shift(snap: &dyn Snapshot) -> i64 {
    snap.lookup_integer_in("PAGE_SHIFT", 10, 20).unwrap_or(12)
}

fn pages_to_kb(pages: i64, page_shift: i64) -> i64 {
    pages.max(0) << (page_shift - 10).max(0)
}

/// The meminfo fields we can actually source, in /proc/meminfo order.
/// Counters are pages in the snapshot and kB on the wire.
fn meminfo(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let shift = page_shift(snap);
    let mut lines: Vec<(&str, i64)> = Vec::new();
    let mut missing = false;

    match snap.lookup_integer_in("totalram_pages", 0, i64::MAX >> shift) {
        Ok(pages) => lines.push(("MemTotal:", pages_to_kb(pages, shift))),
        Err(_) => missing = true,
    }

    match snap.lookup("vm_stat") {
        Ok(stat) => {
            for (label, field) in [
                ("MemFree:", "nr_free_pages"),
                ("Cached:", "nr_file_pages"),
                ("SReclaimable:", "nr_slab_reclaimable"),
                ("SUnreclaim:", "nr_slab_unreclaimable"),
            ] {
                match stat.field(field).and_then(Value::as_integer) {
                    Ok(pages) => lines.push((label, pages_to_kb(pages, shift))),
                    Err(_) => missing = true,
                }
            }
        }
        Err(_) => missing = true,
    }

    if lines.is_empty() {
        return Err(SnapshotError::SymbolNotFound(
            "totalram_pages/vm_stat".to_string(),
        ));
    }

    let mut out = String::new();
    if missing {
        out.push_str(PARTIAL_MARKER);
    }
    for (label, kb) in lines {
        out.push_str(&format!("{label:<16}{kb:>8} kB\n"));
    }
    Ok(out)
}

/// `<module> <size> <refcount>` per line, a compatible subset of the
/// /proc/modules columns. Dependencies, state, and load address are not
/// reliably derivable.
fn modules(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let list = snap.lookup("modules")?.items()?;
    if list.is_empty() {
        return Err(SnapshotError::SymbolNotFound("modules (empty)".to_string()));
    }
    let mut out = String::new();
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
        out.push_str(&format!("{name} {size} {refcnt}\n"));
    }
    Ok(out)
}

/// Six-column mount lines. dump and pass are always 0; options collapse
/// to `rw`/`ro` since per-mount flags beyond readonly are not recovered.
fn mounts(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    let list = snap.lookup("mounts")?.items()?;
    if list.is_empty() {
        return Err(SnapshotError::SymbolNotFound("mounts (empty)".to_string()));
    }
    let mut out = String::new();
    for mount in list {
        let devname = mount
            .field("devname")
            .and_then(Value::as_text)
            .unwrap_or_else(|_| "unknown".to_string());
        let target = mount
            .field("target")
            .and_then(Value::as_text)
            .unwrap_or_else(|_| "/".to_string());
        let fstype = mount
            .field("fstype")
            .and_then(Value::as_text)
            .unwrap_or_else(|_| "unknown".to_string());
        let readonly = mount
            .field("readonly")
            .and_then(Value::as_integer)
            .unwrap_or(0);
        let options = if readonly != 0 { "ro" } else { "rw" };
        out.push_str(&format!("{devname} {target} {fstype} {options} 0 0\n"));
    }
    Ok(out)
}
