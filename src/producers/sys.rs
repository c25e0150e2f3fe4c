//! `sys/devices/system/cpu/*` mask files.
//!
//! Output format is the Linux sysfs range-list style, e.g. `0-3,8-11`.
//! Each file has its own fallback chain mirroring the mask containment
//! relationships (possible ⊇ present ⊇ online): a missing mask borrows
//! the nearest neighbor before degrading to an `nr_cpu_ids`
//! approximation with an advisory marker, then to a stub.

use crate::produce::{Registry, RegistryError, Scope};
use crate::snapshot::{Snapshot, SnapshotError};

const MAX_PLAUSIBLE_CPUS: i64 = 8192;

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.fixed(Scope::Sys, "sys/devices/system/cpu/online", online)?;
    registry.fixed(Scope::Sys, "sys/devices/system/cpu/present", present)?;
    registry.fixed(Scope::Sys, "sys/devices/system/cpu/possible", possible)?;
    Ok(())
}

/// Render sorted, deduplicated ints as a Linux cpu-list string.
pub(crate) fn range_list(vals: &[i64]) -> String {
    let mut sorted: Vec<i64> = vals.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<String> = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let (mut start, mut prev) = (first, first);
    for cur in iter {
        if cur == prev + 1 {
            prev = cur;
            continue;
        }
        ranges.push(flush(start, prev));
        start = cur;
        prev = cur;
    }
    ranges.push(flush(start, prev));
    ranges.join(",")
}

fn flush(start: i64, end: i64) -> String {
    if start == end {
        format!("{start}")
    } else {
        format!("{start}-{end}")
    }
}

fn mask_values(snap: &dyn Snapshot, symbol: &str) -> Vec<i64> {
    let Ok(value) = snap.lookup(symbol) else {
        return Vec::new();
    };
    let Ok(items) = value.items() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|v| v.as_integer_in(0, MAX_PLAUSIBLE_CPUS).ok())
        .collect()
}

/// `0-(n-1)` from nr_cpu_ids, empty when unavailable.
fn approximate_range(snap: &dyn Snapshot) -> Option<String> {
    let n = snap
        .lookup_integer_in("nr_cpu_ids", 1, MAX_PLAUSIBLE_CPUS)
        .ok()?;
    Some(if n > 1 {
        format!("0-{}", n - 1)
    } else {
        "0".to_string()
    })
}

/// Walk the fallback chain for one mask file.
fn mask_file(snap: &dyn Snapshot, chain: &[&str]) -> Result<String, SnapshotError> {
    for symbol in chain {
        let vals = mask_values(snap, symbol);
        if !vals.is_empty() {
            return Ok(range_list(&vals) + "\n");
        }
    }
    if let Some(range) = approximate_range(snap) {
        return Ok(format!(
            "# vmrecon: partial ({} missing, approximated from nr_cpu_ids)\n{range}\n",
            chain[0]
        ));
    }
    Err(SnapshotError::SymbolNotFound(chain[0].to_string()))
}

fn online(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    mask_file(snap, &["cpu_online_mask"])
}

fn present(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    // present ⊇ online: borrow online when present is missing.
    mask_file(snap, &["cpu_present_mask", "cpu_online_mask"])
}

fn possible(snap: &dyn Snapshot) -> Result<String, SnapshotError> {
    mask_file(snap, &["cpu_possible_mask", "cpu_present_mask"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MockSnapshot;
    use proptest::prelude::*;

    #[test]
    fn range_list_formats_runs() {
        assert_eq!(range_list(&[0, 1, 2, 3]), "0-3");
        assert_eq!(range_list(&[0, 2, 3, 8, 9, 10, 12]), "0,2-3,8-10,12");
        assert_eq!(range_list(&[5]), "5");
        assert_eq!(range_list(&[]), "");
        assert_eq!(range_list(&[3, 1, 2, 2]), "1-3");
    }

    #[test]
    fn online_from_mask() {
        let snap = MockSnapshot::new().with("cpu_online_mask", vec![0i64, 1, 2, 3]);
        assert_eq!(online(&snap).unwrap(), "0-3\n");
    }

    #[test]
    fn present_borrows_online() {
        let snap = MockSnapshot::new().with("cpu_online_mask", vec![0i64, 1]);
        assert_eq!(present(&snap).unwrap(), "0-1\n");
    }

    #[test]
    fn possible_borrows_present_not_online() {
        let snap = MockSnapshot::new()
            .with("cpu_online_mask", vec![0i64])
            .with("cpu_present_mask", vec![0i64, 1, 2]);
        assert_eq!(possible(&snap).unwrap(), "0-2\n");
    }

    #[test]
    fn approximation_carries_marker() {
        let snap = MockSnapshot::new().with("nr_cpu_ids", 4i64);
        let text = online(&snap).unwrap();
        assert!(text.starts_with("# vmrecon: partial"));
        assert!(text.ends_with("0-3\n"));
    }

    #[test]
    fn bare_snapshot_errors_into_stub_path() {
        assert!(matches!(
            online(&MockSnapshot::new()),
            Err(SnapshotError::SymbolNotFound(_))
        ));
    }

    proptest! {
        /// Every value appears in exactly the range covering it, and the
        /// rendering is stable under shuffling/duplication.
        #[test]
        fn range_list_is_order_insensitive(mut vals in proptest::collection::vec(0i64..512, 0..64)) {
            let rendered = range_list(&vals);
            vals.reverse();
            vals.extend(vals.clone());
            prop_assert_eq!(range_list(&vals), rendered);
        }

        #[test]
        fn range_list_roundtrips_membership(vals in proptest::collection::vec(0i64..128, 1..32)) {
            let rendered = range_list(&vals);
            // Expand the rendering back into a set.
            let mut expanded = Vec::new();
            for part in rendered.split(',') {
                match part.split_once('-') {
                    Some((a, b)) => {
                        let (a, b): (i64, i64) = (a.parse().unwrap(), b.parse().unwrap());
                        expanded.extend(a..=b);
                    }
                    None => expanded.push(part.parse().unwrap()),
                }
            }
            let mut want = vals.clone();
            want.sort_unstable();
            want.dedup();
            prop_assert_eq!(expanded, want);
        }
    }
}
