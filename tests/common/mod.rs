//! Shared fixtures for integration tests.

// Each test binary uses a subset of these helpers.
#![allow(dead_code)]

use std::path::PathBuf;

use once_cell::sync::Lazy;

/// A well-populated snapshot image: every symbol the built-in catalog
/// knows how to read, with three tasks and four CPUs.
pub fn fixture_image() -> serde_json::Value {
    FIXTURE.clone()
}

static FIXTURE: Lazy<serde_json::Value> = Lazy::new(|| {
    serde_json::json!({
        "saved_command_line": "BOOT_IMAGE=/vmlinuz-6.8.0-45-generic ro quiet splash",
        "linux_banner": "Linux version 6.8.0-45-generic (build@host) #45-Ubuntu SMP\n",
        "init_uts_ns": {
            "name": {
                "sysname": "Linux",
                "nodename": "crashed-host",
                "release": "6.8.0-45-generic",
                "version": "#45-Ubuntu SMP",
                "machine": "x86_64",
                "domainname": "(none)",
            }
        },
        "kernel_taints": [],
        "pid_max": 4194304,
        "pid_list": [1, 42, 999],
        "tasks": [
            {
                "pid": 1,
                "comm": "systemd",
                "state": "S",
                "state_value": 1,
                "tgid": 1,
                "ppid": 0,
                "threads": 1,
                "oom_score_adj": 0,
                "cgroup": "/init.scope",
            },
            {"pid": 42, "comm": "kworker/0:1", "kthread": 1, "state": "I"},
            {"pid": 999, "comm": "rsyslogd", "state": "S", "oom_score_adj": -900},
        ],
        "cpu_online_mask": [0, 1, 2, 3],
        "cpu_present_mask": [0, 1, 2, 3],
        "cpu_possible_mask": [0, 1, 2, 3],
        "nr_cpu_ids": 4,
        "PAGE_SHIFT": 12,
        "totalram_pages": 1048576,
        "vm_stat": {
            "nr_free_pages": 262144,
            "nr_file_pages": 131072,
            "nr_slab_reclaimable": 8192,
            "nr_slab_unreclaimable": 4096,
        },
        "irqs": [
            {"irq": 0, "counts": [4, 0, 0, 0], "chip": "IO-APIC", "name": "timer"},
            {"irq": 9, "counts": [1, 2, 0, 0], "chip": "IO-APIC", "name": "acpi"},
        ],
        "softirqs": [
            {"name": "TIMER", "counts": [120, 80, 60, 40]},
            {"name": "RCU", "counts": [200, 150, 90, 30]},
        ],
        "modules": [
            {"name": "ext4", "size": 733184, "refcnt": 2},
            {"name": "xfs", "size": 1232896, "refcnt": 0},
        ],
        "mounts": [
            {"devname": "/dev/sda1", "target": "/", "fstype": "ext4", "readonly": 0},
            {"devname": "proc", "target": "/proc", "fstype": "proc", "readonly": 0},
        ],
        "runqueues": [
            {"cpu": 0, "nr_running": 2, "nr_switches": 91842, "curr_pid": 999, "curr_comm": "rsyslogd"},
            {"cpu": 1, "nr_running": 0, "nr_switches": 40211},
        ],
    })
});

/// Write the fixture image to `dir` and return its path.
pub fn write_image(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("image.json");
    std::fs::write(&path, fixture_image().to_string()).unwrap();
    path
}
