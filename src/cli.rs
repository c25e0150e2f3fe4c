//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::report::SelectionPolicy;

/// Reconstruct proc/sys diagnostic trees from a kernel memory snapshot.
#[derive(Debug, Parser)]
#[command(name = "vmrecon", version, about)]
pub struct Cli {
    /// Snapshot image file (JSON symbol table)
    #[arg(long, value_name = "FILE", required_unless_present = "list_groups")]
    pub snapshot: Option<PathBuf>,

    /// Output directory for the reconstructed tree
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Run only these groups (repeatable)
    #[arg(long, value_name = "GROUP")]
    pub only: Vec<String>,

    /// Skip these groups (repeatable)
    #[arg(long, value_name = "GROUP")]
    pub skip: Vec<String>,

    /// Enable these experimental or default-disabled groups (repeatable)
    #[arg(long, value_name = "GROUP")]
    pub enable: Vec<String>,

    /// Allow all experimental groups
    #[arg(long)]
    pub experimental: bool,

    /// Optional TOML config file with selection defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List available groups and exit
    #[arg(long)]
    pub list_groups: bool,
}

impl Cli {
    /// Merge CLI flags over config-file defaults into the selection
    /// policy the core consumes. CLI values win; list-valued flags
    /// extend the config rather than replacing it, matching how skips
    /// accumulate across layers.
    pub fn selection_policy(&self, config: &Config) -> SelectionPolicy {
        let mut skip = config.selection.skip.clone();
        skip.extend(self.skip.iter().cloned());
        let mut enable = config.selection.enable.clone();
        enable.extend(self.enable.iter().cloned());

        SelectionPolicy {
            only: self.only.clone(),
            skip,
            enable,
            experimental: self.experimental || config.selection.experimental,
        }
    }

    /// Effective output directory: explicit flag, else config, else the
    /// built-in default.
    pub fn output_dir(&self, config: &Config) -> PathBuf {
        self.output
            .clone()
            .or_else(|| config.output.clone())
            .unwrap_or_else(|| PathBuf::from("vmrecon-out"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_merge_over_config() {
        let cli = Cli::parse_from([
            "vmrecon",
            "--snapshot",
            "snap.json",
            "--skip",
            "sysfs",
            "--experimental",
        ]);
        let mut config = Config::default();
        config.selection.skip = vec!["procfs".to_string()];

        let policy = cli.selection_policy(&config);
        assert_eq!(policy.skip, ["procfs", "sysfs"]);
        assert!(policy.experimental);
        assert!(policy.only.is_empty());
    }

    #[test]
    fn repeated_group_flags_accumulate() {
        let cli = Cli::parse_from([
            "vmrecon",
            "--snapshot",
            "s.json",
            "--only",
            "procfs",
            "--only",
            "commands",
        ]);
        let policy = cli.selection_policy(&Config::default());
        assert_eq!(policy.only, ["procfs", "commands"]);
    }

    #[test]
    fn list_groups_requires_no_snapshot() {
        assert!(Cli::try_parse_from(["vmrecon", "--list-groups"]).is_ok());
        assert!(Cli::try_parse_from(["vmrecon"]).is_err());
    }

    #[test]
    fn output_dir_prefers_flag_then_config_then_default() {
        let cli = Cli::parse_from(["vmrecon", "--snapshot", "s.json"]);
        assert_eq!(cli.output_dir(&Config::default()), PathBuf::from("vmrecon-out"));

        let mut config = Config::default();
        config.output = Some(PathBuf::from("/tmp/report"));
        assert_eq!(cli.output_dir(&config), PathBuf::from("/tmp/report"));

        let cli = Cli::parse_from(["vmrecon", "--snapshot", "s.json", "--output", "custom"]);
        assert_eq!(cli.output_dir(&config), PathBuf::from("custom"));
    }

    #[test]
    fn explicit_output_matching_default_still_beats_config() {
        let cli = Cli::parse_from(["vmrecon", "--snapshot", "s.json", "--output", "vmrecon-out"]);
        let mut config = Config::default();
        config.output = Some(PathBuf::from("/tmp/report"));
        assert_eq!(cli.output_dir(&config), PathBuf::from("vmrecon-out"));
    }
}
