//! Optional TOML configuration file.
//!
//! Everything here has a working default; the file only provides
//! persistent selection preferences so a site does not have to repeat
//! CLI flags on every run. CLI flags layer on top, see [`crate::cli`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Persistent selection preferences.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    #[serde(default)]
    pub skip: Vec<String>,
    #[serde(default)]
    pub enable: Vec<String>,
    #[serde(default)]
    pub experimental: bool,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default output directory when --output is not given.
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub selection: SelectionConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file_parses() {
        let config: Config = toml::from_str(
            r#"
            output = "/var/tmp/vmrecon"

            [selection]
            skip = ["sched-debug"]
            enable = ["sysfs"]
            experimental = true
            "#,
        )
        .unwrap();
        assert_eq!(config.output, Some(PathBuf::from("/var/tmp/vmrecon")));
        assert_eq!(config.selection.skip, ["sched-debug"]);
        assert_eq!(config.selection.enable, ["sysfs"]);
        assert!(config.selection.experimental);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("plugins = []").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/vmrecon.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
