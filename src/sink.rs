//! Output sinks: durable destinations for ordered (path, content)
//! results.
//!
//! Paths are forward-slash relative strings; a sink guarantees each
//! path lands exactly once in the persisted tree. The registry already
//! prevents duplicate declarations, so a duplicate arriving here is a
//! bug worth failing loudly on rather than silently overwriting.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Sink-side write failure.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("path '{0}' written twice")]
    DuplicatePath(String),

    #[error("refusing unsafe path '{0}'")]
    UnsafePath(String),

    #[error("cannot write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Durable destination for artifact results.
pub trait OutputSink {
    fn write(&mut self, path: &str, content: &str) -> Result<(), SinkError>;
}

/// Writes artifacts under a root directory, creating parents as needed.
#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
    written: HashSet<String>,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: HashSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject absolute paths and any traversal components.
    fn resolve(&self, path: &str) -> Result<PathBuf, SinkError> {
        let rel = Path::new(path);
        let safe = rel.components().all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !safe {
            return Err(SinkError::UnsafePath(path.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

impl OutputSink for DirectorySink {
    fn write(&mut self, path: &str, content: &str) -> Result<(), SinkError> {
        if !self.written.insert(path.to_string()) {
            return Err(SinkError::DuplicatePath(path.to_string()));
        }
        let dest = self.resolve(path)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| SinkError::Io {
                path: path.to_string(),
                source,
            })?;
        }
        fs::write(&dest, content).map_err(|source| SinkError::Io {
            path: path.to_string(),
            source,
        })?;
        tracing::debug!(path = %path, bytes = content.len(), "wrote artifact");
        Ok(())
    }
}

/// In-memory sink for tests, preserving write order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Vec<(String, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|(p, _)| p.as_str()).collect()
    }

    pub fn content(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.as_str())
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, path: &str, content: &str) -> Result<(), SinkError> {
        if self.entries.iter().any(|(p, _)| p == path) {
            return Err(SinkError::DuplicatePath(path.to_string()));
        }
        self.entries.push((path.to_string(), content.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_sink_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        sink.write("proc/1/status", "Pid:\t1\n").unwrap();
        let text = fs::read_to_string(dir.path().join("proc/1/status")).unwrap();
        assert_eq!(text, "Pid:\t1\n");
    }

    #[test]
    fn directory_sink_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        sink.write("proc/cmdline", "a\n").unwrap();
        assert!(matches!(
            sink.write("proc/cmdline", "b\n"),
            Err(SinkError::DuplicatePath(_))
        ));
    }

    #[test]
    fn directory_sink_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        assert!(matches!(
            sink.write("../escape", "x"),
            Err(SinkError::UnsafePath(_))
        ));
        assert!(matches!(
            sink.write("/etc/passwd", "x"),
            Err(SinkError::UnsafePath(_))
        ));
        assert!(matches!(sink.write("", "x"), Err(SinkError::UnsafePath(_))));
    }

    #[test]
    fn memory_sink_preserves_order() {
        let mut sink = MemorySink::new();
        sink.write("b", "2").unwrap();
        sink.write("a", "1").unwrap();
        assert_eq!(sink.paths(), ["b", "a"]);
        assert_eq!(sink.content("a"), Some("1"));
    }
}
