//! Per-task artifact results and stub content.

/// Advisory first line a producer may prepend when content is
/// reconstructed only partially. The engine treats marked and unmarked
/// content identically; the marker is for human readers.
pub const PARTIAL_MARKER: &str = "# vmrecon: partial (best-effort)\n";

/// Stub body emitted when a producer fails. Keeps the declared path
/// present in the output tree with a short diagnostic.
pub fn stub_content(reason: &str) -> String {
    format!("# vmrecon: stub (not reconstructable from snapshot) - {reason}\n")
}

/// Outcome flag for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// Producer ran and returned real content.
    Reconstructed,
    /// Producer failed; content is a stub carrying the failure reason.
    Stub { reason: String },
}

impl ArtifactStatus {
    pub fn is_stub(&self) -> bool {
        matches!(self, ArtifactStatus::Stub { .. })
    }
}

/// One `(path, content)` result of a task. Exactly one exists per task
/// per run, whether the producer succeeded or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactResult {
    pub path: String,
    pub content: String,
    pub status: ArtifactStatus,
}

impl ArtifactResult {
    pub fn reconstructed(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            status: ArtifactStatus::Reconstructed,
        }
    }

    pub fn stub(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            path: path.into(),
            content: stub_content(&reason),
            status: ArtifactStatus::Stub { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_carries_reason_in_content_and_status() {
        let a = ArtifactResult::stub("proc/cmdline", "symbol not found: saved_command_line");
        assert!(a.status.is_stub());
        assert!(a.content.starts_with("# vmrecon: stub"));
        assert!(a.content.contains("saved_command_line"));
        assert!(a.content.ends_with('\n'));
    }
}
