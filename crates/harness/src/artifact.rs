//! Artifact writer - maps capture steps to deterministic output paths.
//!
//! Path layout is `<root>/<group>/<NN>-<step>.png` with the ordinal fixed at
//! declaration time, so re-ordering steps is an authoring decision and never
//! implicit renumbering. Re-runs overwrite in place (idempotent).

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::HarnessResult;

pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic path for a capture step.
    pub fn path_for(&self, group: &str, ordinal: u32, step: &str) -> PathBuf {
        self.root.join(group).join(format!("{ordinal:02}-{step}.png"))
    }

    /// Persist screenshot bytes, creating directories as needed and
    /// silently overwriting any previous run's artifact.
    pub fn write(
        &self,
        group: &str,
        ordinal: u32,
        step: &str,
        bytes: &[u8],
    ) -> HarnessResult<PathBuf> {
        let path = self.path_for(group, ordinal, step);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;

        let digest = Sha256::digest(bytes);
        debug!(
            path = %path.display(),
            size = bytes.len(),
            sha256 = %hex::encode(digest),
            "artifact written"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_zero_padded_and_deterministic() {
        let writer = ArtifactWriter::new("/out");
        assert_eq!(
            writer.path_for("desktop", 3, "patients-empty"),
            PathBuf::from("/out/desktop/03-patients-empty.png")
        );
        assert_eq!(
            writer.path_for("features", 12, "bed-board"),
            PathBuf::from("/out/features/12-bed-board.png")
        );
        // Same inputs, same path.
        assert_eq!(
            writer.path_for("desktop", 3, "patients-empty"),
            writer.path_for("desktop", 3, "patients-empty")
        );
    }

    #[test]
    fn write_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let path = writer.write("mobile", 1, "dashboard", b"png-bytes").unwrap();
        assert!(path.exists());
        assert_eq!(path, dir.path().join("mobile").join("01-dashboard.png"));
        assert_eq!(fs::read(&path).unwrap(), b"png-bytes");
    }

    #[test]
    fn rewrite_overwrites_silently() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let first = writer.write("desktop", 2, "step", b"first").unwrap();
        let second = writer.write("desktop", 2, "step", b"second").unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"second");

        // Only one file in the group directory.
        let entries: Vec<_> = fs::read_dir(dir.path().join("desktop"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
