//! Progress reporting passed explicitly into each provisioning step

use std::path::Path;

/// Kind of entry a materializer created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Directory => "directory",
            EntryKind::File => "file",
        }
    }
}

/// Sink for human-readable progress of a run
pub trait Progress: Send + Sync {
    /// A step has started
    fn start(&self, message: &str);

    /// The current step finished successfully
    fn succeed(&self, message: &str);

    /// The current step failed
    fn fail(&self, message: &str);

    /// A non-fatal problem worth telling the user about
    fn warn(&self, message: &str);

    /// A new file or directory appeared in the project
    fn created(&self, kind: EntryKind, path: &Path);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn start(&self, _message: &str) {}
    fn succeed(&self, _message: &str) {}
    fn fail(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn created(&self, _kind: EntryKind, _path: &Path) {}
}
