use std::path::{Path,PathBuf};
use tracing::debug;

/// guards a scratch file for removal on every exit path (success or error) — the Rust expression
/// of the source's `try/except/cleanup/raise` idiom: register the cleanup at creation, let `Drop`
/// run it unconditionally rather than duplicating the cleanup call at every return site.
pub struct ScratchFile(PathBuf);

impl ScratchFile {
    pub fn new (path: impl Into<PathBuf>) -> Self { ScratchFile(path.into()) }

    pub fn path (&self) -> &Path { &self.0 }
}

impl Drop for ScratchFile {
    fn drop (&mut self) {
        if self.0.is_file() {
            if let Err(e) = std::fs::remove_file(&self.0) {
                debug!("failed to remove scratch file {:?}: {e}", self.0);
            }
        }
    }
}
