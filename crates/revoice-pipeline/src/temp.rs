use std::{
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::TempPath;

/// Suffix for every materialized audio file
pub const AUDIO_SUFFIX: &str = ".wav";

/// A local file owned by exactly one job
///
/// The file is removed when the value is dropped, on every exit path.
/// Cleanup failures are logged and never escalate.
#[derive(Debug)]
pub struct ScopedTempResource {
    path: Option<TempPath>,
}

impl ScopedTempResource {
    /// Write `bytes` to a fresh file in `dir` (the system temp dir when `None`)
    pub fn materialize(bytes: &[u8], dir: Option<&Path>) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("revoice-").suffix(AUDIO_SUFFIX);

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(bytes)?;
        file.flush()?;

        let path = file.into_temp_path();
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "materialized temp file");

        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Remove the file now instead of at scope exit
    pub fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };

        let shown: PathBuf = path.to_path_buf();
        match path.close() {
            Ok(()) => tracing::debug!(path = %shown.display(), "cleaned up temp file"),
            Err(e) => tracing::warn!(path = %shown.display(), error = %e, "temp file cleanup failed"),
        }
    }
}

impl Drop for ScopedTempResource {
    fn drop(&mut self) {
        self.cleanup();
    }
}
