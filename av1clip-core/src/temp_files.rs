//! Temporary artifact management.
//!
//! Every invocation gets one session directory under the system temp
//! location; the burned-subtitle intermediate and the IVF elementary stream
//! live inside it. The tempfile crate removes the directory (and whatever
//! a failed stage left behind) when the handle drops, on every exit path.

use std::path::{Path, PathBuf};

use tempfile::{Builder as TempFileBuilder, TempDir};

use crate::error::CoreResult;

/// Creates the per-invocation session directory. Auto-cleaned when dropped.
pub fn create_session_dir() -> CoreResult<TempDir> {
    Ok(TempFileBuilder::new().prefix("av1clip-").tempdir()?)
}

/// Returns an artifact path with a random suffix inside `dir`. Does not
/// create the file.
pub fn artifact_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    use rand::distributions::Alphanumeric;
    use rand::{thread_rng, Rng};

    let random_suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    dir.join(format!("{prefix}_{random_suffix}.{extension}"))
}
