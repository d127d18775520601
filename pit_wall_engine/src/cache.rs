use anyhow::{bail, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Create the session cache directory if needed. Runs once at startup,
/// before the listener is bound.
pub fn init_cache_dir(dir: &Path) -> Result<PathBuf> {
    if dir.exists() && !dir.is_dir() {
        bail!("cache path {} exists and is not a directory", dir.display());
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create cache directory {}", dir.display()))?;
    tracing::info!("session cache at {}", dir.display());
    Ok(dir.to_path_buf())
}
