// sieve-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Writes `content` to `path` through a temporary file in the same directory,
/// then renames it into place. Readers see the old file or the new one, never
/// a partial write. Missing parent directories are created.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Removes a previous output (file or directory). Absent paths are fine.
pub fn remove_output(path: &Path) -> Result<(), InfrastructureError> {
    if path.is_dir() {
        debug!(path = ?path, "Removing previous output directory");
        std::fs::remove_dir_all(path)?;
    } else if path.exists() {
        debug!(path = ?path, "Removing previous output file");
        std::fs::remove_file(path)?;
    }
    Ok(())
}

/// Moves a staged output (file or directory) over `target`, removing whatever
/// was there. When nothing was staged, `target` is only removed.
pub fn promote_output(staged: &Path, target: &Path) -> Result<(), InfrastructureError> {
    remove_output(target)?;
    if !staged.exists() {
        return Ok(());
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    debug!(from = ?staged, to = ?target, "Promoting staged output");
    std::fs::rename(staged, target)?;
    Ok(())
}
