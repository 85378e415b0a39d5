use std::path::Path;

use crate::Result;

/// Replace `path` with `content` via a sibling temp file and rename, so a
/// reader never observes a half-written file.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new(""));
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let tmp_path = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_replaces_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ledger.json");

        atomic_write(&path, b"old")?;
        atomic_write(&path, b"new")?;

        assert_eq!(std::fs::read(&path)?, b"new");
        assert!(!dir.path().join(".ledger.json.tmp").exists());
        Ok(())
    }
}
