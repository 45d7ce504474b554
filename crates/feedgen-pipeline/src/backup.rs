//! Best-effort copy of the previously published feed.

use std::path::{Path, PathBuf};

/// Copies `path` to `<path>.backup` when it exists.
///
/// The original stays in place so the published feed never disappears
/// while a run is in progress. Returns the backup path, or `None` when
/// there was nothing to back up.
///
/// # Errors
///
/// Returns the I/O error from the copy.
pub fn backup_previous(path: &Path) -> std::io::Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    let backup = backup_path(path);
    std::fs::copy(path, &backup)?;
    Ok(Some(backup))
}

#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_sits_next_to_the_feed() {
        assert_eq!(
            backup_path(Path::new("/srv/public/google.xml")),
            PathBuf::from("/srv/public/google.xml.backup")
        );
    }

    #[test]
    fn copies_existing_feed_and_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("google.xml");
        std::fs::write(&feed, b"<feed/>").unwrap();

        let backup = backup_previous(&feed).unwrap().unwrap();
        assert_eq!(std::fs::read(&backup).unwrap(), b"<feed/>");
        assert_eq!(std::fs::read(&feed).unwrap(), b"<feed/>");
    }

    #[test]
    fn nothing_to_back_up_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        assert!(backup_previous(&dir.path().join("missing.xml"))
            .unwrap()
            .is_none());
    }
}
