//! Handle extraction from package marker files
//!
//! Two small readers, no interpretation beyond trimming and marker
//! stripping. Format validation is the validator's responsibility.

use std::fs;
use std::io;
use std::path::Path;

/// Read the pre-existing collection handle file
///
/// Returns the whole file content with trailing whitespace/newline
/// removed. The caller validates the `<prefix>/<digits>` shape.
pub fn read_collection_handle(path: &Path) -> io::Result<String> {
    let content = fs::read_to_string(path)?;
    Ok(content.trim_end().to_string())
}

/// Read the package handle from an importer-produced mapfile
///
/// Scans line by line for the first line opening with the literal
/// `marker`, strips the marker and trailing whitespace, and returns the
/// remainder. Returns `None` if the file cannot be read or no line
/// matches; the caller decides how to classify that.
pub fn read_package_handle(path: &Path, marker: &str) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    content
        .lines()
        .find_map(|line| line.strip_prefix(marker))
        .map(|rest| rest.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collection_handle_is_trimmed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("collection");
        fs::write(&path, "2077/30573\n").unwrap();
        assert_eq!(read_collection_handle(&path).unwrap(), "2077/30573");
    }

    #[test]
    fn collection_handle_missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_collection_handle(&tmp.path().join("collection")).is_err());
    }

    #[test]
    fn package_handle_first_matching_line_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mapfile");
        fs::write(&path, "noise line\nfiles 2077/40275\nfiles 2077/99999\n").unwrap();
        assert_eq!(
            read_package_handle(&path, "files ").as_deref(),
            Some("2077/40275")
        );
    }

    #[test]
    fn package_handle_absent_when_no_line_matches() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mapfile");
        fs::write(&path, "nothing useful here\n").unwrap();
        assert_eq!(read_package_handle(&path, "files "), None);
    }

    #[test]
    fn package_handle_absent_when_file_unreadable() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(read_package_handle(&tmp.path().join("mapfile"), "files "), None);
    }
}
