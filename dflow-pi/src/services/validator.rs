//! Pre-import validation
//!
//! Everything checked here runs before the external importer is touched.
//! Only the id syntax check is a client fault; the rest are server-side
//! conditions.

use std::path::Path;

use super::handles;
use super::paths::PackagePaths;

/// A package id is a non-empty string of ASCII digits
pub fn validate_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// A collection handle is `<prefix>/<digits>` with the configured prefix
pub fn validate_collection_handle(handle: &str, prefix: &str) -> bool {
    match handle
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// A package handle is `<digits>/<digits>` as assigned by the importer
pub fn validate_package_handle(handle: &str) -> bool {
    match handle.split_once('/') {
        Some((prefix, suffix)) => {
            !prefix.is_empty()
                && !suffix.is_empty()
                && prefix.bytes().all(|b| b.is_ascii_digit())
                && suffix.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Structural defects found in a staged package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureProblem {
    /// No staging directory at all; nothing to relocate
    StagingMissing,
    /// Staging directory present but `files/` is not a directory
    FilesDirMissing,
    /// Staging directory present but `collection` is absent
    CollectionFileMissing,
}

/// Check the staged package tree before any mutation
pub fn check_structure(pkg: &PackagePaths) -> Result<(), StructureProblem> {
    if !pkg.root_dir.is_dir() {
        return Err(StructureProblem::StagingMissing);
    }
    if !pkg.files_dir.is_dir() {
        return Err(StructureProblem::FilesDirMissing);
    }
    if !pkg.collection_file.is_file() {
        return Err(StructureProblem::CollectionFileMissing);
    }
    Ok(())
}

/// Record of a completed earlier import found under the success root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorImport {
    /// Destination URL recovered from the success copy's mapfile;
    /// `None` when that copy lacks a valid mapfile (inconsistent state)
    pub url: Option<String>,
}

/// Idempotency guard: look for an earlier successful import of `id`
///
/// Returns `Some` when the success root already holds a directory for
/// `id`. The URL is recovered by re-reading that copy's mapfile; the
/// success copy itself is never touched.
pub fn find_prior_import(
    success_root: &Path,
    id: &str,
    marker: &str,
    url_base: &str,
) -> Option<PriorImport> {
    let prior = PackagePaths::resolve(success_root, id);
    if !prior.root_dir.is_dir() {
        return None;
    }
    let url = handles::read_package_handle(&prior.mapfile, marker)
        .filter(|handle| validate_package_handle(handle))
        .map(|handle| format!("{}{}", url_base, handle));
    Some(PriorImport { url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn id_must_be_all_digits() {
        assert!(validate_id("0"));
        assert!(validate_id("4711"));
        assert!(!validate_id(""));
        assert!(!validate_id("47a1"));
        assert!(!validate_id("-1"));
        assert!(!validate_id("4711 "));
        assert!(!validate_id("１２３")); // full-width digits are not ASCII
    }

    #[test]
    fn collection_handle_requires_configured_prefix() {
        assert!(validate_collection_handle("2077/30573", "2077"));
        assert!(!validate_collection_handle("2078/30573", "2077"));
        assert!(!validate_collection_handle("2077/", "2077"));
        assert!(!validate_collection_handle("2077/3057x", "2077"));
        assert!(!validate_collection_handle("2077", "2077"));
        assert!(!validate_collection_handle("", "2077"));
    }

    #[test]
    fn package_handle_is_digits_slash_digits() {
        assert!(validate_package_handle("2077/40275"));
        assert!(!validate_package_handle("2077/"));
        assert!(!validate_package_handle("/40275"));
        assert!(!validate_package_handle("2077-40275"));
        assert!(!validate_package_handle("2077/40a75"));
    }

    #[test]
    fn structure_check_reports_first_missing_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = PackagePaths::resolve(tmp.path(), "17");

        assert_eq!(check_structure(&pkg), Err(StructureProblem::StagingMissing));

        fs::create_dir(&pkg.root_dir).unwrap();
        assert_eq!(check_structure(&pkg), Err(StructureProblem::FilesDirMissing));

        fs::create_dir(&pkg.files_dir).unwrap();
        assert_eq!(
            check_structure(&pkg),
            Err(StructureProblem::CollectionFileMissing)
        );

        fs::write(&pkg.collection_file, "2077/30573\n").unwrap();
        assert_eq!(check_structure(&pkg), Ok(()));
    }

    #[test]
    fn prior_import_recovers_url_from_mapfile() {
        let tmp = tempfile::tempdir().unwrap();
        let prior = PackagePaths::resolve(tmp.path(), "17");
        fs::create_dir(&prior.root_dir).unwrap();
        fs::write(&prior.mapfile, "files 2077/40275\n").unwrap();

        let found = find_prior_import(tmp.path(), "17", "files ", "https://hdl.handle.net/");
        assert_eq!(
            found,
            Some(PriorImport {
                url: Some("https://hdl.handle.net/2077/40275".to_string())
            })
        );
    }

    #[test]
    fn prior_import_without_valid_mapfile_is_inconsistent() {
        let tmp = tempfile::tempdir().unwrap();
        let prior = PackagePaths::resolve(tmp.path(), "17");
        fs::create_dir(&prior.root_dir).unwrap();

        let found = find_prior_import(tmp.path(), "17", "files ", "https://hdl.handle.net/");
        assert_eq!(found, Some(PriorImport { url: None }));
    }

    #[test]
    fn no_prior_import_when_success_root_has_no_copy() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(
            find_prior_import(tmp.path(), "17", "files ", "https://hdl.handle.net/"),
            None
        );
    }
}
