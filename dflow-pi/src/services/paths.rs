//! Package path resolution
//!
//! Pure mapping from a package id to its on-disk locations under one of
//! the intake roots. No filesystem access; relocation is `transition`'s job.

use std::path::{Path, PathBuf};

/// Canonical locations of a package's entries under a given root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePaths {
    /// The package directory itself, `<root>/<id>`
    pub root_dir: PathBuf,
    /// Payload directory, `<root>/<id>/files`
    pub files_dir: PathBuf,
    /// One-line target collection handle, `<root>/<id>/collection`
    pub collection_file: PathBuf,
    /// Importer-produced mapping file, `<root>/<id>/mapfile`
    pub mapfile: PathBuf,
}

impl PackagePaths {
    /// Resolve the package layout for `id` under `root`
    pub fn resolve(root: &Path, id: &str) -> Self {
        let root_dir = root.join(id);
        Self {
            files_dir: root_dir.join("files"),
            collection_file: root_dir.join("collection"),
            mapfile: root_dir.join("mapfile"),
            root_dir,
        }
    }
}
