//! Configuration for dflow-pi
//!
//! One immutable value built at startup and injected into the workflow.
//! The workflow never reads the process environment itself, which keeps
//! the intake core testable without environment mutation.

use std::io;
use std::path::{Path, PathBuf};

/// Intake service configuration
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Folder holding the `staging/`, `success/`, `failure/` and `logs/` trees
    pub data_root: PathBuf,
    /// External DSpace command-line binary driving the actual import
    pub dspace_bin: PathBuf,
    /// E-person (acting principal) the import runs as
    pub eperson: String,
    /// Base for composed result URLs, e.g. `https://hdl.handle.net/`
    pub url_base: String,
    /// Handle prefix a valid collection handle must carry, e.g. `2077`
    pub handle_prefix: String,
    /// Literal marker opening the mapfile result line, e.g. `files `
    pub mapfile_marker: String,
}

impl IntakeConfig {
    /// Root holding packages awaiting import
    pub fn staging_root(&self) -> PathBuf {
        self.data_root.join("staging")
    }

    /// Root holding successfully imported packages
    pub fn success_root(&self) -> PathBuf {
        self.data_root.join("success")
    }

    /// Root holding packages whose intake failed
    pub fn failure_root(&self) -> PathBuf {
        self.data_root.join("failure")
    }

    /// Append-only log of successful imports
    pub fn handle_log_path(&self) -> PathBuf {
        self.data_root.join("logs").join("handles.log")
    }

    /// Append-only log of failed intake attempts
    pub fn error_log_path(&self) -> PathBuf {
        self.data_root.join("logs").join("error.log")
    }

    /// Create the three package roots and the log directory if missing
    pub fn ensure_tree(&self) -> io::Result<()> {
        for dir in [
            self.staging_root(),
            self.success_root(),
            self.failure_root(),
            self.data_root.join("logs"),
        ] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

impl IntakeConfig {
    /// Configuration for tests: everything under one temp folder,
    /// importer binary supplied by the caller.
    pub fn for_test(data_root: &Path, dspace_bin: &Path) -> Self {
        Self {
            data_root: data_root.to_path_buf(),
            dspace_bin: dspace_bin.to_path_buf(),
            eperson: "importer@example.org".to_string(),
            url_base: "https://hdl.handle.net/".to_string(),
            handle_prefix: "2077".to_string(),
            mapfile_marker: "files ".to_string(),
        }
    }
}
