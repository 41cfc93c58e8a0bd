//! Shared fixtures for dflow-pi integration tests
//!
//! Builds a complete intake tree under a tempdir and stands in for the
//! external DSpace binary with a small shell stub.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use dflow_pi::config::IntakeConfig;
use dflow_pi::workflow::IntakeWorkflow;
use dflow_pi::AppState;

/// Stub importer: writes a mapfile and reports completion
pub const SUCCESS_STUB: &str = r#"#!/bin/sh
while [ "$#" -gt 0 ]; do
  if [ "$1" = "--mapfile" ]; then
    MAPFILE="$2"
  fi
  shift
done
printf 'files 2077/40275\n' > "$MAPFILE"
printf 'The import has completed\n'
"#;

/// Stub importer: reports completion but never writes a mapfile
pub const NO_MAPFILE_STUB: &str = r#"#!/bin/sh
printf 'The import has completed\n'
"#;

/// Stub importer: takes a second before completing, for claim-contention tests
pub const SLOW_SUCCESS_STUB: &str = r#"#!/bin/sh
while [ "$#" -gt 0 ]; do
  if [ "$1" = "--mapfile" ]; then
    MAPFILE="$2"
  fi
  shift
done
sleep 1
printf 'files 2077/40275\n' > "$MAPFILE"
printf 'The import has completed\n'
"#;

/// Stub importer: rejects an unknown metadata field
pub const FIELD_ERROR_STUB: &str = r#"#!/bin/sh
printf 'ERROR: Metadata field: dc.contributor.x not found\n' >&2
exit 1
"#;

/// Stub importer: output matching no classification rule
pub const OPAQUE_STUB: &str = r#"#!/bin/sh
printf 'java.lang.OutOfMemoryError: GC overhead limit exceeded\n' >&2
exit 1
"#;

pub struct TestEnv {
    pub tmp: TempDir,
    pub config: Arc<IntakeConfig>,
    pub workflow: IntakeWorkflow,
}

impl TestEnv {
    /// Build an intake tree with the given stub script as the importer
    pub fn new(stub_script: &str) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tmp.path().join("dspace-stub");
        fs::write(&bin, stub_script).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let config = Arc::new(IntakeConfig::for_test(tmp.path(), &bin));
        config.ensure_tree().unwrap();
        let workflow = IntakeWorkflow::new(Arc::clone(&config));
        Self {
            tmp,
            config,
            workflow,
        }
    }

    /// Router wired to the same intake tree
    pub fn app(&self) -> axum::Router {
        dflow_pi::build_router(AppState::new(Arc::clone(&self.config)))
    }

    /// Place a well-formed package in the staging root
    pub fn stage_package(&self, id: &str, collection: &str) {
        let root = self.config.staging_root().join(id);
        fs::create_dir_all(root.join("files")).unwrap();
        fs::write(root.join("files").join("metadata.xml"), "<dublin_core/>").unwrap();
        fs::write(root.join("collection"), format!("{}\n", collection)).unwrap();
    }

    /// Place an already-imported copy in the success root
    pub fn place_prior_import(&self, id: &str, mapfile_line: Option<&str>) {
        let root = self.config.success_root().join(id);
        fs::create_dir_all(root.join("files")).unwrap();
        if let Some(line) = mapfile_line {
            fs::write(root.join("mapfile"), format!("{}\n", line)).unwrap();
        }
    }

    pub fn error_log_lines(&self) -> Vec<String> {
        read_lines(&self.config.error_log_path())
    }

    pub fn handle_log_lines(&self) -> Vec<String> {
        read_lines(&self.config.handle_log_path())
    }

    pub fn in_staging(&self, id: &str) -> bool {
        self.config.staging_root().join(id).is_dir()
    }

    pub fn in_success(&self, id: &str) -> bool {
        self.config.success_root().join(id).is_dir()
    }

    pub fn in_failure(&self, id: &str) -> bool {
        self.config.failure_root().join(id).is_dir()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().map(|l| l.to_string()).collect(),
        Err(_) => Vec::new(),
    }
}
