//! Package intake workflow
//!
//! # State Progression
//! Received → Validated → StructureChecked → Imported → Relocated → Logged → Responded
//!
//! Two terminal failure exits: validation failure (no filesystem mutation
//! beyond logging) and intake failure (package relocated to the failure
//! root, logged). Every failure is terminal for the request; there is no
//! retry transition. A package in the failure root needs operator
//! re-submission as a fresh staging entry.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::IntakeConfig;
use crate::services::{
    audit::AuditLog,
    handles,
    importer::{ImportClass, ImportInvoker, OutputClassifier},
    paths::PackagePaths,
    transition,
    validator::{self, StructureProblem},
};

/// Terminal error taxonomy of one intake run
///
/// Each variant records whether the package was relocated; the workflow
/// performs the move and the error-log append at the point of detection,
/// then halts with the variant.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Client fault; nothing on disk is touched
    #[error("invalid package id")]
    InvalidId,

    /// Another request for the same id currently holds the claim
    #[error("import already in progress for this package")]
    AlreadyInProgress,

    /// Idempotency guard: a success-root copy already exists
    #[error("package was already imported")]
    AlreadyImported { url: Option<String> },

    /// No staging directory for this id; nothing to relocate
    #[error("no staged package for this id")]
    NotFound,

    /// Staging directory lacks the `files` directory (moved to failure)
    #[error("missing files dir")]
    MissingFilesDir,

    /// Staging directory lacks the `collection` file (moved to failure)
    #[error("missing collection file")]
    MissingCollectionFile,

    /// Collection handle malformed or unreadable (moved to failure)
    #[error("malformed collection handle")]
    BadCollectionHandle { detail: String },

    /// External importer run classified as failed (moved to failure)
    #[error("{class}")]
    ImportFailed { class: ImportClass, output: String },

    /// Mapfile missing or yielded no handle after import (moved to failure)
    #[error("mapfile missing or unparsable after import")]
    BadMapfile,

    /// Filesystem failure inside the workflow itself
    #[error("intake io failure: {0}")]
    Io(#[from] std::io::Error),
}

impl IntakeError {
    /// Stable machine-readable code for responses and log analysis
    pub fn code(&self) -> &'static str {
        match self {
            IntakeError::InvalidId => "INVALID_ID",
            IntakeError::AlreadyInProgress => "ALREADY_IN_PROGRESS",
            IntakeError::AlreadyImported { .. } => "ALREADY_IMPORTED",
            IntakeError::NotFound => "NOT_FOUND",
            IntakeError::MissingFilesDir => "MISSING_FILES_DIR",
            IntakeError::MissingCollectionFile => "MISSING_COLLECTION_FILE",
            IntakeError::BadCollectionHandle { .. } => "BAD_COLLECTION_HANDLE",
            IntakeError::ImportFailed { .. } => "IMPORT_FAILED",
            IntakeError::BadMapfile => "BAD_MAPFILE",
            IntakeError::Io(_) => "IO_ERROR",
        }
    }

    /// Diagnostic payload carried into the error log and the response
    pub fn extra_info(&self) -> String {
        match self {
            IntakeError::AlreadyImported { url: Some(url) } => url.clone(),
            IntakeError::AlreadyImported { url: None } => {
                "previous import is in an inconsistent state".to_string()
            }
            IntakeError::BadCollectionHandle { detail } => detail.clone(),
            IntakeError::ImportFailed { output, .. } => output.clone(),
            IntakeError::Io(err) => err.to_string(),
            _ => String::new(),
        }
    }
}

/// Success payload of one intake run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReceipt {
    pub id: String,
    pub url: String,
}

/// In-process registry of package ids with an intake currently running
///
/// Closes the duplicate-submission race: the claim is taken before the
/// first filesystem check and held (RAII) until the run finishes, so two
/// concurrent requests for one id cannot both pass the idempotency guard.
#[derive(Clone, Default)]
pub struct ClaimRegistry {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id`, or `None` if another run already holds it
    pub fn claim(&self, id: &str) -> Option<Claim> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(id.to_string()) {
            return None;
        }
        Some(Claim {
            registry: Arc::clone(&self.in_flight),
            id: id.to_string(),
        })
    }
}

/// RAII guard releasing a claimed id on drop
pub struct Claim {
    registry: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for Claim {
    fn drop(&mut self) {
        let mut in_flight = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.remove(&self.id);
    }
}

/// End-to-end intake orchestrator
pub struct IntakeWorkflow {
    config: Arc<IntakeConfig>,
    invoker: ImportInvoker,
    audit: AuditLog,
    claims: ClaimRegistry,
}

impl IntakeWorkflow {
    pub fn new(config: Arc<IntakeConfig>) -> Self {
        let invoker = ImportInvoker::new(
            config.dspace_bin.clone(),
            config.eperson.clone(),
            OutputClassifier::default(),
        );
        let audit = AuditLog::new(config.handle_log_path(), config.error_log_path());
        Self {
            config,
            invoker,
            audit,
            claims: ClaimRegistry::new(),
        }
    }

    /// Run one package through the intake state machine
    ///
    /// Exactly-once successful import per id: the per-id claim serializes
    /// concurrent requests, the success-root check rejects re-submission,
    /// and the final rename is the single success-side mutation.
    pub async fn run(&self, id: &str) -> Result<ImportReceipt, IntakeError> {
        // Step 1: id syntax. The only client-fault exit.
        if !validator::validate_id(id) {
            return Err(self.fail(id, IntakeError::InvalidId));
        }

        // Claim the id for the rest of the run.
        let _claim = match self.claims.claim(id) {
            Some(claim) => claim,
            None => return Err(self.fail(id, IntakeError::AlreadyInProgress)),
        };

        let staging_root = self.config.staging_root();
        let pkg = PackagePaths::resolve(&staging_root, id);

        // Step 2: idempotency guard, before any mutation. The existing
        // success copy is only read, never touched.
        if let Some(prior) = validator::find_prior_import(
            &self.config.success_root(),
            id,
            &self.config.mapfile_marker,
            &self.config.url_base,
        ) {
            return Err(self.fail(id, IntakeError::AlreadyImported { url: prior.url }));
        }

        // Steps 3-4: staging structure. A missing staging directory means
        // there is nothing to relocate; missing entries inside it do move.
        if let Err(problem) = validator::check_structure(&pkg) {
            return Err(match problem {
                StructureProblem::StagingMissing => self.fail(id, IntakeError::NotFound),
                StructureProblem::FilesDirMissing => {
                    self.fail_and_relocate(id, IntakeError::MissingFilesDir)
                }
                StructureProblem::CollectionFileMissing => {
                    self.fail_and_relocate(id, IntakeError::MissingCollectionFile)
                }
            });
        }

        // Step 5: collection handle.
        let collection_handle = match handles::read_collection_handle(&pkg.collection_file) {
            Ok(handle) => handle,
            Err(err) => {
                return Err(self.fail_and_relocate(
                    id,
                    IntakeError::BadCollectionHandle {
                        detail: err.to_string(),
                    },
                ))
            }
        };
        if !validator::validate_collection_handle(&collection_handle, &self.config.handle_prefix) {
            return Err(self.fail_and_relocate(
                id,
                IntakeError::BadCollectionHandle {
                    detail: collection_handle,
                },
            ));
        }

        // Step 6: external import. Blocking call, no timeout; only the
        // classified output text decides the outcome.
        let outcome = self
            .invoker
            .invoke(&pkg.root_dir, &collection_handle, &pkg.mapfile)
            .await;
        if outcome.class != ImportClass::Success {
            return Err(self.fail_and_relocate(
                id,
                IntakeError::ImportFailed {
                    class: outcome.class,
                    output: outcome.output,
                },
            ));
        }

        // Step 7: post-import mapfile.
        let package_handle = handles::read_package_handle(&pkg.mapfile, &self.config.mapfile_marker)
            .filter(|handle| validator::validate_package_handle(handle));
        let package_handle = match package_handle {
            Some(handle) => handle,
            None => return Err(self.fail_and_relocate(id, IntakeError::BadMapfile)),
        };

        // Step 8: the single success-side mutation.
        if let Err(err) = transition::move_package(id, &staging_root, &self.config.success_root()) {
            return Err(self.fail(id, IntakeError::Io(err)));
        }

        // Steps 9-11: compose URL, record, respond.
        let url = format!("{}{}", self.config.url_base, package_handle);
        if let Err(err) = self.audit.append_success(id, &url) {
            // The package is imported and relocated; a dead handle log is
            // an operator problem, not grounds to fail the request.
            warn!(package_id = %id, error = %err, "handle log append failed");
        }

        info!(package_id = %id, url = %url, "package imported");
        Ok(ImportReceipt {
            id: id.to_string(),
            url,
        })
    }

    /// Terminal failure without relocation
    fn fail(&self, id: &str, err: IntakeError) -> IntakeError {
        self.log_failure(id, &err);
        err
    }

    /// Terminal failure after moving the staging copy to the failure root
    fn fail_and_relocate(&self, id: &str, err: IntakeError) -> IntakeError {
        if let Err(move_err) =
            transition::move_package(id, &self.config.staging_root(), &self.config.failure_root())
        {
            warn!(
                package_id = %id,
                error = %move_err,
                "could not relocate package to failure root"
            );
        }
        self.log_failure(id, &err);
        err
    }

    fn log_failure(&self, id: &str, err: &IntakeError) {
        if let Err(log_err) = self.audit.append_error(id, &err.to_string(), &err.extra_info()) {
            warn!(package_id = %id, error = %log_err, "error log append failed");
        }
        warn!(package_id = %id, code = err.code(), error = %err, "package intake failed");
    }
}
