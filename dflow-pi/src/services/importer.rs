//! External import tool invocation and output classification
//!
//! The DSpace command-line importer reports success and failure through
//! specific substrings in its combined stdout/stderr text, not through
//! exit codes. The exit status is therefore never consulted; the captured
//! text is matched against an ordered rule list instead.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

/// Classification of one importer run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportClass {
    /// Importer reported completion
    Success,
    /// Malformed content markup (XML entity error)
    EntityError,
    /// Unknown metadata field in the package metadata
    FieldError,
    /// Target collection handle not resolvable by the importer
    CollectionIdError,
    /// Anything else; the raw output is the only diagnosis
    UnknownImportError,
}

impl std::fmt::Display for ImportClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ImportClass::Success => "import completed",
            ImportClass::EntityError => "import failed: malformed content markup",
            ImportClass::FieldError => "import failed: unknown metadata field",
            ImportClass::CollectionIdError => "import failed: unresolvable collection id",
            ImportClass::UnknownImportError => "import failed: unrecognized importer output",
        };
        f.write_str(msg)
    }
}

/// Ordered substring rules mapping importer output to a classification
///
/// Rules are data, not branches, so they can evolve with the external
/// tool and be unit-tested against captured output fixtures.
#[derive(Debug, Clone)]
pub struct OutputClassifier {
    rules: Vec<(String, ImportClass)>,
}

impl OutputClassifier {
    pub fn new(rules: Vec<(String, ImportClass)>) -> Self {
        Self { rules }
    }

    /// Rule list for the DSpace importer strings observed in production
    pub fn default_rules() -> Vec<(String, ImportClass)> {
        vec![
            (
                "The import has completed".to_string(),
                ImportClass::Success,
            ),
            (
                "The entity name must immediately follow".to_string(),
                ImportClass::EntityError,
            ),
            (
                "ERROR: Metadata field: ".to_string(),
                ImportClass::FieldError,
            ),
            ("Cannot resolve".to_string(), ImportClass::CollectionIdError),
        ]
    }

    /// First containment match wins; no match falls through to
    /// `UnknownImportError`.
    pub fn classify(&self, output: &str) -> ImportClass {
        self.rules
            .iter()
            .find(|(needle, _)| output.contains(needle.as_str()))
            .map(|(_, class)| *class)
            .unwrap_or(ImportClass::UnknownImportError)
    }
}

impl Default for OutputClassifier {
    fn default() -> Self {
        Self::new(Self::default_rules())
    }
}

/// Captured result of one importer run
#[derive(Debug, Clone)]
pub struct RawOutcome {
    pub class: ImportClass,
    /// Combined stdout/stderr text, kept verbatim for diagnosis
    pub output: String,
}

/// Driver for the external DSpace import command
pub struct ImportInvoker {
    bin: PathBuf,
    eperson: String,
    classifier: OutputClassifier,
}

impl ImportInvoker {
    pub fn new(bin: PathBuf, eperson: String, classifier: OutputClassifier) -> Self {
        Self {
            bin,
            eperson,
            classifier,
        }
    }

    /// Run one import and classify its output
    ///
    /// Spawns exactly one child process and blocks (on a blocking task)
    /// until it exits; no timeout and no retry. A spawn failure is folded
    /// into `UnknownImportError` with the error text as output, so the
    /// caller handles it like any other failed run.
    pub async fn invoke(
        &self,
        package_root: &Path,
        collection_handle: &str,
        mapfile: &Path,
    ) -> RawOutcome {
        debug!(
            bin = %self.bin.display(),
            source = %package_root.display(),
            collection = %collection_handle,
            "running external import"
        );

        let result = tokio::task::spawn_blocking({
            let bin = self.bin.clone();
            let eperson = self.eperson.clone();
            let source = package_root.to_path_buf();
            let collection = collection_handle.to_string();
            let mapfile = mapfile.to_path_buf();

            move || {
                Command::new(&bin)
                    .arg("import")
                    .arg("--add")
                    .arg("--eperson")
                    .arg(&eperson)
                    .arg("--source")
                    .arg(&source)
                    .arg("--collection")
                    .arg(&collection)
                    .arg("--mapfile")
                    .arg(&mapfile)
                    .output()
            }
        })
        .await;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(spawn_err)) => {
                return RawOutcome {
                    class: ImportClass::UnknownImportError,
                    output: format!("failed to execute {}: {}", self.bin.display(), spawn_err),
                }
            }
            Err(join_err) => {
                return RawOutcome {
                    class: ImportClass::UnknownImportError,
                    output: format!("import task failed: {}", join_err),
                }
            }
        };

        // Merge the two streams into the one text blob classification
        // operates on; ordering between them is not significant.
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        RawOutcome {
            class: self.classifier.classify(&text),
            output: text,
        }
    }
}
