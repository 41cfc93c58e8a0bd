//! Service modules for the package intake workflow

pub mod audit;
pub mod handles;
pub mod importer;
pub mod paths;
pub mod transition;
pub mod validator;

pub use audit::AuditLog;
pub use importer::{ImportClass, ImportInvoker, OutputClassifier, RawOutcome};
pub use paths::PackagePaths;
pub use validator::{PriorImport, StructureProblem};
