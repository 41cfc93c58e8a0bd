//! Package relocation between intake roots
//!
//! The single mutator of package location. One `rename` moves the whole
//! package tree, so a package is never split across roots. Callers must
//! hold the per-id claim; rename itself gives no cross-caller exclusion.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

/// Move the package directory for `id` from one root to another
///
/// Returns the new package root on success. Fails if the source does not
/// exist or the destination root is on another filesystem (rename only;
/// a copy fallback would break the no-partial-state guarantee).
pub fn move_package(id: &str, from_root: &Path, to_root: &Path) -> io::Result<PathBuf> {
    let from = from_root.join(id);
    let to = to_root.join(id);
    fs::rename(&from, &to)?;
    info!(
        package_id = %id,
        from = %from.display(),
        to = %to.display(),
        "package relocated"
    );
    Ok(to)
}
