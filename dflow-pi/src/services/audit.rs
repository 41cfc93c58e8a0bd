//! Append-only audit trails
//!
//! Two line-oriented logs: one record per successful import, one per
//! failed attempt. Records are never rewritten; concurrent writers rely
//! on the platform's atomic append guarantee for small writes.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Writer for the handle and error logs
pub struct AuditLog {
    handle_log: PathBuf,
    error_log: PathBuf,
}

impl AuditLog {
    pub fn new(handle_log: PathBuf, error_log: PathBuf) -> Self {
        Self {
            handle_log,
            error_log,
        }
    }

    /// Append one success record to the handle log
    pub fn append_success(&self, id: &str, url: &str) -> io::Result<()> {
        self.append_success_at(id, url, Utc::now())
    }

    /// Append one error record to the error log
    pub fn append_error(&self, id: &str, message: &str, extra_info: &str) -> io::Result<()> {
        self.append_error_at(id, message, extra_info, Utc::now())
    }

    pub fn append_success_at(&self, id: &str, url: &str, at: DateTime<Utc>) -> io::Result<()> {
        append_line(
            &self.handle_log,
            &format!("time: {}, dflow_id: {}, url: {}", at.to_rfc3339(), id, url),
        )
    }

    pub fn append_error_at(
        &self,
        id: &str,
        message: &str,
        extra_info: &str,
        at: DateTime<Utc>,
    ) -> io::Result<()> {
        // Importer output spans lines; the record must stay one line.
        let extra_info = extra_info.trim_end().replace('\n', "\\n");
        append_line(
            &self.error_log,
            &format!(
                "time: {}, dflow_id: {}, msg: {}, extra_info: {}",
                at.to_rfc3339(),
                id,
                message,
                extra_info
            ),
        )
    }
}

fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    writeln!(file, "{}", line)
}
