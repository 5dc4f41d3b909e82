// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const DEFAULT_MAX_BYTES: u64 = 2 * 1024 * 1024;
const DEFAULT_KEEP_BACKUPS: u32 = 3;

/// Size-based rotation: `bayguard.log` -> `bayguard.log.1` -> ... -> dropped.
#[derive(Debug, Clone, Copy)]
pub struct LogPolicy {
    pub max_bytes: u64,
    pub keep_backups: u32,
}

impl Default for LogPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            keep_backups: DEFAULT_KEEP_BACKUPS,
        }
    }
}

/// Creates the log directory and rotates an oversized log.
/// Returns true when the existing log has content, so the next run header
/// gets a blank separator line.
pub fn prepare_log_file(path: &Path, policy: LogPolicy) -> io::Result<bool> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let len = match fs::metadata(path) {
        Ok(m) => m.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if len >= policy.max_bytes {
        rotate(path, policy.keep_backups)?;
        return Ok(false);
    }

    Ok(len > 0)
}

pub fn run_header() -> String {
    format!(
        "==================== bayguard {} run start {} (pid={}) ====================",
        env!("CARGO_PKG_VERSION"),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        std::process::id()
    )
}

pub fn write_raw_blank_line(path: &Path) -> io::Result<()> {
    write_raw_line(path, "")
}

/// Appends a line as-is, outside the tracing formatter.
pub fn write_raw_line(path: &Path, line: &str) -> io::Result<()> {
    let mut f = fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "{line}")?;
    f.flush()
}

fn rotate(path: &Path, keep_backups: u32) -> io::Result<()> {
    if keep_backups == 0 {
        return fs::remove_file(path);
    }

    // Shift .N-1 -> .N, oldest first; the oldest backup is overwritten.
    for i in (1..keep_backups).rev() {
        let from = backup_name(path, i);
        if from.exists() {
            fs::rename(&from, backup_name(path, i + 1))?;
        }
    }

    fs::rename(path, backup_name(path, 1))
}

fn backup_name(path: &Path, n: u32) -> PathBuf {
    PathBuf::from(format!("{}.{n}", path.display()))
}
