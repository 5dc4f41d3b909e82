// Author: Dustin Pilgrim
// License: MIT

use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;

pub fn default_log_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".cache").join("bayguard").join("bayguard.log"))
}

// ---------------- single-instance lock ----------------

fn lock_path() -> Result<PathBuf, String> {
    crate::ipc::runtime_dir()
        .map(|dir| dir.join("bayguard").join("bayguard.lock"))
        .map_err(|e| format!("{e} (cannot create instance lock)"))
}

/// Held for the life of the daemon. A second daemon on the same bay would
/// sign the kiosk out twice.
pub fn acquire_single_instance_lock() -> Result<UnixListener, String> {
    let path = lock_path()?;
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match UnixListener::bind(&path) {
        Ok(l) => Ok(l),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => match UnixStream::connect(&path) {
            Ok(_) => Err(format!(
                "bayguard is already running (another instance holds {})",
                path.display()
            )),
            Err(_) => {
                // Stale lock from a crashed run.
                let _ = std::fs::remove_file(&path);
                UnixListener::bind(&path)
                    .map_err(|e| format!("failed to bind instance lock {}: {e}", path.display()))
            }
        },
        Err(e) => Err(format!("failed to bind instance lock {}: {e}", path.display())),
    }
}
