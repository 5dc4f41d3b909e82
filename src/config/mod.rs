// Author: Dustin Pilgrim
// License: MIT

pub mod parser;

use std::path::{Path, PathBuf};

use eyre::Result;

use crate::core::config::ConfigFile;

pub const CONFIG_FILE_NAME: &str = "bayguard.rune";

pub struct LoadedConfig {
    pub path: PathBuf,
    pub cfg: ConfigFile,
    /// False when no file existed and built-in defaults are in use.
    pub from_file: bool,
}

pub fn user_config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".config/bayguard");
    path.push(CONFIG_FILE_NAME);
    Some(path)
}

pub fn system_config_path() -> PathBuf {
    PathBuf::from("/etc/bayguard").join(CONFIG_FILE_NAME)
}

/// First existing of user then system config. Falls back to the user path
/// so a file created later is picked up on `reload`.
pub fn resolve_default_config_path() -> PathBuf {
    let user = user_config_path();

    if let Some(p) = user.as_ref().filter(|p| p.exists()) {
        return p.clone();
    }

    let system = system_config_path();
    if system.exists() {
        return system;
    }

    user.unwrap_or(system)
}

pub fn load_from_path(path: &Path) -> Result<LoadedConfig> {
    if !path.exists() {
        tracing::info!("config: {} not found, using built-in defaults", path.display());
        return Ok(LoadedConfig {
            path: path.to_path_buf(),
            cfg: ConfigFile::default(),
            from_file: false,
        });
    }

    let cfg = parser::load_config(path)?;
    tracing::info!("config: loaded {}", path.display());

    Ok(LoadedConfig {
        path: path.to_path_buf(),
        cfg,
        from_file: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let loaded = load_from_path(&path).unwrap();
        assert!(!loaded.from_file);
        assert_eq!(loaded.cfg, ConfigFile::default());
        assert_eq!(loaded.path, path);
    }

    #[test]
    fn existing_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "bayguard:\n  prompt_after_seconds 60\n  countdown_after_seconds 120\n  sign_out_after_seconds 180\nend\n",
        )
        .unwrap();

        let loaded = load_from_path(&path).unwrap();
        assert!(loaded.from_file);
        assert_eq!(loaded.cfg.idle.prompt_after_ms, 60_000);
    }
}
