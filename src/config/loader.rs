// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (barrier bounds, alias targets). Use [`load_and_validate`] for
/// that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file yields the defaults.
///
/// The tool is usable without any config file; a present-but-broken file is
/// still an error.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    if !path.as_ref().exists() {
        return Ok(ConfigFile::default());
    }
    load_and_validate(path)
}

/// Helper to resolve a default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Runset.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.store_dir().to_str(), Some(".runset"));
    }

    #[test]
    fn sections_are_read_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Runset.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[store]
dir = "/var/runset"
runset = "nightly"

[submit]
poll_interval_ms = 50
max_wait_ms = 1000

[slurm]
nosubmit_options = ["help"]
"#
        )
        .unwrap();

        let cfg = load_and_validate(&path).unwrap();
        assert_eq!(cfg.store_dir().to_str(), Some("/var/runset"));
        assert_eq!(cfg.runset_name(), Some("nightly"));
        assert_eq!(
            cfg.barrier_policy().poll_interval,
            std::time::Duration::from_millis(50)
        );
        assert!(cfg.nosubmit_options().matches("sbatch --help"));
        assert!(!cfg.nosubmit_options().matches("sbatch --usage"));
    }
}
