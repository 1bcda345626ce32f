use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tabtree_core::config::{TreeConfig, CONFIG_FILE_NAME};

/// Load the config named on the command line, else `./tabtree.toml` when
/// it exists, else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<TreeConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if !local.exists() {
                return Ok(TreeConfig::default());
            }
            local
        }
    };
    read_config(&path)
}

fn read_config(path: &Path) -> Result<TreeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config = TreeConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[diff]\nmax_base_chain = 3\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.diff.max_base_chain, 3);
        assert!(config.diff.prefer_delta);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config"));
    }

    #[test]
    fn test_bad_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[diff]\nprefer_delta = 3\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }
}
