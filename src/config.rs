use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Task categories offered in insert mode. The first is the default.
  pub categories: Vec<String>,
  /// Data directory override (database, log file, share fallback)
  pub data_dir: Option<PathBuf>,
  /// Theme applied before one has been persisted ("light" / "dark")
  pub default_theme: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      categories: ["genel", "iş", "kişisel", "alışveriş"]
        .iter()
        .map(|s| s.to_string())
        .collect(),
      data_dir: None,
      default_theme: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./jotter.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/jotter/config.yaml
  ///
  /// The app runs unconfigured: when no file is found, defaults apply.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("jotter.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("jotter").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    if config.categories.is_empty() {
      return Err(eyre!(
        "Config file {} lists no categories",
        path.display()
      ));
    }

    Ok(config)
  }

  /// Resolve the data directory: the configured override, else the platform
  /// data dir.
  pub fn data_dir(&self) -> Result<PathBuf> {
    if let Some(dir) = &self.data_dir {
      return Ok(dir.clone());
    }

    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("jotter"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_have_categories() {
    let config = Config::default();
    assert!(!config.categories.is_empty());
    assert_eq!(config.categories[0], "genel");
  }

  #[test]
  fn test_parses_partial_yaml() {
    let config: Config = serde_yaml::from_str("categories: [work, home]").unwrap();
    assert_eq!(config.categories, vec!["work", "home"]);
    assert_eq!(config.data_dir, None);
  }

  #[test]
  fn test_explicit_missing_path_errors() {
    let err = Config::load(Some(Path::new("/no/such/jotter.yaml")));
    assert!(err.is_err());
  }

  #[test]
  fn test_configured_data_dir_wins() {
    let config = Config {
      data_dir: Some(PathBuf::from("/tmp/jotter-test")),
      ..Config::default()
    };
    assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/jotter-test"));
  }
}
