use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IvyConfig {
    pub database: Option<String>,
    pub list_limit: Option<usize>,
    pub search_limit: Option<usize>,
}

impl IvyConfig {
    /// Config written by `ivy init`
    pub fn with_database(path: &Path) -> Self {
        Self {
            database: Some(path.to_string_lossy().to_string()),
            list_limit: Some(DEFAULT_LIST_LIMIT),
            search_limit: Some(DEFAULT_SEARCH_LIMIT),
        }
    }

    pub fn list_limit(&self) -> usize {
        self.list_limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("ivy.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("ivy.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<IvyConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: IvyConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &IvyConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
