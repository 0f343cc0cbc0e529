use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::model::{ClientConfig, EndpointConfig};

const STORE_DIR: &str = ".tally";

/// On-disk home for client configuration (`~/.tally/config.json`). The
/// endpoint is resolved once at startup and treated as immutable for the
/// rest of the run.
#[derive(Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn at(dir: &Path) -> Self {
        Self {
            root: dir.to_path_buf(),
        }
    }

    /// Default location: `$TALLY_HOME` if set, else `$HOME/.tally`.
    pub fn open_default() -> Result<Self> {
        if let Ok(dir) = std::env::var("TALLY_HOME")
            && !dir.is_empty()
        {
            return Ok(Self {
                root: PathBuf::from(dir),
            });
        }
        let home = std::env::var("HOME")
            .map_err(|_| anyhow!("HOME is not set (set TALLY_HOME to choose a config dir)"))?;
        Ok(Self {
            root: Path::new(&home).join(STORE_DIR),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Missing config reads as the empty default; the store is created
    /// lazily on first write.
    pub fn read_config(&self) -> Result<ClientConfig> {
        let path = self.root.join("config.json");
        if !path.exists() {
            return Ok(ClientConfig {
                version: 1,
                endpoint: None,
            });
        }
        let bytes = fs::read(&path).context("read config.json")?;
        serde_json::from_slice(&bytes).context("parse config.json")
    }

    pub fn write_config(&self, cfg: &ClientConfig) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(cfg).context("serialize config")?;
        write_atomic(&self.root.join("config.json"), &bytes).context("write config.json")
    }

    pub fn endpoint(&self) -> Result<Option<EndpointConfig>> {
        Ok(self.read_config()?.endpoint)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
