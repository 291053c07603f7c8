// Config file handling. Host and token live in `~/.mi/hosts.toml`:
//
//     [default]
//     hostname = "misskey.io"
//     token = "..."

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::auth::Credential;
use crate::error::{Error, Result};

const CONFIG_DIR: &str = ".mi";
const CONFIG_FILE: &str = "hosts.toml";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostsFile {
    #[serde(default)]
    pub default: HostEntry,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostEntry {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub token: String,
}

impl HostEntry {
    /// Both hostname and token are set.
    pub fn is_configured(&self) -> bool {
        !self.hostname.is_empty() && !self.token.is_empty()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.is_configured()
            .then(|| Credential::new(self.hostname.clone(), self.token.clone()))
    }
}

/// Reads and writes the hosts file at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at the default location under the user's home directory.
    pub fn open() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("could not determine home directory".into()))?;
        Ok(Self::at(home.join(CONFIG_DIR).join(CONFIG_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load host and token. Missing keys come back as empty strings; a
    /// missing file is created empty first.
    pub fn load(&self) -> Result<HostEntry> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "config file not found, creating it");
            self.write(&HostsFile::default())?;
            return Ok(HostEntry::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let file: HostsFile = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", self.path.display(), e)))?;
        Ok(file.default)
    }

    pub fn save(&self, hostname: &str, token: &str) -> Result<()> {
        let file = HostsFile {
            default: HostEntry {
                hostname: hostname.to_string(),
                token: token.to_string(),
            },
        };
        self.write(&file)?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    fn write(&self, file: &HostsFile) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            create_private_dir(dir)?;
        }
        let content = toml::to_string(file).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}
