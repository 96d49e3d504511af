use crate::StateStore;
use anyhow::{Context, Result, anyhow};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// JSON object on local disk, one entry per key.
pub struct FileStateStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStateStore {
    /// Opens the store at `path`, creating the parent directory when needed.
    /// A missing file is an empty store; a file that is not a JSON object of
    /// strings is rejected so a corrupt state never gets silently replaced.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create state directory {}", parent.display()))?;
        }

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice::<BTreeMap<String, String>>(&bytes)
                .with_context(|| format!("parse state file {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(anyhow!(err).context(format!("read state file {}", path.display())));
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let payload = serde_json::to_vec_pretty(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, payload)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replace state file {}", self.path.display()))?;
        Ok(())
    }
}

impl StateStore for FileStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        self.persist(&updated).await?;
        *entries = updated;
        Ok(())
    }
}
