use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::{Result, ScriptboxError};
use crate::workspace::policy::FilenamePolicy;

/// Trait for workspace file storage.
///
/// The store is the only component that touches persisted state; everything
/// else goes through it. All operations run the filename policy before any
/// storage access, so a rejected name never causes a mutation.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// List stored file names in lexicographic order.
    async fn list(&self) -> Result<Vec<String>>;

    /// Store a new file. Fails if the name is already taken.
    async fn create(&self, name: &str, content: &str) -> Result<()>;

    /// Read a file's content.
    async fn read(&self, name: &str) -> Result<String>;

    /// Overwrite an existing file. Fails if the name is unknown.
    async fn update(&self, name: &str, content: &str) -> Result<()>;

    /// Remove a file.
    async fn delete(&self, name: &str) -> Result<()>;
}

/// Content checks shared by every store: non-empty after trimming, and
/// within the configured size cap.
fn check_content(content: &str, max_bytes: usize) -> Result<()> {
    if content.trim().is_empty() {
        return Err(ScriptboxError::EmptyContent);
    }
    if content.len() > max_bytes {
        return Err(ScriptboxError::TooLarge {
            size: content.len(),
            max: max_bytes,
        });
    }
    Ok(())
}

/// Directory-backed workspace store.
///
/// One flat directory: each entry's name is the workspace file name and its
/// bytes are the content verbatim, no metadata sidecars. Writes land in a
/// dot-prefixed temp file first and are renamed into place, so a reader
/// never observes a torn value; a writer mutex serializes the write path.
pub struct DirStore {
    root: PathBuf,
    policy: FilenamePolicy,
    max_file_bytes: usize,
    write_lock: Mutex<()>,
}

impl DirStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: PathBuf, policy: FilenamePolicy, max_file_bytes: usize) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "Opened workspace store");
        Ok(Self {
            root,
            policy,
            max_file_bytes,
            write_lock: Mutex::new(()),
        })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write through a same-directory temp file so the final rename is
    /// atomic on every platform we care about.
    async fn write_atomic(&self, name: &str, content: &str) -> Result<()> {
        let tmp_path = self.root.join(format!(".{name}.tmp"));
        let final_path = self.file_path(name);

        if let Err(e) = fs::write(&tmp_path, content).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp_path, &final_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl WorkspaceStore for DirStore {
    async fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            // Temp files and anything else off-policy stays invisible
            if self.policy.validate(&name).is_ok() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn create(&self, name: &str, content: &str) -> Result<()> {
        self.policy.validate(name)?;
        check_content(content, self.max_file_bytes)?;

        let _guard = self.write_lock.lock().await;
        if fs::try_exists(self.file_path(name)).await? {
            return Err(ScriptboxError::AlreadyExists {
                name: name.to_string(),
            });
        }
        self.write_atomic(name, content).await?;
        debug!(file = %name, bytes = content.len(), "Created workspace file");
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<String> {
        self.policy.validate(name)?;
        match fs::read_to_string(self.file_path(name)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ScriptboxError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, name: &str, content: &str) -> Result<()> {
        self.policy.validate(name)?;
        check_content(content, self.max_file_bytes)?;

        let _guard = self.write_lock.lock().await;
        if !fs::try_exists(self.file_path(name)).await? {
            return Err(ScriptboxError::NotFound {
                name: name.to_string(),
            });
        }
        self.write_atomic(name, content).await?;
        debug!(file = %name, bytes = content.len(), "Updated workspace file");
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.policy.validate(name)?;

        let _guard = self.write_lock.lock().await;
        match fs::remove_file(self.file_path(name)).await {
            Ok(()) => {
                debug!(file = %name, "Deleted workspace file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ScriptboxError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory workspace store with the same semantics as `DirStore`.
///
/// Used as a test double wherever a real directory would only add noise.
pub struct MemStore {
    files: RwLock<HashMap<String, String>>,
    policy: FilenamePolicy,
    max_file_bytes: usize,
}

impl MemStore {
    pub fn new(policy: FilenamePolicy, max_file_bytes: usize) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            policy,
            max_file_bytes,
        }
    }
}

#[async_trait]
impl WorkspaceStore for MemStore {
    async fn list(&self) -> Result<Vec<String>> {
        let files = self.files.read().await;
        let mut names: Vec<String> = files.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create(&self, name: &str, content: &str) -> Result<()> {
        self.policy.validate(name)?;
        check_content(content, self.max_file_bytes)?;

        let mut files = self.files.write().await;
        if files.contains_key(name) {
            return Err(ScriptboxError::AlreadyExists {
                name: name.to_string(),
            });
        }
        files.insert(name.to_string(), content.to_string());
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<String> {
        self.policy.validate(name)?;
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ScriptboxError::NotFound {
                name: name.to_string(),
            })
    }

    async fn update(&self, name: &str, content: &str) -> Result<()> {
        self.policy.validate(name)?;
        check_content(content, self.max_file_bytes)?;

        let mut files = self.files.write().await;
        match files.get_mut(name) {
            Some(slot) => {
                *slot = content.to_string();
                Ok(())
            }
            None => Err(ScriptboxError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.policy.validate(name)?;
        self.files
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ScriptboxError::NotFound {
                name: name.to_string(),
            })
    }
}
