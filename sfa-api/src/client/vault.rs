use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// storage keys shared with the rest of the admin panel
pub mod keys {
    pub const AUTH_TOKEN: &str = "uat";
    pub const USER_ENTITY: &str = "ue";
    pub const ACCOUNT: &str = "account";
    pub const ROLE: &str = "role";
    pub const LANGUAGE_CONTEXT: &str = "languageContext";

    /// entries that must be removed as one unit when the session ends
    pub const IDENTITY: [&str; 4] = [AUTH_TOKEN, USER_ENTITY, ACCOUNT, ROLE];
}

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("vault lock poisoned")]
    PoisonedLock,

    #[error(transparent)]
    StdIo(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub trait Vault: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, VaultError>;

    fn put(&self, key: &str, value: String) -> Result<(), VaultError>;

    fn remove(&self, key: &str) -> Result<(), VaultError>;

    /// removes every listed key as one logical unit; implementations must
    /// not report success after a partial removal
    fn remove_many(&self, keys: &[&str]) -> Result<(), VaultError>;
}

#[derive(Default)]
pub struct MemoryVault {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        MemoryVault {
            entries: RwLock::new(HashMap::new())
        }
    }
}

impl Vault for MemoryVault {
    fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        let entries = self.entries.read()
            .map_err(|_e| VaultError::PoisonedLock)?;

        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<(), VaultError> {
        let mut entries = self.entries.write()
            .map_err(|_e| VaultError::PoisonedLock)?;

        entries.insert(key.into(), value);

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), VaultError> {
        let mut entries = self.entries.write()
            .map_err(|_e| VaultError::PoisonedLock)?;

        entries.remove(key);

        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), VaultError> {
        let mut entries = self.entries.write()
            .map_err(|_e| VaultError::PoisonedLock)?;

        for key in keys {
            entries.remove(*key);
        }

        Ok(())
    }
}

/// durable vault persisted as a single json map; the whole file is written
/// on every mutation so multi-key removals cannot partially apply
pub struct FileVault {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileVault {
    pub fn load<P>(given: P) -> Result<Self, VaultError>
    where
        P: AsRef<Path>
    {
        let given_ref = given.as_ref();

        let entries = if given_ref.try_exists()? {
            let file = std::fs::OpenOptions::new()
                .read(true)
                .open(given_ref)?;
            let reader = std::io::BufReader::new(file);

            match serde_json::from_reader(reader) {
                Ok(map) => map,
                Err(err) => {
                    tracing::warn!("discarding malformed vault file: {}", err);

                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(FileVault {
            path: given_ref.to_owned(),
            entries: RwLock::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), VaultError> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&self.path)?;
        let mut writer = std::io::BufWriter::new(file);

        serde_json::to_writer(&mut writer, entries)?;
        writer.flush()?;

        Ok(())
    }
}

impl Vault for FileVault {
    fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        let entries = self.entries.read()
            .map_err(|_e| VaultError::PoisonedLock)?;

        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<(), VaultError> {
        let mut entries = self.entries.write()
            .map_err(|_e| VaultError::PoisonedLock)?;

        entries.insert(key.into(), value);

        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), VaultError> {
        let mut entries = self.entries.write()
            .map_err(|_e| VaultError::PoisonedLock)?;

        if entries.remove(key).is_none() {
            return Ok(());
        }

        self.persist(&entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), VaultError> {
        let mut entries = self.entries.write()
            .map_err(|_e| VaultError::PoisonedLock)?;
        let mut changed = false;

        for key in keys {
            changed |= entries.remove(*key).is_some();
        }

        if !changed {
            return Ok(());
        }

        self.persist(&entries)
    }
}
