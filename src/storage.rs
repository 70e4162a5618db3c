// src/storage.rs
//! Dataset persistence: `(table, metadata)` pairs in numbered dataset directories

use crate::config::constants::storage::{DATA_EXTENSION, METADATA_EXTENSION};
use crate::config::StorageConfig;
use crate::error::{EmgError, EmgResult};
use crate::metadata::Metadata;
use crate::signal::SignalTable;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Storage collaborator for finalized sessions
pub trait DatasetStore {
    /// Ids of every stored dataset
    fn list_datasets(&self) -> EmgResult<Vec<String>>;

    /// Persist a table with its metadata under a fresh id
    fn store(&self, table: &SignalTable, metadata: &Metadata) -> EmgResult<String>;

    fn load_data(&self, id: &str) -> EmgResult<SignalTable>;

    fn load_metadata(&self, id: &str) -> EmgResult<Metadata>;

    fn load(&self, id: &str) -> EmgResult<(SignalTable, Metadata)> {
        Ok((self.load_data(id)?, self.load_metadata(id)?))
    }
}

/// One directory per dataset under `root`, named `1`, `2`, ...
///
/// The table is written as JSON and the metadata as a TOML sidecar.
#[derive(Debug, Clone)]
pub struct FileDatasetStore {
    root: PathBuf,
    data_file: String,
    metadata_file: String,
}

impl FileDatasetStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> EmgResult<Self> {
        Self::from_config(&StorageConfig {
            root: root.into(),
            ..StorageConfig::default()
        })
    }

    pub fn from_config(config: &StorageConfig) -> EmgResult<Self> {
        fs::create_dir_all(&config.root)?;
        Ok(Self {
            root: config.root.clone(),
            data_file: format!("{}.{}", config.data_file, DATA_EXTENSION),
            metadata_file: format!("{}.{}", config.metadata_file, METADATA_EXTENSION),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dataset_dir(&self, id: &str) -> EmgResult<PathBuf> {
        // Ids are directory names; anything that could escape the root is unknown
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(EmgError::DatasetNotFound { id: id.to_string() });
        }
        let dir = self.root.join(id);
        if !dir.is_dir() {
            return Err(EmgError::DatasetNotFound { id: id.to_string() });
        }
        Ok(dir)
    }

    fn write_dataset(&self, dir: &Path, data: &[u8], metadata: &str) -> EmgResult<()> {
        fs::create_dir(dir)?;
        let written = fs::write(dir.join(&self.data_file), data)
            .and_then(|_| fs::write(dir.join(&self.metadata_file), metadata));
        if let Err(err) = written {
            // A partial dataset would list but never load
            if let Err(cleanup) = fs::remove_dir_all(dir) {
                warn!(path = %dir.display(), error = %cleanup, "failed to remove partial dataset");
            }
            return Err(err.into());
        }
        Ok(())
    }

    fn next_dataset_id(&self) -> EmgResult<u64> {
        let last = self
            .list_datasets()?
            .iter()
            .filter_map(|name| name.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Ok(last + 1)
    }
}

impl DatasetStore for FileDatasetStore {
    fn list_datasets(&self) -> EmgResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        // Numeric ids in numeric order, anything else after them
        ids.sort_by_key(|id| (id.parse::<u64>().unwrap_or(u64::MAX), id.clone()));
        Ok(ids)
    }

    fn store(&self, table: &SignalTable, metadata: &Metadata) -> EmgResult<String> {
        // Serialize first so a rejected table or sidecar never reaches the disk
        let data = serde_json::to_vec(table)?;
        let sidecar = toml::to_string_pretty(metadata)?;

        let id = self.next_dataset_id()?.to_string();
        self.write_dataset(&self.root.join(&id), &data, &sidecar)?;

        info!(dataset = %id, rows = table.rows(), channels = table.channels(), "dataset stored");
        Ok(id)
    }

    fn load_data(&self, id: &str) -> EmgResult<SignalTable> {
        let path = self.dataset_dir(id)?.join(&self.data_file);
        if !path.is_file() {
            return Err(EmgError::DatasetNotFound { id: id.to_string() });
        }
        debug!(dataset = id, path = %path.display(), "loading dataset table");
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn load_metadata(&self, id: &str) -> EmgResult<Metadata> {
        let path = self.dataset_dir(id)?.join(&self.metadata_file);
        if !path.is_file() {
            return Err(EmgError::MetadataNotFound { id: id.to_string() });
        }
        Ok(toml::from_str(&fs::read_to_string(path)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_follows_highest_id() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("7")).unwrap();
        fs::create_dir(dir.path().join("notes")).unwrap();
        let store = FileDatasetStore::open(dir.path()).unwrap();

        let table = SignalTable::from_rows(2, vec![vec![1.0, 2.0]]).unwrap();
        let id = store.store(&table, &Metadata::default()).unwrap();
        assert_eq!(id, "8");
        assert_eq!(store.list_datasets().unwrap(), vec!["7", "8", "notes"]);
    }

    #[test]
    fn test_failed_write_leaves_no_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            root: dir.path().to_path_buf(),
            data_file: "missing/data".to_string(),
            ..StorageConfig::default()
        };
        let store = FileDatasetStore::from_config(&config).unwrap();
        let table = SignalTable::from_rows(1, vec![vec![1.0]]).unwrap();

        assert!(matches!(store.store(&table, &Metadata::default()), Err(EmgError::Io(_))));
        assert!(store.list_datasets().unwrap().is_empty());
        assert_eq!(store.next_dataset_id().unwrap(), 1);
    }

    #[test]
    fn test_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDatasetStore::open(dir.path()).unwrap();
        assert!(matches!(store.load_data("3"), Err(EmgError::DatasetNotFound { .. })));
        assert!(matches!(store.load_data("../x"), Err(EmgError::DatasetNotFound { .. })));
    }

    #[test]
    fn test_missing_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDatasetStore::open(dir.path()).unwrap();
        let table = SignalTable::from_rows(1, vec![vec![1.0]]).unwrap();
        let id = store.store(&table, &Metadata::default()).unwrap();

        fs::remove_file(dir.path().join(&id).join("metadata.toml")).unwrap();
        assert!(store.load_data(&id).is_ok());
        assert!(matches!(store.load_metadata(&id), Err(EmgError::MetadataNotFound { .. })));
    }
}
