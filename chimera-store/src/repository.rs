//! Chain repository
//!
//! [`ChainRepository`] is the persistence seam handed to whatever needs
//! storage; [`FileRepository`] keeps one snapshot file per chain under
//! `<data_dir>/chains/`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chimera_core::Chain;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{decode, encode, SnapshotError};

/// Snapshot file extension
const SNAPSHOT_EXT: &str = "json";

/// Extension of in-flight writes
const TEMP_EXT: &str = "tmp";

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory (default: ./nexus_data)
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./nexus_data"),
        }
    }
}

impl StoreConfig {
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Directory holding chain snapshots
    pub fn chains_dir(&self) -> PathBuf {
        self.data_dir.join("chains")
    }
}

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("chain {0} not found")]
    NotFound(Uuid),

    #[error("corrupt data in {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: SnapshotError,
    },

    #[error("storage unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn unavailable(path: &Path, source: io::Error) -> Self {
        StorageError::Unavailable {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Persistence contract for chains
pub trait ChainRepository {
    /// Persist the chain, replacing any earlier snapshot atomically.
    /// Returns where it was written.
    fn save(&self, chain: &Chain) -> Result<PathBuf, StorageError>;

    /// Load a chain by id
    fn load(&self, id: Uuid) -> Result<Chain, StorageError>;

    /// Every readable chain, oldest first. Unreadable snapshots are skipped.
    fn list(&self) -> Result<Vec<Chain>, StorageError>;

    /// Remove a chain's snapshot
    fn delete(&self, id: Uuid) -> Result<(), StorageError>;
}

/// Filesystem-backed repository
#[derive(Debug, Clone)]
pub struct FileRepository {
    chains_dir: PathBuf,
}

impl FileRepository {
    /// Open (creating if needed) the storage directory
    pub fn open(config: &StoreConfig) -> Result<Self, StorageError> {
        let chains_dir = config.chains_dir();
        fs::create_dir_all(&chains_dir).map_err(|e| StorageError::unavailable(&chains_dir, e))?;
        debug!("Opened chain repository at {}", chains_dir.display());
        Ok(Self { chains_dir })
    }

    pub fn chains_dir(&self) -> &Path {
        &self.chains_dir
    }

    fn snapshot_path(&self, id: Uuid) -> PathBuf {
        self.chains_dir.join(format!("{}.{}", id, SNAPSHOT_EXT))
    }

    fn read_snapshot(path: &Path) -> Result<Chain, StorageError> {
        let bytes = fs::read(path).map_err(|e| StorageError::unavailable(path, e))?;
        Self::decode_snapshot(path, &bytes)
    }

    fn decode_snapshot(path: &Path, bytes: &[u8]) -> Result<Chain, StorageError> {
        decode(bytes).map_err(|source| StorageError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_atomic(target: &Path, bytes: &[u8]) -> io::Result<()> {
        let temp = target.with_extension(TEMP_EXT);

        let result = (|| {
            let mut file = fs::File::create(&temp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&temp, target)
        })();

        if result.is_err() && temp.exists() {
            let _ = fs::remove_file(&temp);
        }
        result
    }
}

impl ChainRepository for FileRepository {
    fn save(&self, chain: &Chain) -> Result<PathBuf, StorageError> {
        let target = self.snapshot_path(chain.id());
        let bytes = encode(chain).map_err(|e| StorageError::unavailable(&target, io::Error::other(e)))?;

        Self::write_atomic(&target, &bytes).map_err(|e| StorageError::unavailable(&target, e))?;

        info!(
            "Saved chain '{}' ({} signals, {} links) to {}",
            chain.name(),
            chain.node_count(),
            chain.edge_count(),
            target.display()
        );
        Ok(target)
    }

    fn load(&self, id: Uuid) -> Result<Chain, StorageError> {
        let path = self.snapshot_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StorageError::NotFound(id)),
            Err(e) => return Err(StorageError::unavailable(&path, e)),
        };

        let chain = Self::decode_snapshot(&path, &bytes)?;
        if chain.id() != id {
            return Err(StorageError::Corrupt {
                path,
                source: SnapshotError::Invalid(chimera_core::ChainError::KeyMismatch {
                    key: id,
                    actual: chain.id(),
                }),
            });
        }

        debug!("Loaded chain {} from {}", id, path.display());
        Ok(chain)
    }

    fn list(&self) -> Result<Vec<Chain>, StorageError> {
        let entries =
            fs::read_dir(&self.chains_dir).map_err(|e| StorageError::unavailable(&self.chains_dir, e))?;

        let mut chains = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::unavailable(&self.chains_dir, e))?;
            let path = entry.path();

            if !path.extension().is_some_and(|ext| ext == SNAPSHOT_EXT) {
                continue;
            }

            match Self::read_snapshot(&path) {
                Ok(chain) => chains.push(chain),
                Err(e) => warn!("Skipping unreadable snapshot: {}", e),
            }
        }

        chains.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then(a.id().cmp(&b.id()))
        });
        Ok(chains)
    }

    fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        let path = self.snapshot_path(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted chain {}", id);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound(id)),
            Err(e) => Err(StorageError::unavailable(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_core::{Link, RelationType, Signal, ThreatDomain};
    use tempfile::TempDir;

    fn temp_repo() -> (TempDir, FileRepository) {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::open(&StoreConfig::default().with_data_dir(dir.path())).unwrap();
        (dir, repo)
    }

    fn sample_chain() -> Chain {
        let mut chain = Chain::new("Test Operation").unwrap();
        let node = Signal::builder(ThreatDomain::Cyber, "server_breach")
            .confidence(0.9)
            .description("Logs show unauthorized access")
            .build()
            .unwrap();
        chain.add_node(node);
        chain
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.chains_dir().ends_with("nexus_data/chains"));
    }

    #[test]
    fn test_atomic_persistence() {
        let (_dir, repo) = temp_repo();
        let chain = sample_chain();

        let saved = repo.save(&chain).unwrap();
        assert!(saved.exists());
        assert!(!saved.with_extension(TEMP_EXT).exists());

        let loaded = repo.load(chain.id()).unwrap();
        assert_eq!(loaded.name(), "Test Operation");
        assert_eq!(loaded.node_count(), 1);
        let node = loaded.nodes().values().next().unwrap();
        assert_eq!(node.domain(), ThreatDomain::Cyber);
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let (_dir, repo) = temp_repo();
        let mut chain = sample_chain();
        let first = chain.nodes().keys().next().copied().unwrap();
        let second = Signal::builder(ThreatDomain::Psychological, "fear_narrative")
            .confidence(0.37)
            .cost_estimate(1.25)
            .build()
            .unwrap();
        let second_id = second.id();
        chain.add_node(second);
        chain
            .add_edge(Link::weighted(first, second_id, RelationType::Masking, 0.55, "cover").unwrap())
            .unwrap();

        repo.save(&chain).unwrap();
        let loaded = repo.load(chain.id()).unwrap();

        assert_eq!(loaded, chain);
        assert_eq!(loaded.edges()[0].relation_type(), RelationType::Masking);
        assert_eq!(loaded.node(&second_id).unwrap().confidence(), 0.37);
    }

    #[test]
    fn test_save_overwrites() {
        let (_dir, repo) = temp_repo();
        let mut chain = sample_chain();
        repo.save(&chain).unwrap();

        chain.add_node(
            Signal::builder(ThreatDomain::Social, "protest")
                .build()
                .unwrap(),
        );
        repo.save(&chain).unwrap();

        assert_eq!(repo.load(chain.id()).unwrap().node_count(), 2);
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_dir, repo) = temp_repo();
        let id = Uuid::new_v4();
        assert!(matches!(repo.load(id), Err(StorageError::NotFound(missing)) if missing == id));
    }

    #[test]
    fn test_load_corrupt_is_distinguished() {
        let (_dir, repo) = temp_repo();
        let id = Uuid::new_v4();
        fs::write(repo.snapshot_path(id), "chain: [unterminated").unwrap();

        assert!(matches!(repo.load(id), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_snapshot_under_wrong_name_is_corrupt() {
        let (_dir, repo) = temp_repo();
        let chain = sample_chain();
        let saved = repo.save(&chain).unwrap();
        let other = Uuid::new_v4();
        fs::rename(&saved, repo.snapshot_path(other)).unwrap();

        assert!(matches!(repo.load(other), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_list_functionality() {
        let (_dir, repo) = temp_repo();
        let chain = sample_chain();
        repo.save(&chain).unwrap();

        let chains = repo.list().unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].id(), chain.id());
    }

    #[test]
    fn test_list_skips_malformed_and_foreign_files() {
        let (_dir, repo) = temp_repo();
        repo.save(&sample_chain()).unwrap();
        repo.save(&sample_chain()).unwrap();
        fs::write(repo.chains_dir().join("broken.json"), "{").unwrap();
        fs::write(repo.chains_dir().join("notes.txt"), "hello").unwrap();

        let chains = repo.list().unwrap();
        assert_eq!(chains.len(), 2);
        assert!(chains[0].created_at() <= chains[1].created_at());
    }

    #[test]
    fn test_delete() {
        let (_dir, repo) = temp_repo();
        let chain = sample_chain();
        repo.save(&chain).unwrap();

        repo.delete(chain.id()).unwrap();
        assert!(matches!(repo.load(chain.id()), Err(StorageError::NotFound(_))));
        assert!(matches!(repo.delete(chain.id()), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_unreachable_directory_is_unavailable_not_missing() {
        let (_dir, repo) = temp_repo();
        let chain = sample_chain();
        repo.save(&chain).unwrap();

        fs::remove_dir_all(repo.chains_dir()).unwrap();
        fs::write(repo.chains_dir(), "file in the way").unwrap();

        assert!(matches!(repo.save(&chain), Err(StorageError::Unavailable { .. })));
        assert!(matches!(repo.load(chain.id()), Err(StorageError::Unavailable { .. })));
        assert!(matches!(repo.delete(chain.id()), Err(StorageError::Unavailable { .. })));
    }

    #[test]
    fn test_unavailable_medium() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "file in the way").unwrap();

        let result = FileRepository::open(&StoreConfig::default().with_data_dir(&blocker));
        assert!(matches!(result, Err(StorageError::Unavailable { .. })));
    }
}
