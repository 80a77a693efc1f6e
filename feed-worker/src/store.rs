//! Bounded, file-backed memory of recently dispatched entry ids.
//!
//! The file holds one id per line, newest first, and never more than
//! [`SEEN_CAPACITY`] lines. It is rewritten in full on every cycle through a
//! sibling temporary file that is renamed over the original, so a crash
//! leaves either the old or the new contents on disk.
//!
//! Not safe for concurrent writers; the scheduler guarantees a single active
//! cycle per process.

use std::collections::HashSet;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::StoreError;

/// Maximum number of ids retained across cycles.
pub const SEEN_CAPACITY: usize = 25;

/// Snapshot of the store contents at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    ids: Vec<String>,
}

impl SeenSet {
    /// Build a snapshot from ids in stored order, dropping blanks and repeats.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let ids = ids
            .into_iter()
            .map(Into::into)
            .filter(|id: &String| !id.is_empty() && seen.insert(id.clone()))
            .collect();
        Self { ids }
    }

    /// Whether `id` was recorded by a previous cycle.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|seen| seen == id)
    }

    /// Recorded ids, most recent first.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Handle on the seen-id file.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
    capacity: usize,
}

impl SeenStore {
    /// Create a store backed by `path` with the standard capacity.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            capacity: SEEN_CAPACITY,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current contents.
    ///
    /// A missing file is created empty and reads as an empty set. A file
    /// that exists but cannot be read is an error: proceeding with an empty
    /// set would re-dispatch everything in the feed.
    pub async fn load(&self) -> Result<SeenSet, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => {
                let set = SeenSet::from_ids(text.lines().map(str::trim));
                debug!(
                    path = %self.path.display(),
                    seen_ids = set.len(),
                    "seen_store_loaded"
                );
                Ok(set)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::write(&self.path, "")
                    .await
                    .map_err(|source| StoreError::Write {
                        path: self.path.clone(),
                        source,
                    })?;
                info!(path = %self.path.display(), "seen_store_created");
                Ok(SeenSet::default())
            }
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Membership test against the persisted contents.
    pub async fn contains(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.load().await?.contains(id))
    }

    /// Persist `new_ids` ahead of `prior_ids`, bounded to the store capacity.
    ///
    /// Returns the ids now on disk, most recent first.
    pub async fn record_and_prune(
        &self,
        new_ids: &[String],
        prior_ids: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let retained = prune(new_ids, prior_ids, self.capacity);
        self.write_atomic(&retained).await?;

        info!(
            path = %self.path.display(),
            new_ids = new_ids.len(),
            prior_ids = prior_ids.len(),
            retained_ids = retained.len(),
            "seen_store_updated"
        );

        Ok(retained)
    }

    async fn write_atomic(&self, ids: &[String]) -> Result<(), StoreError> {
        let tmp_path = temp_path(&self.path);

        let mut contents = String::new();
        for id in ids {
            contents.push_str(id);
            contents.push('\n');
        }

        let result = write_and_replace(&tmp_path, &self.path, contents.as_bytes()).await;
        if result.is_err() {
            // The original file is untouched; drop the partial copy beside it.
            if let Err(e) = fs::remove_file(&tmp_path).await {
                if e.kind() != ErrorKind::NotFound {
                    warn!(
                        path = %tmp_path.display(),
                        error = %e,
                        "seen_store_temp_cleanup_failed"
                    );
                }
            }
        }
        result
    }
}

async fn write_and_replace(
    tmp_path: &Path,
    path: &Path,
    contents: &[u8],
) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: tmp_path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(tmp_path).await.map_err(write_err)?;
    file.write_all(contents).await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;
    drop(file);

    fs::rename(tmp_path, path)
        .await
        .map_err(|source| StoreError::Replace {
            path: path.to_path_buf(),
            source,
        })
}

/// Merge this cycle's ids in front of the prior ones and cut to `capacity`.
///
/// New ids are always kept (up to the capacity itself); prior ids fill the
/// remaining slots in stored order, so the oldest are evicted first.
pub fn prune(new_ids: &[String], prior_ids: &[String], capacity: usize) -> Vec<String> {
    let mut seen = HashSet::new();

    new_ids
        .iter()
        .chain(prior_ids)
        .filter(|id| !id.is_empty() && seen.insert(id.as_str()))
        .take(capacity)
        .cloned()
        .collect()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
