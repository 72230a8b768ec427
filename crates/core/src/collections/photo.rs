//! App-local staging store for collection photos.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Staged-photo storage keyed by collection id.
///
/// Capture stages the photo BEFORE the outbox row is written, so a crash
/// between the two leaves an orphan file rather than a row pointing at
/// nothing.
pub trait LocalPhotoStoreTrait: Send + Sync {
    /// Copy the source photo into the photo directory. Returns the staged
    /// path that goes on the outbox row.
    fn stage(&self, collection_id: &str, source_uri: &str) -> Result<String>;

    fn read(&self, photo_path: &str) -> Result<Vec<u8>>;

    fn remove(&self, photo_path: &str) -> Result<()>;
}

/// Filesystem-backed photo store under the app data directory.
pub struct FsPhotoStore {
    photo_dir: PathBuf,
}

impl FsPhotoStore {
    pub fn new(app_data_dir: impl AsRef<Path>) -> Result<Self> {
        let photo_dir = app_data_dir.as_ref().join("collection_photos");
        fs::create_dir_all(&photo_dir).map_err(|e| {
            Error::file_storage(format!(
                "Failed to create photo directory {}: {}",
                photo_dir.display(),
                e
            ))
        })?;
        Ok(Self { photo_dir })
    }

    fn staged_path(&self, collection_id: &str, source_uri: &str) -> PathBuf {
        let extension = Path::new(source_uri)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg");
        self.photo_dir
            .join(format!("{}.{}", collection_id, extension))
    }
}

impl LocalPhotoStoreTrait for FsPhotoStore {
    fn stage(&self, collection_id: &str, source_uri: &str) -> Result<String> {
        let target = self.staged_path(collection_id, source_uri);
        fs::copy(source_uri, &target).map_err(|e| {
            Error::file_storage(format!(
                "Failed to stage photo for {}: {}",
                collection_id, e
            ))
        })?;
        Ok(target.to_string_lossy().to_string())
    }

    fn read(&self, photo_path: &str) -> Result<Vec<u8>> {
        fs::read(photo_path)
            .map_err(|e| Error::file_storage(format!("Failed to read {}: {}", photo_path, e)))
    }

    fn remove(&self, photo_path: &str) -> Result<()> {
        fs::remove_file(photo_path)
            .map_err(|e| Error::file_storage(format!("Failed to remove {}: {}", photo_path, e)))
    }
}
