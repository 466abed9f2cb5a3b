use std::{ffi::OsString, io, marker::PhantomData, path::PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

use crate::errors::ServiceError;

/// Generic JSON file-backed array store.
///
/// Persists a `Vec<T>` as a single pretty-printed JSON array. Nothing is cached:
/// every call reads the file again, and writers rewrite the whole file.
/// All access goes through one async mutex so a load-mutate-save cycle
/// never interleaves with another on the same store.
pub struct JsonArrayStore<T> {
    file_path: PathBuf,
    lock: Mutex<()>,
    _items: PhantomData<fn() -> T>,
}

impl<T> JsonArrayStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Bind the store to a path. The file is not touched until the first save.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), lock: Mutex::new(()), _items: PhantomData }
    }

    /// Read the whole collection. A missing file is an empty collection;
    /// an unreadable or malformed one is an error.
    pub async fn load(&self) -> Result<Vec<T>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                error!(path = %self.file_path.display(), error = %e, "failed to read store file");
                return Err(ServiceError::storage(format!("read {}: {e}", self.file_path.display())));
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            error!(path = %self.file_path.display(), error = %e, "store file is not a valid JSON array");
            ServiceError::storage(format!("parse {}: {e}", self.file_path.display()))
        })
    }

    /// Overwrite the file with `items`, via a sibling temp file and a rename.
    pub async fn save(&self, items: &[T]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(items).map_err(ServiceError::storage)?;
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, data).await.map_err(|e| {
            error!(path = %tmp.display(), error = %e, "failed to write temp store file");
            ServiceError::storage(format!("write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.file_path).await.map_err(|e| {
            error!(path = %self.file_path.display(), error = %e, "failed to replace store file");
            ServiceError::storage(format!("rename {}: {e}", self.file_path.display()))
        })?;
        debug!(path = %self.file_path.display(), count = items.len(), "store file saved");
        Ok(())
    }

    /// Load under the store lock.
    pub async fn read(&self) -> Result<Vec<T>, ServiceError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Save under the store lock.
    pub async fn write(&self, items: &[T]) -> Result<(), ServiceError> {
        let _guard = self.lock.lock().await;
        self.save(items).await
    }

    /// Load, apply `f`, and persist, all under the store lock.
    /// When `f` fails nothing is written.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        let out = f(&mut items)?;
        self.save(&items).await?;
        Ok(out)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}
