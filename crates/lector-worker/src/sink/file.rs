//! Append-store result sink backed by a JSON array file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tempfile::NamedTempFile;

use super::{ResultSink, SinkError, TRACING_TARGET};
use crate::record::ResultRecord;

/// Appends records to a JSON array stored in a single file.
///
/// Every append rewrites the whole collection into a temporary file in the
/// same directory, syncs it and renames it over the store, so readers see
/// either the previous or the new collection. A missing or empty file is an
/// empty collection. Entries already in the file are preserved as-is.
///
/// Appends are serialized within the process; several processes sharing
/// one file are not coordinated.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: Arc<PathBuf>,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl FileSink {
    /// Creates a sink for the store at `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Arc::default(),
        }
    }

    /// Returns the store path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record currently in the store.
    pub async fn load(&self) -> Result<Vec<ResultRecord>, SinkError> {
        let path = self.path.clone();
        let entries = tokio::task::spawn_blocking(move || read_entries(&path)).await??;

        entries
            .into_iter()
            .map(|entry| {
                serde_json::from_value(entry).map_err(|source| SinkError::CorruptStore {
                    path: self.path.to_path_buf(),
                    source,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ResultSink for FileSink {
    async fn persist(&self, record: &ResultRecord) -> Result<(), SinkError> {
        let entry = serde_json::to_value(record)?;
        let _guard = self.lock.lock().await;

        let path = self.path.clone();
        let total = tokio::task::spawn_blocking(move || append_entry(&path, entry)).await??;

        tracing::debug!(
            target: TRACING_TARGET,
            job_id = %record.id,
            path = %self.path.display(),
            total_records = total,
            "Record appended to result store"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Reads the stored collection; a missing or blank file is empty.
fn read_entries(path: &Path) -> Result<Vec<Value>, SinkError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(SinkError::io(path, err)),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(&bytes).map_err(|source| SinkError::CorruptStore {
        path: path.to_path_buf(),
        source,
    })
}

/// Appends one entry and atomically replaces the store. Returns the new length.
fn append_entry(path: &Path, entry: Value) -> Result<usize, SinkError> {
    let mut entries = read_entries(path)?;
    entries.push(entry);

    let bytes = serde_json::to_vec_pretty(&entries)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| SinkError::io(dir, err))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|err| SinkError::io(dir, err))?;
    file.write_all(&bytes)
        .map_err(|err| SinkError::io(file.path(), err))?;
    if let Some(permissions) = store_permissions(path)? {
        file.as_file()
            .set_permissions(permissions)
            .map_err(|err| SinkError::io(file.path(), err))?;
    }
    file.as_file()
        .sync_all()
        .map_err(|err| SinkError::io(file.path(), err))?;
    file.persist(path)
        .map_err(|err| SinkError::io(path, err.error))?;
    sync_dir(dir)?;

    Ok(entries.len())
}

/// Permissions the replacement file must carry: those of the current store,
/// or the default for a new one.
fn store_permissions(path: &Path) -> Result<Option<fs::Permissions>, SinkError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(new_store_permissions()),
        Err(err) => Err(SinkError::io(path, err)),
    }
}

/// New stores are readable by other users.
#[cfg(unix)]
fn new_store_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_store_permissions() -> Option<fs::Permissions> {
    None
}

/// Flushes the directory entry so the rename survives a power loss.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), SinkError> {
    fs::File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(|err| SinkError::io(dir, err))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), SinkError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use lector_analysis::AnalysisResult;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::job::Job;

    fn record(id: &str, text: &str) -> ResultRecord {
        let job = Job {
            id: id.to_owned(),
            raw_text: text.to_owned(),
        };
        let analysis = AnalysisResult::new(json!({ "skills": ["Go", "SQL"], "id": id }));
        ResultRecord::new(job, analysis, Timestamp::now())
    }

    #[tokio::test]
    async fn test_round_trip_preserves_records() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path().join("results.json"));

        let first = record("job-1", "Backend engineer");
        let second = record("job-2", "Frontend engineer");
        sink.persist(&first).await.unwrap();
        sink.persist(&second).await.unwrap();

        let stored = sink.load().await.unwrap();
        assert_eq!(stored, vec![first, second]);
    }

    #[tokio::test]
    async fn test_missing_and_empty_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        let sink = FileSink::new(&path);
        assert!(sink.load().await.unwrap().is_empty());

        fs::write(&path, "  \n").unwrap();
        sink.persist(&record("job-1", "text")).await.unwrap();
        assert_eq!(sink.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path().join("nested/day/results.json"));
        sink.persist(&record("job-1", "text")).await.unwrap();
        assert_eq!(sink.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_store_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, "{ truncated").unwrap();

        let sink = FileSink::new(&path);
        let error = sink.persist(&record("job-1", "text")).await.unwrap_err();

        assert!(matches!(error, SinkError::CorruptStore { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ truncated");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_preserves_store_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, "[]").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        let sink = FileSink::new(&path);
        sink.persist(&record("job-1", "text")).await.unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_new_store_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");

        let sink = FileSink::new(&path);
        sink.persist(&record("job-1", "text")).await.unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn test_sync_dir() {
        let dir = TempDir::new().unwrap();
        assert!(sync_dir(dir.path()).is_ok());

        #[cfg(unix)]
        {
            let missing = dir.path().join("missing");
            let error = sync_dir(&missing).unwrap_err();
            assert!(matches!(error, SinkError::Io { path, .. } if path == missing));
        }
    }

    #[tokio::test]
    async fn test_preserves_foreign_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, r#"[{"legacy": true}]"#).unwrap();

        let sink = FileSink::new(&path);
        sink.persist(&record("job-1", "text")).await.unwrap();

        let stored: Vec<Value> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0], json!({ "legacy": true }));
        assert_eq!(stored[1]["id"], "job-1");
    }
}
