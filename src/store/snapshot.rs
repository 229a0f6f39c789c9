use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::checksum::content_hash;
use super::{Operation, SnapshotId, SnapshotMetadata, StoreError, StoreResult};

const INDEX_FILE: &str = "snapshots.index";
const CONTENT_DIR: &str = "content";
const BLOB_EXTENSION: &str = "snapshot";

const SELECT_METADATA: &str =
    "SELECT id, name, original_file_path, timestamp, file_size, content_hash, content_storage_path
     FROM snapshots";

/// What happened to the content blob during `delete`.
///
/// The snapshot counts as deleted as soon as its metadata row is gone, so a
/// blob that could not be removed is reported here instead of as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobCleanup {
    Removed,
    AlreadyMissing,
    Failed(String),
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            original_file_path TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            file_size INTEGER NOT NULL,
            content_hash TEXT NOT NULL,
            content_storage_path TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_snapshots_path ON snapshots(original_file_path)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_snapshots_timestamp ON snapshots(timestamp)",
        [],
    )?;

    Ok(())
}

/// Owner of one storage root: the metadata index plus the content directory.
///
/// Lifecycle is explicit: [`SnapshotStore::new`] only records paths,
/// [`initialize`](SnapshotStore::initialize) creates the layout and opens the
/// index, [`teardown`](SnapshotStore::teardown) releases it.
///
/// Assumes a single caller per storage root. There is no locking and no
/// protection against two processes opening the same root at once.
pub struct SnapshotStore {
    root: PathBuf,
    content_dir: PathBuf,
    conn: Option<Connection>,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let content_dir = root.join(CONTENT_DIR);
        SnapshotStore {
            root,
            content_dir,
            conn: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn is_initialized(&self) -> bool {
        self.conn.is_some()
    }

    /// Create the storage layout if missing and open the index.
    pub fn initialize(&mut self) -> StoreResult<()> {
        if self.conn.is_some() {
            debug!("snapshot store at {} already initialized", self.root.display());
            return Ok(());
        }

        // creates the root as well
        fs::create_dir_all(&self.content_dir)
            .map_err(|e| StoreError::init(&self.content_dir, e))?;

        let index_path = self.index_path();
        let conn = Connection::open(&index_path).map_err(|e| StoreError::init(&index_path, e))?;
        init_schema(&conn).map_err(|e| StoreError::init(&index_path, e))?;

        self.conn = Some(conn);
        info!("opened snapshot index {}", index_path.display());
        Ok(())
    }

    /// Release the index handle. Safe to call repeatedly or before `initialize`.
    pub fn teardown(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => debug!("closed snapshot index {}", self.index_path().display()),
                Err((_, e)) => warn!("failed to close snapshot index cleanly: {e}"),
            }
        }
    }

    fn conn(&self) -> StoreResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| StoreError::init(&self.root, "store is not initialized"))
    }

    fn blob_path(&self, id: &SnapshotId) -> PathBuf {
        self.content_dir.join(format!("{id}.{BLOB_EXTENSION}"))
    }

    /// Capture the current content of `file_path` as a new snapshot.
    ///
    /// The blob is written before the metadata row. If the insert fails the
    /// blob stays behind unreferenced, which the store tolerates.
    pub fn create(&self, file_path: &Path, name: &str) -> StoreResult<SnapshotId> {
        let conn = self.conn()?;

        let stat = fs::metadata(file_path)
            .map_err(|e| StoreError::io(Operation::Create, file_path, e))?;
        if !stat.is_file() {
            return Err(StoreError::io(
                Operation::Create,
                file_path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        let content =
            fs::read(file_path).map_err(|e| StoreError::io(Operation::Create, file_path, e))?;

        let id = SnapshotId::generate();
        let blob_path = self.blob_path(&id);
        fs::write(&blob_path, &content)
            .map_err(|e| StoreError::io(Operation::Create, &blob_path, e))?;

        let metadata = SnapshotMetadata {
            id: id.clone(),
            name: name.to_string(),
            original_file_path: file_path.to_string_lossy().into_owned(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            file_size: stat.len(),
            content_hash: content_hash(&content),
            content_storage_path: blob_path,
        };

        let inserted = conn.execute(
            "INSERT INTO snapshots (id, name, original_file_path, timestamp, file_size, content_hash, content_storage_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                metadata.id.as_str(),
                metadata.name,
                metadata.original_file_path,
                metadata.timestamp,
                i64::try_from(metadata.file_size).unwrap_or(i64::MAX),
                metadata.content_hash,
                metadata.content_storage_path.to_string_lossy().into_owned()
            ],
        );

        if let Err(e) = inserted {
            warn!(
                "metadata insert failed, leaving unreferenced blob {}",
                metadata.content_storage_path.display()
            );
            return Err(StoreError::index(Operation::Create)(e));
        }

        info!(
            "created snapshot {} ({:?}) of {}, {} bytes",
            id, metadata.name, metadata.original_file_path, metadata.file_size
        );
        Ok(id)
    }

    /// Get the metadata of a single snapshot
    pub fn get(&self, id: &SnapshotId) -> StoreResult<SnapshotMetadata> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("{SELECT_METADATA} WHERE id = ?1"),
            params![id.as_str()],
            metadata_from_row,
        )
        .optional()
        .map_err(StoreError::index(Operation::Get))?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// All snapshots whose original path is exactly `file_path`, newest first.
    pub fn list_by_file(&self, file_path: &Path) -> StoreResult<Vec<SnapshotMetadata>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "{SELECT_METADATA}
                 WHERE original_file_path = ?1
                 ORDER BY timestamp DESC, rowid DESC"
            ))
            .map_err(StoreError::index(Operation::List))?;

        let snapshots = stmt
            .query_map(
                params![file_path.to_string_lossy().into_owned()],
                metadata_from_row,
            )
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(StoreError::index(Operation::List))?;

        Ok(snapshots)
    }

    /// All snapshots, newest first.
    pub fn list_all(&self) -> StoreResult<Vec<SnapshotMetadata>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!("{SELECT_METADATA} ORDER BY timestamp DESC, rowid DESC"))
            .map_err(StoreError::index(Operation::List))?;

        let snapshots = stmt
            .query_map([], metadata_from_row)
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(StoreError::index(Operation::List))?;

        Ok(snapshots)
    }

    /// Read the captured bytes of a snapshot.
    ///
    /// A record whose blob has gone missing is a storage fault, not `NotFound`.
    pub fn read_content(&self, id: &SnapshotId) -> StoreResult<Vec<u8>> {
        let metadata = self.get(id)?;
        fs::read(&metadata.content_storage_path).map_err(|e| {
            StoreError::io(Operation::ReadContent, &metadata.content_storage_path, e)
        })
    }

    /// Remove a snapshot's metadata, then try to remove its blob.
    pub fn delete(&self, id: &SnapshotId) -> StoreResult<BlobCleanup> {
        let metadata = self.get(id)?;
        let conn = self.conn()?;

        conn.execute("DELETE FROM snapshots WHERE id = ?1", params![id.as_str()])
            .map_err(StoreError::index(Operation::Delete))?;

        let blob = &metadata.content_storage_path;
        let cleanup = match fs::remove_file(blob) {
            Ok(()) => BlobCleanup::Removed,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("blob {} already gone", blob.display());
                BlobCleanup::AlreadyMissing
            }
            Err(e) => {
                warn!(
                    "snapshot {id} deleted from index but content file {} could not be removed: {e}",
                    blob.display()
                );
                BlobCleanup::Failed(e.to_string())
            }
        };

        info!("deleted snapshot {id} ({:?})", metadata.name);
        Ok(cleanup)
    }
}

fn metadata_from_row(row: &rusqlite::Row) -> rusqlite::Result<SnapshotMetadata> {
    Ok(SnapshotMetadata {
        id: SnapshotId::from(row.get::<_, String>(0)?),
        name: row.get(1)?,
        original_file_path: row.get(2)?,
        timestamp: row.get(3)?,
        file_size: row.get::<_, i64>(4)?.max(0) as u64,
        content_hash: row.get(5)?,
        content_storage_path: PathBuf::from(row.get::<_, String>(6)?),
    })
}
