// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::blob_store::BlobStore;
use crate::config::StoreConfig;
use crate::error::{FolioDbError, Result};
use crate::schema::create_schema;
use crate::transaction::with_transaction;
use async_trait::async_trait;
use diagnostics::*;
use duckdb::{Connection, Params, Row, params};
use foliofs::snapshot::NodeRecord;
use foliofs::{BindId, Blob, Content, Entry, NodeId, NodeKind, PersistenceLayer};
use object_store::path::Path as BlobPath;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tokio::sync::Mutex;

/// Relational storage substrate: node, folder and file rows in DuckDB,
/// binary payloads in a [`BlobStore`].
///
/// Every mutating call runs in one database transaction. Blob writes happen
/// before the row update that references them and blob deletes after the
/// commit that drops the reference, so a crash can leave an unreferenced
/// blob but never a row pointing at a missing one.
///
/// DuckDB calls are synchronous and run on the calling task while it holds
/// the connection lock. With an embedded database each call is short, and
/// the layer is single-writer anyway, so the lock is held across blocking
/// work instead of moving it to `spawn_blocking`. A multi-threaded runtime
/// keeps other tasks running meanwhile; on a current-thread runtime a large
/// `import_batch` or `CHECKPOINT` stalls the whole runtime until it
/// returns. Blob store calls are awaited outside database work.
pub struct DuckPersistence {
    conn: Mutex<Connection>,
    blobs: BlobStore,
    checkpoint_on_persist: bool,
}

impl DuckPersistence {
    /// Open (or create) the store in `store_dir`
    pub fn open(store_dir: &Path, config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(store_dir)?;
        let db_path = config.database_path(store_dir);
        let conn = Connection::open(&db_path)?;
        let blobs = BlobStore::new(config.blobs.build_object_store(store_dir)?);

        let mut persistence = Self::with_blob_store(conn, blobs)?;
        persistence.checkpoint_on_persist = true;

        let path = db_path.display().to_string();
        info!("Opened store database {path}", path: path.as_str());
        Ok(persistence)
    }

    /// Transient database with in-memory blobs
    pub fn open_in_memory() -> Result<Self> {
        Self::with_blob_store(Connection::open_in_memory()?, BlobStore::in_memory())
    }

    pub fn with_blob_store(conn: Connection, blobs: BlobStore) -> Result<Self> {
        create_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            blobs,
            checkpoint_on_persist: false,
        })
    }

    #[must_use]
    pub fn blob_store(&self) -> &BlobStore {
        &self.blobs
    }

    async fn write_blob_row(&self, file: &NodeId, blob: &Blob) -> Result<()> {
        {
            let conn = self.conn.lock().await;
            require(&conn, file, NodeKind::File)?;
        }

        let key = BlobStore::key(file);
        self.blobs.put(&key, blob.data().clone()).await?;

        let mut conn = self.conn.lock().await;
        with_transaction(&mut conn, |tx| {
            _ = tx.execute(
                "UPDATE files SET content = NULL, blob_path = ?, blob_size = ?, media_type = ? WHERE id = ?",
                params![key.to_string(), blob.len() as i64, blob.media_type(), file.as_str()],
            )?;
            Ok(())
        })
    }

    async fn write_content_row(&self, file: &NodeId, content: &Content) -> Result<()> {
        let json = content.to_json_string()?;
        let stale = {
            let mut conn = self.conn.lock().await;
            with_transaction(&mut conn, |tx| {
                require(tx, file, NodeKind::File)?;
                let stale = blob_path(tx, file)?;
                _ = tx.execute(
                    "UPDATE files SET content = ?, blob_path = NULL, blob_size = NULL WHERE id = ?",
                    params![json, file.as_str()],
                )?;
                Ok(stale)
            })?
        };
        if let Some(path) = stale {
            self.blobs.delete(&BlobPath::from(path)).await?;
        }
        Ok(())
    }

    /// A row pointing at a missing object is an error when `strict`, otherwise
    /// a warning and `None`.
    async fn load_blob(&self, id: &NodeId, strict: bool) -> Result<Option<Blob>> {
        let row = {
            let conn = self.conn.lock().await;
            query_first(
                &conn,
                "SELECT blob_path, media_type FROM files WHERE id = ?",
                params![id.as_str()],
                |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?)),
            )?
        };
        let Some((Some(path), media_type)) = row else {
            return Ok(None);
        };
        match self.blobs.get(&BlobPath::from(path.as_str())).await? {
            Some(data) => Ok(Some(Blob::new(media_type.unwrap_or_default(), data))),
            None if strict => Err(FolioDbError::MissingBlob {
                id: id.clone(),
                path,
            }),
            None => {
                warn!("Blob for {node_id} missing at {path}", node_id: id.as_str(), path: path.as_str());
                Ok(None)
            }
        }
    }

    async fn destroy_rows(&self, id: &NodeId) -> Result<Vec<NodeId>> {
        let (removed, paths) = {
            let mut conn = self.conn.lock().await;
            with_transaction(&mut conn, |tx| {
                let removed = subtree(tx, id)?;
                let mut paths = Vec::new();
                for node in &removed {
                    paths.extend(blob_path(tx, node)?);
                    delete_rows(tx, node)?;
                }
                Ok((removed, paths))
            })?
        };
        for path in paths {
            self.blobs.delete(&BlobPath::from(path)).await?;
        }
        Ok(removed)
    }

    async fn export(&self, id: &NodeId) -> Result<Option<NodeRecord>> {
        let (attributes, file_row) = {
            let conn = self.conn.lock().await;
            let Some(kind) = kind_of(&conn, id)? else {
                return Ok(None);
            };
            let attributes = attributes_of(&conn, id)?;
            match kind {
                NodeKind::Folder => {
                    return Ok(Some(NodeRecord::folder(
                        id.clone(),
                        attributes,
                        entries(&conn, id)?,
                    )));
                }
                NodeKind::File => {
                    let row = query_first(
                        &conn,
                        "SELECT content, media_type FROM files WHERE id = ?",
                        params![id.as_str()],
                        |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?)),
                    )?;
                    (attributes, row)
                }
            }
        };
        let (content, media_type) = file_row.unwrap_or_default();
        let content = content.as_deref().map(Content::from_json_str).transpose()?;
        let blob = self.load_blob(id, true).await?;
        Ok(Some(NodeRecord::file(
            id.clone(),
            attributes,
            content,
            blob,
            media_type,
        )))
    }

    async fn import(&self, batch: Vec<NodeRecord>) -> Result<()> {
        for record in &batch {
            if let Some(blob) = &record.blob {
                self.blobs
                    .put(&BlobStore::key(&record.id), blob.data().clone())
                    .await?;
            }
        }
        let mut conn = self.conn.lock().await;
        with_transaction(&mut conn, |tx| {
            for record in &batch {
                insert_record(tx, record)?;
            }
            Ok(())
        })
    }

    async fn clear_all(&self) -> Result<()> {
        {
            let mut conn = self.conn.lock().await;
            with_transaction(&mut conn, |tx| {
                tx.execute_batch("DELETE FROM children; DELETE FROM files; DELETE FROM nodes;")?;
                Ok(())
            })?;
        }
        let count = self.blobs.clear().await?;
        debug!("Cleared store ({count} blobs)", count);
        Ok(())
    }
}

fn query_all<T, P, F>(conn: &Connection, sql: &str, params: P, f: F) -> Result<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> duckdb::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, f)?;
    let values = rows.collect::<duckdb::Result<Vec<T>>>()?;
    Ok(values)
}

fn query_first<T, P, F>(conn: &Connection, sql: &str, params: P, f: F) -> Result<Option<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> duckdb::Result<T>,
{
    Ok(query_all(conn, sql, params, f)?.into_iter().next())
}

fn kind_of(conn: &Connection, id: &NodeId) -> Result<Option<NodeKind>> {
    let Some(kind) = query_first(
        conn,
        "SELECT type FROM nodes WHERE id = ?",
        params![id.as_str()],
        |row| row.get::<_, String>(0),
    )?
    else {
        return Ok(None);
    };
    match NodeKind::parse(&kind) {
        Some(parsed) => Ok(Some(parsed)),
        None => Err(FolioDbError::UnknownKind {
            id: id.clone(),
            kind,
        }),
    }
}

fn require(conn: &Connection, id: &NodeId, kind: NodeKind) -> Result<()> {
    let error = match kind_of(conn, id)? {
        Some(found) if found == kind => return Ok(()),
        None => foliofs::Error::NodeNotFound(id.clone()),
        Some(NodeKind::File) => foliofs::Error::NotAFolder(id.clone()),
        Some(NodeKind::Folder) => foliofs::Error::NotAFile(id.clone()),
    };
    Err(error.into())
}

fn attributes_of(conn: &Connection, id: &NodeId) -> Result<BTreeMap<String, String>> {
    let json = query_first(
        conn,
        "SELECT attributes FROM nodes WHERE id = ?",
        params![id.as_str()],
        |row| row.get::<_, String>(0),
    )?;
    Ok(match json {
        Some(json) => serde_json::from_str(&json)?,
        None => BTreeMap::new(),
    })
}

fn entry_from_row(row: &Row<'_>) -> duckdb::Result<Entry> {
    Ok(Entry::new(
        BindId::from(row.get::<_, String>(0)?),
        row.get::<_, String>(1)?,
        NodeId::from(row.get::<_, String>(2)?),
    ))
}

fn entries(conn: &Connection, folder: &NodeId) -> Result<Vec<Entry>> {
    query_all(
        conn,
        "SELECT bind_id, name, child_id FROM children WHERE parent_id = ? ORDER BY idx",
        params![folder.as_str()],
        entry_from_row,
    )
}

fn child_count(conn: &Connection, folder: &NodeId) -> Result<usize> {
    let count = query_first(
        conn,
        "SELECT COUNT(*) FROM children WHERE parent_id = ?",
        params![folder.as_str()],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count.map_or(0, |n| usize::try_from(n).unwrap_or(0)))
}

/// Shift siblings at and after the target index, then insert the row
fn insert_at(conn: &Connection, folder: &NodeId, entry: &Entry, index: Option<usize>) -> Result<usize> {
    let count = child_count(conn, folder)?;
    let index = index.map_or(count, |i| i.min(count));
    _ = conn.execute(
        "UPDATE children SET idx = idx + 1 WHERE parent_id = ? AND idx >= ?",
        params![folder.as_str(), index as i64],
    )?;
    _ = conn.execute(
        "INSERT INTO children (parent_id, bind_id, name, child_id, idx) VALUES (?, ?, ?, ?, ?)",
        params![
            folder.as_str(),
            entry.bind_id.as_str(),
            entry.name.as_str(),
            entry.node_id.as_str(),
            index as i64
        ],
    )?;
    Ok(index)
}

/// Close gaps so the folder's indices run 0..n-1 again
fn renumber(conn: &Connection, folder: &NodeId) -> Result<()> {
    let rows = query_all(
        conn,
        "SELECT bind_id, idx FROM children WHERE parent_id = ? ORDER BY idx",
        params![folder.as_str()],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
    )?;
    for (position, (bind, idx)) in rows.into_iter().enumerate() {
        let position = position as i64;
        if idx != position {
            _ = conn.execute(
                "UPDATE children SET idx = ? WHERE parent_id = ? AND bind_id = ?",
                params![position, folder.as_str(), bind],
            )?;
        }
    }
    Ok(())
}

fn blob_path(conn: &Connection, id: &NodeId) -> Result<Option<String>> {
    Ok(query_first(
        conn,
        "SELECT blob_path FROM files WHERE id = ?",
        params![id.as_str()],
        |row| row.get::<_, Option<String>>(0),
    )?
    .flatten())
}

/// The node and, for folders, everything reachable below it. Each id is
/// listed once even when the tree has cycles or shared children.
fn subtree(conn: &Connection, id: &NodeId) -> Result<Vec<NodeId>> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    let mut pending = vec![id.clone()];
    while let Some(next) = pending.pop() {
        if !seen.insert(next.clone()) {
            continue;
        }
        let Some(kind) = kind_of(conn, &next)? else {
            continue;
        };
        if kind == NodeKind::Folder {
            pending.extend(entries(conn, &next)?.into_iter().map(|e| e.node_id));
        }
        found.push(next);
    }
    Ok(found)
}

fn delete_rows(conn: &Connection, id: &NodeId) -> Result<()> {
    _ = conn.execute("DELETE FROM children WHERE parent_id = ?", params![id.as_str()])?;
    _ = conn.execute("DELETE FROM files WHERE id = ?", params![id.as_str()])?;
    _ = conn.execute("DELETE FROM nodes WHERE id = ?", params![id.as_str()])?;
    Ok(())
}

fn insert_record(conn: &Connection, record: &NodeRecord) -> Result<()> {
    delete_rows(conn, &record.id)?;
    _ = conn.execute(
        "INSERT INTO nodes (id, type, attributes) VALUES (?, ?, ?)",
        params![
            record.id.as_str(),
            record.kind.as_str(),
            serde_json::to_string(&record.attributes)?
        ],
    )?;

    match record.kind {
        NodeKind::Folder => {
            for (idx, entry) in record.children.iter().flatten().enumerate() {
                _ = conn.execute(
                    "INSERT INTO children (parent_id, bind_id, name, child_id, idx) VALUES (?, ?, ?, ?, ?)",
                    params![
                        record.id.as_str(),
                        entry.bind_id.as_str(),
                        entry.name.as_str(),
                        entry.node_id.as_str(),
                        idx as i64
                    ],
                )?;
            }
        }
        NodeKind::File => {
            let content = record
                .content
                .as_ref()
                .map(Content::to_json_string)
                .transpose()?;
            let blob_key = record
                .blob
                .as_ref()
                .map(|_| BlobStore::key(&record.id).to_string());
            let blob_size = record.blob.as_ref().map(|b| b.len() as i64);
            let media_type = record
                .media_type
                .clone()
                .or_else(|| record.blob.as_ref().map(|b| b.media_type().to_string()));
            _ = conn.execute(
                "INSERT INTO files (id, content, blob_path, blob_size, media_type) VALUES (?, ?, ?, ?, ?)",
                params![record.id.as_str(), content, blob_key, blob_size, media_type],
            )?;
        }
    }
    Ok(())
}

#[async_trait]
impl PersistenceLayer for DuckPersistence {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn create_node(
        &self,
        id: &NodeId,
        kind: NodeKind,
        media_type: Option<&str>,
    ) -> foliofs::Result<()> {
        let mut conn = self.conn.lock().await;
        Ok(with_transaction(&mut conn, |tx| {
            if kind_of(tx, id)?.is_some() {
                return require(tx, id, kind);
            }
            _ = tx.execute(
                "INSERT INTO nodes (id, type, attributes) VALUES (?, ?, '{}')",
                params![id.as_str(), kind.as_str()],
            )?;
            if kind == NodeKind::File {
                _ = tx.execute(
                    "INSERT INTO files (id, content, blob_path, blob_size, media_type) VALUES (?, NULL, NULL, NULL, ?)",
                    params![id.as_str(), media_type],
                )?;
            }
            Ok(())
        })?)
    }

    async fn destroy_node(&self, id: &NodeId) -> foliofs::Result<Vec<NodeId>> {
        Ok(self.destroy_rows(id).await?)
    }

    async fn node_kind(&self, id: &NodeId) -> foliofs::Result<Option<NodeKind>> {
        let conn = self.conn.lock().await;
        Ok(kind_of(&conn, id)?)
    }

    async fn total_size(&self) -> foliofs::Result<u64> {
        let conn = self.conn.lock().await;
        let total = query_first(
            &conn,
            "SELECT CAST(COALESCE(SUM(COALESCE(strlen(content), 0) + COALESCE(blob_size, 0)), 0) AS BIGINT) FROM files",
            [],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(total.map_or(0, |n| u64::try_from(n).unwrap_or(0)))
    }

    async fn list_entries(&self, folder: &NodeId) -> foliofs::Result<Vec<Entry>> {
        let conn = self.conn.lock().await;
        Ok(entries(&conn, folder)?)
    }

    async fn insert_entry(
        &self,
        folder: &NodeId,
        entry: &Entry,
        index: Option<usize>,
    ) -> foliofs::Result<usize> {
        let mut conn = self.conn.lock().await;
        Ok(with_transaction(&mut conn, |tx| {
            require(tx, folder, NodeKind::Folder)?;
            insert_at(tx, folder, entry, index)
        })?)
    }

    async fn remove_entries(
        &self,
        folder: &NodeId,
        binds: &[BindId],
    ) -> foliofs::Result<Vec<BindId>> {
        let mut conn = self.conn.lock().await;
        Ok(with_transaction(&mut conn, |tx| {
            let mut removed = Vec::new();
            for bind in binds {
                let count = tx.execute(
                    "DELETE FROM children WHERE parent_id = ? AND bind_id = ?",
                    params![folder.as_str(), bind.as_str()],
                )?;
                if count > 0 {
                    removed.push(bind.clone());
                }
            }
            if !removed.is_empty() {
                renumber(tx, folder)?;
            }
            Ok(removed)
        })?)
    }

    async fn rename_entry(&self, folder: &NodeId, bind: &BindId, name: &str) -> foliofs::Result<bool> {
        let mut conn = self.conn.lock().await;
        Ok(with_transaction(&mut conn, |tx| {
            let count = tx.execute(
                "UPDATE children SET name = ? WHERE parent_id = ? AND bind_id = ?",
                params![name, folder.as_str(), bind.as_str()],
            )?;
            Ok(count > 0)
        })?)
    }

    async fn move_entry(
        &self,
        from: &NodeId,
        bind: &BindId,
        to: &NodeId,
        index: Option<usize>,
    ) -> foliofs::Result<Option<usize>> {
        let mut conn = self.conn.lock().await;
        Ok(with_transaction(&mut conn, |tx| {
            let Some(entry) = query_first(
                tx,
                "SELECT bind_id, name, child_id FROM children WHERE parent_id = ? AND bind_id = ?",
                params![from.as_str(), bind.as_str()],
                entry_from_row,
            )?
            else {
                return Ok(None);
            };
            require(tx, to, NodeKind::Folder)?;

            _ = tx.execute(
                "DELETE FROM children WHERE parent_id = ? AND bind_id = ?",
                params![from.as_str(), bind.as_str()],
            )?;
            renumber(tx, from)?;
            insert_at(tx, to, &entry, index).map(Some)
        })?)
    }

    async fn get_entry(&self, folder: &NodeId, bind: &BindId) -> foliofs::Result<Option<Entry>> {
        let conn = self.conn.lock().await;
        Ok(query_first(
            &conn,
            "SELECT bind_id, name, child_id FROM children WHERE parent_id = ? AND bind_id = ?",
            params![folder.as_str(), bind.as_str()],
            entry_from_row,
        )?)
    }

    async fn entries_by_name(&self, folder: &NodeId, name: &str) -> foliofs::Result<Vec<Entry>> {
        let conn = self.conn.lock().await;
        Ok(query_all(
            &conn,
            "SELECT bind_id, name, child_id FROM children WHERE parent_id = ? AND name = ? ORDER BY idx",
            params![folder.as_str(), name],
            entry_from_row,
        )?)
    }

    async fn binds_for_node(&self, folder: &NodeId, node: &NodeId) -> foliofs::Result<Vec<BindId>> {
        let conn = self.conn.lock().await;
        Ok(query_all(
            &conn,
            "SELECT bind_id FROM children WHERE parent_id = ? AND child_id = ? ORDER BY idx",
            params![folder.as_str(), node.as_str()],
            |row| Ok(BindId::from(row.get::<_, String>(0)?)),
        )?)
    }

    async fn attributes(&self, id: &NodeId) -> foliofs::Result<BTreeMap<String, String>> {
        let conn = self.conn.lock().await;
        Ok(attributes_of(&conn, id)?)
    }

    async fn set_attribute(&self, id: &NodeId, key: &str, value: Option<&str>) -> foliofs::Result<()> {
        let mut conn = self.conn.lock().await;
        Ok(with_transaction(&mut conn, |tx| {
            if kind_of(tx, id)?.is_none() {
                return Err(foliofs::Error::NodeNotFound(id.clone()).into());
            }
            let mut attributes = attributes_of(tx, id)?;
            match value {
                Some(value) => {
                    _ = attributes.insert(key.to_string(), value.to_string());
                }
                None => {
                    _ = attributes.remove(key);
                }
            }
            _ = tx.execute(
                "UPDATE nodes SET attributes = ? WHERE id = ?",
                params![serde_json::to_string(&attributes)?, id.as_str()],
            )?;
            Ok(())
        })?)
    }

    async fn read_content(&self, file: &NodeId) -> foliofs::Result<Option<Content>> {
        let json = {
            let conn = self.conn.lock().await;
            query_first(
                &conn,
                "SELECT content FROM files WHERE id = ?",
                params![file.as_str()],
                |row| row.get::<_, Option<String>>(0),
            )?
            .flatten()
        };
        json.as_deref().map(Content::from_json_str).transpose()
    }

    async fn write_content(&self, file: &NodeId, content: &Content) -> foliofs::Result<()> {
        Ok(self.write_content_row(file, content).await?)
    }

    async fn read_blob(&self, file: &NodeId) -> foliofs::Result<Option<Blob>> {
        Ok(self.load_blob(file, false).await?)
    }

    async fn write_blob(&self, file: &NodeId, blob: &Blob) -> foliofs::Result<()> {
        Ok(self.write_blob_row(file, blob).await?)
    }

    async fn media_type(&self, file: &NodeId) -> foliofs::Result<Option<String>> {
        let conn = self.conn.lock().await;
        Ok(query_first(
            &conn,
            "SELECT media_type FROM files WHERE id = ?",
            params![file.as_str()],
            |row| row.get::<_, Option<String>>(0),
        )?
        .flatten())
    }

    async fn node_ids(&self) -> foliofs::Result<Vec<NodeId>> {
        let conn = self.conn.lock().await;
        Ok(query_all(
            &conn,
            "SELECT id FROM nodes ORDER BY id",
            [],
            |row| Ok(NodeId::from(row.get::<_, String>(0)?)),
        )?)
    }

    async fn node_ids_after(
        &self,
        after: Option<&NodeId>,
        limit: usize,
    ) -> foliofs::Result<Vec<NodeId>> {
        let conn = self.conn.lock().await;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let id = |row: &Row<'_>| -> duckdb::Result<NodeId> {
            Ok(NodeId::from(row.get::<_, String>(0)?))
        };
        Ok(match after {
            Some(after) => query_all(
                &conn,
                "SELECT id FROM nodes WHERE id > ? ORDER BY id LIMIT ?",
                params![after.as_str(), limit],
                id,
            )?,
            None => query_all(&conn, "SELECT id FROM nodes ORDER BY id LIMIT ?", params![limit], id)?,
        })
    }

    async fn node_count(&self) -> foliofs::Result<usize> {
        let conn = self.conn.lock().await;
        let count = query_first(&conn, "SELECT COUNT(*) FROM nodes", [], |row| {
            row.get::<_, i64>(0)
        })?;
        Ok(count.map_or(0, |n| usize::try_from(n).unwrap_or(0)))
    }

    async fn export_node(&self, id: &NodeId) -> foliofs::Result<Option<NodeRecord>> {
        Ok(self.export(id).await?)
    }

    async fn clear(&self) -> foliofs::Result<()> {
        Ok(self.clear_all().await?)
    }

    async fn import_batch(&self, batch: Vec<NodeRecord>) -> foliofs::Result<()> {
        Ok(self.import(batch).await?)
    }

    async fn persist(&self) -> foliofs::Result<()> {
        if !self.checkpoint_on_persist {
            return Ok(());
        }
        let conn = self.conn.lock().await;
        conn.execute_batch("CHECKPOINT")
            .map_err(|e| foliofs::Error::from(FolioDbError::from(e)))
    }
}
