//! Table layout of a folio database.
//!
//! `children.idx` is contiguous from 0 within each parent. Ids are not
//! declared as keys; uniqueness is maintained by the writer.

use crate::error::Result;
use duckdb::Connection;

pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS nodes (
    id VARCHAR NOT NULL,
    type VARCHAR NOT NULL,
    attributes VARCHAR NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS children (
    parent_id VARCHAR NOT NULL,
    bind_id VARCHAR NOT NULL,
    name VARCHAR NOT NULL,
    child_id VARCHAR NOT NULL,
    idx BIGINT NOT NULL
);

CREATE INDEX IF NOT EXISTS children_order ON children (parent_id, idx);

CREATE TABLE IF NOT EXISTS files (
    id VARCHAR NOT NULL,
    content VARCHAR,
    blob_path VARCHAR,
    blob_size BIGINT,
    media_type VARCHAR
);
";

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
