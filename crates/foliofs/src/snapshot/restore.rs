// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::record::NodeRecord;
use crate::error::{Error, Result};
use crate::fs::FS;
use async_trait::async_trait;
use bytes::Bytes;
use diagnostics::*;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncReadExt};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

const CHUNK_SIZE: usize = 64 * 1024;

/// A snapshot that can be read from the start more than once.
///
/// Restore opens it twice: one pass counts lines for progress, the other
/// parses records.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn open(&self) -> Result<Box<dyn AsyncRead + Send + Unpin>>;
}

#[async_trait]
impl SnapshotSource for PathBuf {
    async fn open(&self) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        let file = tokio::fs::File::open(self).await?;
        Ok(Box::new(file))
    }
}

#[async_trait]
impl SnapshotSource for Bytes {
    async fn open(&self) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        Ok(Box::new(std::io::Cursor::new(self.clone())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Records per import transaction
    pub batch_size: usize,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreStats {
    pub lines: usize,
    pub records: usize,
    pub blobs: usize,
    pub batches: usize,
}

/// Splits a byte stream into lines, carrying a partial line over to the
/// next chunk.
#[derive(Debug, Default)]
pub struct LineSplitter {
    carry: Vec<u8>,
}

impl LineSplitter {
    /// Complete lines in `chunk`, without their terminators
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut start = 0;
        for (pos, byte) in chunk.iter().enumerate() {
            if *byte == b'\n' {
                let mut line = std::mem::take(&mut self.carry);
                line.extend_from_slice(&chunk[start..pos]);
                if line.last() == Some(&b'\r') {
                    _ = line.pop();
                }
                lines.push(line);
                start = pos + 1;
            }
        }
        self.carry.extend_from_slice(&chunk[start..]);
        lines
    }

    /// The unterminated tail, if any
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.carry.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.carry))
        }
    }
}

async fn count_lines(mut reader: Box<dyn AsyncRead + Send + Unpin>) -> Result<usize> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut lines = 0;
    let mut last = None;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        lines += buf[..n].iter().filter(|b| **b == b'\n').count();
        last = Some(buf[n - 1]);
    }
    if matches!(last, Some(b) if b != b'\n') {
        lines += 1;
    }
    Ok(lines)
}

struct Importer<'a, F> {
    fs: &'a FS,
    batch_size: usize,
    batch: Vec<NodeRecord>,
    stats: RestoreStats,
    total: usize,
    on_progress: F,
}

impl<F: FnMut(f64)> Importer<'_, F> {
    async fn line(&mut self, raw: Vec<u8>) -> Result<()> {
        self.stats.lines += 1;
        let line = self.stats.lines;
        let text = String::from_utf8(raw).map_err(|e| Error::format(line, e.to_string()))?;
        if !text.trim().is_empty() {
            let record = NodeRecord::from_line(line, &text)?;
            if record.blob.is_some() {
                self.stats.blobs += 1;
            }
            self.stats.records += 1;
            self.batch.push(record);
            if self.batch.len() >= self.batch_size {
                self.flush().await?;
            }
        }
        (self.on_progress)(line as f64 / self.total.max(line) as f64);
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let batch = std::mem::replace(&mut self.batch, Vec::with_capacity(self.batch_size));
        let count = batch.len();
        self.fs.persistence().import_batch(batch).await?;
        self.fs.persist().await?;
        self.stats.batches += 1;
        debug!("Imported batch of {count} records", count);
        Ok(())
    }
}

/// Replace the whole contents of `fs` with the snapshot in `source`.
///
/// Existing rows and blobs are cleared first; restore never merges. Records
/// are imported in batches of `options.batch_size`, each in one transaction
/// followed by a persist. A failure leaves the batches already imported in
/// place, so recovery means restoring again from the start.
pub async fn restore<S, F>(
    fs: &FS,
    source: &S,
    options: RestoreOptions,
    on_progress: F,
) -> Result<RestoreStats>
where
    S: SnapshotSource + ?Sized,
    F: FnMut(f64),
{
    let total = count_lines(source.open().await?).await?;
    info!("Restoring snapshot of {total} lines", total);

    fs.persistence().clear().await?;

    let batch_size = options.batch_size.max(1);
    let mut importer = Importer {
        fs,
        batch_size,
        batch: Vec::with_capacity(batch_size),
        stats: RestoreStats::default(),
        total,
        on_progress,
    };

    let mut reader = source.open().await?;
    let mut splitter = LineSplitter::default();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        for line in splitter.push(&buf[..n]) {
            importer.line(line).await?;
        }
    }
    if let Some(tail) = splitter.finish() {
        importer.line(tail).await?;
    }
    importer.flush().await?;

    // A snapshot without a root record still yields a usable tree
    _ = fs.get_root().await?;

    let stats = importer.stats;
    let records = stats.records;
    let batches = stats.batches;
    info!("Restored {records} records in {batches} batches", records, batches);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_spanning_chunks() {
        let mut splitter = LineSplitter::default();
        assert!(splitter.push(b"{\"a\":").is_empty());
        assert!(splitter.push(b"1}").is_empty());
        let lines = splitter.push(b"\n{\"b\":2}\r\n{\"c\"");
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec(), b"{\"b\":2}".to_vec()]);
        assert_eq!(splitter.finish(), Some(b"{\"c\"".to_vec()));
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_multibyte_split() {
        let text = "{\"name\":\"caf\u{e9}\"}\n".as_bytes();
        let mut splitter = LineSplitter::default();
        let mut lines = Vec::new();
        for chunk in text.chunks(1) {
            lines.extend(splitter.push(chunk));
        }
        assert_eq!(lines.len(), 1);
        assert_eq!(String::from_utf8(lines.remove(0)).unwrap(), "{\"name\":\"caf\u{e9}\"}");
    }

    #[tokio::test]
    async fn test_count_lines() {
        let source = Bytes::from_static(b"a\nb\nc");
        assert_eq!(count_lines(source.open().await.unwrap()).await.unwrap(), 3);
        let source = Bytes::from_static(b"a\nb\n");
        assert_eq!(count_lines(source.open().await.unwrap()).await.unwrap(), 2);
        let source = Bytes::new();
        assert_eq!(count_lines(source.open().await.unwrap()).await.unwrap(), 0);
    }
}
