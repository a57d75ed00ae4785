// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::fs::FS;
use crate::id::NodeId;
use async_stream::try_stream;
use bytes::Bytes;
use diagnostics::*;
use futures::{Stream, StreamExt, pin_mut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Totals from [`dump_to_writer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpStats {
    pub records: usize,
    pub bytes: u64,
}

/// Ids fetched per round trip while dumping
pub const DUMP_PAGE_SIZE: usize = 500;

/// Export every node as one newline-terminated JSON record.
///
/// Node ids are walked a page at a time and records are produced on
/// demand, one per poll, so at most one page of ids is held at once.
/// `on_progress` receives the completed fraction after each record; the
/// total is counted up front and may drift if the tree changes mid-dump.
pub fn dump<'a, F>(fs: &'a FS, mut on_progress: F) -> impl Stream<Item = Result<Bytes>> + 'a
where
    F: FnMut(f64) + Send + 'a,
{
    try_stream! {
        let total = fs.persistence().node_count().await?;
        debug!("Dumping {total} nodes", total);

        let mut done = 0usize;
        let mut after: Option<NodeId> = None;
        loop {
            let page = fs
                .persistence()
                .node_ids_after(after.as_ref(), DUMP_PAGE_SIZE)
                .await?;
            let full = page.len() == DUMP_PAGE_SIZE;
            for id in &page {
                // Vanished between enumeration and export
                let Some(record) = fs.persistence().export_node(id).await? else {
                    continue;
                };
                let mut line = record.to_line()?;
                line.push('\n');
                yield Bytes::from(line);
                done += 1;
                on_progress(done as f64 / total.max(done) as f64);
            }
            if !full {
                break;
            }
            after = page.last().cloned();
        }
        if done == 0 {
            on_progress(1.0);
        }
    }
}

/// Drive [`dump`] into `writer`
pub async fn dump_to_writer<W, F>(fs: &FS, writer: &mut W, on_progress: F) -> Result<DumpStats>
where
    W: AsyncWrite + Unpin + ?Sized,
    F: FnMut(f64) + Send,
{
    let stream = dump(fs, on_progress);
    pin_mut!(stream);

    let mut stats = DumpStats::default();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        stats.records += 1;
        stats.bytes += chunk.len() as u64;
    }
    writer.flush().await?;

    let records = stats.records;
    let bytes = stats.bytes;
    info!("Dumped {records} records ({bytes} bytes)", records, bytes);
    Ok(stats)
}
