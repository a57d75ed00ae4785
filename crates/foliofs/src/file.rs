// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::content::{Blob, Content};
use crate::error::Result;
use crate::fs::FS;
use crate::id::NodeId;
use crate::media::{self, MediaConverter, Storable};
use crate::node::{Node, NodeKind};
use diagnostics::*;

/// File capability of a node.
///
/// A file holds either inline [`Content`] or a [`Blob`], never both. Each
/// write replaces whichever form was stored before.
#[derive(Clone, Debug)]
pub struct File {
    id: NodeId,
    fs: FS,
}

impl File {
    pub(crate) fn new(id: NodeId, fs: FS) -> Self {
        Self { id, fs }
    }

    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[must_use]
    pub fn fs(&self) -> &FS {
        &self.fs
    }

    #[must_use]
    pub fn node(&self) -> Node {
        Node::new(self.id.clone(), NodeKind::File, self.fs.clone())
    }

    /// Inline content; `None` when the file is empty or holds a blob
    pub async fn read(&self) -> Result<Option<Content>> {
        self.fs.persistence().read_content(&self.id).await
    }

    pub async fn write(&self, content: &Content) -> Result<()> {
        self.fs
            .persistence()
            .write_content(&self.id, content)
            .await?;
        self.fs.flush().await
    }

    /// Blob payload; `None` when the file is empty or holds inline content
    pub async fn read_blob(&self) -> Result<Option<Blob>> {
        self.fs.persistence().read_blob(&self.id).await
    }

    pub async fn write_blob(&self, blob: &Blob) -> Result<()> {
        let size = blob.len();
        debug!("Writing {size} byte blob to {file}", size, file: self.id.as_str());
        self.fs.persistence().write_blob(&self.id, blob).await?;
        self.fs.flush().await
    }

    pub async fn media_type(&self) -> Result<Option<String>> {
        self.fs.persistence().media_type(&self.id).await
    }

    /// Decode the stored form through `converter`; `None` when nothing has
    /// been written yet.
    pub async fn read_media_resource<C>(&self, converter: &C) -> Result<Option<C::Resource>>
    where
        C: MediaConverter + ?Sized,
    {
        let media_type = self.media_type().await?;
        let stored = if let Some(blob) = self.read_blob().await? {
            Storable {
                blob: Some(blob),
                media_type,
                ..Default::default()
            }
        } else if let Some(content) = self.read().await? {
            Storable::from_inline(content, media_type)
        } else {
            return Ok(None);
        };
        Ok(Some(converter.from_storable(stored).await?))
    }

    /// Encode `resource` through `converter` and store whichever form it
    /// produced. A blob wins over content, content over a remote reference.
    pub async fn write_media_resource<C>(&self, converter: &C, resource: &C::Resource) -> Result<()>
    where
        C: MediaConverter + ?Sized,
    {
        let stored = converter.to_storable(resource).await?;
        match stored {
            Storable {
                blob: Some(blob),
                media_type,
                ..
            } => {
                let blob = match media_type {
                    Some(mt) if mt != blob.media_type() => Blob::new(mt, blob.data().clone()),
                    _ => blob,
                };
                self.write_blob(&blob).await
            }
            Storable {
                content: Some(content),
                ..
            } => self.write(&content).await,
            Storable {
                remote: Some(uri), ..
            } => self.write(&Storable::remote_content(&uri)).await,
            _ => Err(media::nothing_to_store()),
        }
    }
}

impl PartialEq for File {
    fn eq(&self, other: &File) -> bool {
        self.id == other.id && self.fs == other.fs
    }
}
