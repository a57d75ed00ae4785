//! Media resources and the converter collaborator.
//!
//! The filesystem never encodes images or video itself. A
//! [`MediaConverter`] turns a caller-side resource into a [`Storable`]
//! (a blob, inline content, or a remote reference) and back.

use crate::content::{Blob, Content};
use crate::error::{Error, Result};
use crate::fs::FS;
use crate::id::{FileSystemId, NodeId};
use async_trait::async_trait;
use diagnostics::*;
use std::collections::HashMap;

const REMOTE_KEY: &str = "__remote__";

/// Storage form of a media resource. At most one of `blob`, `content` and
/// `remote` is expected to be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Storable {
    pub blob: Option<Blob>,
    pub content: Option<Content>,
    pub remote: Option<String>,
    pub media_type: Option<String>,
}

impl Storable {
    #[must_use]
    pub fn blob(blob: Blob) -> Self {
        Self {
            media_type: Some(blob.media_type().to_string()),
            blob: Some(blob),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn content(content: Content) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn remote<S: Into<String>>(uri: S) -> Self {
        Self {
            remote: Some(uri.into()),
            ..Default::default()
        }
    }

    /// Inline form of a remote reference
    pub(crate) fn remote_content(uri: &str) -> Content {
        Content::object([(REMOTE_KEY, Content::from(uri))])
    }

    /// Recognise inline content written by [`Storable::remote_content`]
    pub(crate) fn from_inline(content: Content, media_type: Option<String>) -> Self {
        if let Content::Object(map) = &content {
            if map.len() == 1 {
                if let Some(uri) = map.get(REMOTE_KEY).and_then(Content::as_str) {
                    return Self {
                        remote: Some(uri.to_string()),
                        media_type,
                        ..Default::default()
                    };
                }
            }
        }
        Self {
            content: Some(content),
            media_type,
            ..Default::default()
        }
    }
}

/// Converts caller resources to and from their stored form
#[async_trait]
pub trait MediaConverter: Send + Sync {
    type Resource: Send + Sync;

    async fn to_storable(&self, resource: &Self::Resource) -> Result<Storable>;

    async fn from_storable(&self, stored: Storable) -> Result<Self::Resource>;
}

/// Where a tracked resource has been saved in one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedState {
    pub id: NodeId,
    pub dirty: bool,
}

/// A resource together with its save state in every backend it has been
/// written to.
///
/// The wrapper owns the resource, so the bookkeeping never has to be
/// attached to an externally owned object.
#[derive(Debug, Clone)]
pub struct Tracked<R> {
    resource: R,
    per_backend: HashMap<FileSystemId, SavedState>,
}

impl<R> Tracked<R> {
    pub fn new(resource: R) -> Self {
        Self {
            resource,
            per_backend: HashMap::new(),
        }
    }

    /// Adopt a resource just loaded from `fs` as node `id`
    pub fn loaded(resource: R, fs: &FS, id: NodeId) -> Self {
        let mut tracked = Self::new(resource);
        _ = tracked
            .per_backend
            .insert(fs.id().clone(), SavedState { id, dirty: false });
        tracked
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Mutable access marks every backend copy dirty
    pub fn resource_mut(&mut self) -> &mut R {
        for state in self.per_backend.values_mut() {
            state.dirty = true;
        }
        &mut self.resource
    }

    pub fn into_inner(self) -> R {
        self.resource
    }

    pub fn saved_state(&self, fs_id: &FileSystemId) -> Option<&SavedState> {
        self.per_backend.get(fs_id)
    }

    /// Write the resource to `fs` unless it is already saved there and
    /// clean. Returns the node id holding it.
    pub async fn save<C>(&mut self, fs: &FS, converter: &C) -> Result<NodeId>
    where
        C: MediaConverter<Resource = R> + ?Sized,
        R: Send + Sync,
    {
        let file = match self.per_backend.get(fs.id()) {
            Some(state) if !state.dirty => return Ok(state.id.clone()),
            Some(state) => match fs.get_node(&state.id).await? {
                Some(node) => match node.as_file() {
                    Some(file) => file,
                    None => {
                        // The id was reused for a folder; save under a fresh one
                        warn!("Saved id {node_id} is no longer a file", node_id: state.id.as_str());
                        fs.create_file(None).await?
                    }
                },
                None => fs.create_file_with_id(state.id.clone(), None).await?,
            },
            None => fs.create_file(None).await?,
        };

        file.write_media_resource(converter, &self.resource).await?;
        let id = file.id().clone();
        _ = self.per_backend.insert(
            fs.id().clone(),
            SavedState {
                id: id.clone(),
                dirty: false,
            },
        );
        Ok(id)
    }
}

pub(crate) fn nothing_to_store() -> Error {
    Error::Media("converter produced no blob, content or remote reference".to_string())
}
