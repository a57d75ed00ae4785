use crate::file::File;
use crate::folder::Folder;
use crate::fs::FS;
use crate::id::NodeId;
use serde::{Deserialize, Serialize};

/// Capability of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "file" => Some(NodeKind::File),
            "folder" => Some(NodeKind::Folder),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved node: identity, capability and the filesystem that owns it
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    fs: FS,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, fs: FS) -> Self {
        Self { id, kind, fs }
    }

    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[must_use]
    pub fn fs(&self) -> &FS {
        &self.fs
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// `None` when this node is a folder
    #[must_use]
    pub fn as_file(&self) -> Option<File> {
        match self.kind {
            NodeKind::File => Some(File::new(self.id.clone(), self.fs.clone())),
            NodeKind::Folder => None,
        }
    }

    /// `None` when this node is a file
    #[must_use]
    pub fn as_folder(&self) -> Option<Folder> {
        match self.kind {
            NodeKind::Folder => Some(Folder::new(self.id.clone(), self.fs.clone())),
            NodeKind::File => None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        self.id == other.id && self.fs.id() == other.fs.id()
    }
}
