// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::content::{Blob, Content};
use crate::error::{Error, Result};
use crate::folder::Entry;
use crate::id::NodeId;
use crate::node::NodeKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One line of a snapshot stream: a node row merged with its payload.
///
/// Files carry `content` or `blob` (plus `mediaType`); folders carry their
/// complete ordered `children`, which is what lets a restore accept records
/// in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub content: Option<Content>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<Blob>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Entry>>,
}

/// A present `content` field, even `null`, is stored content
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Content>, D::Error> {
    Content::deserialize(deserializer).map(Some)
}

impl NodeRecord {
    #[must_use]
    pub fn folder(id: NodeId, attributes: BTreeMap<String, String>, children: Vec<Entry>) -> Self {
        Self {
            id,
            kind: NodeKind::Folder,
            attributes,
            content: None,
            blob: None,
            media_type: None,
            children: Some(children),
        }
    }

    #[must_use]
    pub fn file(
        id: NodeId,
        attributes: BTreeMap<String, String>,
        content: Option<Content>,
        blob: Option<Blob>,
        media_type: Option<String>,
    ) -> Self {
        Self {
            id,
            kind: NodeKind::File,
            attributes,
            content,
            blob,
            media_type,
            children: None,
        }
    }

    /// JSON text without the trailing newline
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse one line; `line` is 1-based and only used for error reporting
    pub fn from_line(line: usize, text: &str) -> Result<Self> {
        let record: NodeRecord =
            serde_json::from_str(text).map_err(|e| Error::format(line, e.to_string()))?;
        record.validate(line)?;
        Ok(record)
    }

    fn validate(&self, line: usize) -> Result<()> {
        match self.kind {
            NodeKind::Folder if self.content.is_some() || self.blob.is_some() => Err(
                Error::format(line, format!("folder {} carries file payload", self.id)),
            ),
            NodeKind::File if self.children.is_some() => Err(Error::format(
                line,
                format!("file {} carries children", self.id),
            )),
            NodeKind::File if self.content.is_some() && self.blob.is_some() => Err(
                Error::format(line, format!("file {} has both content and blob", self.id)),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::BindId;

    #[test]
    fn test_folder_record_shape() {
        let child = NodeId::generate();
        let bind = BindId::generate();
        let record = NodeRecord::folder(
            NodeId::root(),
            BTreeMap::new(),
            vec![Entry::new(bind.clone(), "Desktop", child.clone())],
        );
        let value: serde_json::Value = serde_json::from_str(&record.to_line().unwrap()).unwrap();
        assert_eq!(value["type"], "folder");
        assert_eq!(value["children"][0][0], bind.as_str());
        assert_eq!(value["children"][0][1], "Desktop");
        assert_eq!(value["children"][0][2], child.as_str());
        assert!(value.get("content").is_none());
    }

    #[test]
    fn test_file_record_uses_media_type_key() {
        let record = NodeRecord::file(
            NodeId::generate(),
            BTreeMap::new(),
            None,
            Some(Blob::new("image/png", vec![1u8, 2])),
            Some("image/png".to_string()),
        );
        let line = record.to_line().unwrap();
        assert!(line.contains("\"mediaType\":\"image/png\""));
        assert!(line.contains("\"__blob__\":true"));
        assert_eq!(NodeRecord::from_line(1, &line).unwrap(), record);
    }

    #[test]
    fn test_null_content_is_kept() {
        let id = NodeId::generate();
        let line = format!(r#"{{"id":"{id}","type":"file","attributes":{{}},"content":null}}"#);
        let record = NodeRecord::from_line(1, &line).unwrap();
        assert_eq!(record.content, Some(Content::Null));
    }

    #[test]
    fn test_malformed_line_reports_position() {
        match NodeRecord::from_line(7, "{not json") {
            Err(Error::Format { line, .. }) => assert_eq!(line, 7),
            other => panic!("unexpected {other:?}"),
        }
        let id = NodeId::generate();
        let bad = format!(r#"{{"id":"{id}","type":"folder","content":1}}"#);
        assert!(matches!(
            NodeRecord::from_line(2, &bad),
            Err(Error::Format { line: 2, .. })
        ));
    }
}
