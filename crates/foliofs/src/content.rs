// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structured file content and binary payloads.
//!
//! A [`Content`] is a JSON-like tree that may hold a [`Blob`] at any depth.
//! Its textual form rewrites every blob into a tagged envelope
//!
//! ```json
//! {"__blob__": true, "data": "data:image/png;base64,iVBO...", "type": "image/png"}
//! ```
//!
//! so the surrounding structure stays plain JSON. The same form is used for
//! inline storage and for snapshot records.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

const BLOB_TAG: &str = "__blob__";
const BLOB_DATA: &str = "data";
const BLOB_TYPE: &str = "type";

/// A binary resource tagged with its media type
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    media_type: String,
    data: Bytes,
}

impl Blob {
    pub const DEFAULT_MEDIA_TYPE: &'static str = "application/octet-stream";

    pub fn new<M: Into<String>, D: Into<Bytes>>(media_type: M, data: D) -> Self {
        let media_type = media_type.into();
        Self {
            media_type: if media_type.is_empty() {
                Self::DEFAULT_MEDIA_TYPE.to_string()
            } else {
                media_type
            },
            data: data.into(),
        }
    }

    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Self-describing textual literal: `data:<media type>;base64,<payload>`
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.data))
    }

    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidBlob("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidBlob("missing payload separator".to_string()))?;

        match header.strip_suffix(";base64") {
            Some(media_type) => {
                let bytes = STANDARD
                    .decode(payload)
                    .map_err(|e| Error::InvalidBlob(e.to_string()))?;
                Ok(Blob::new(media_type, bytes))
            }
            None => Ok(Blob::new(header, Bytes::copy_from_slice(payload.as_bytes()))),
        }
    }

    fn to_envelope(&self) -> Value {
        let mut map = Map::new();
        _ = map.insert(BLOB_TAG.to_string(), Value::Bool(true));
        _ = map.insert(BLOB_DATA.to_string(), Value::String(self.to_data_url()));
        _ = map.insert(BLOB_TYPE.to_string(), Value::String(self.media_type.clone()));
        Value::Object(map)
    }

    /// `None` when `map` is not an envelope at all.
    fn from_envelope(map: &Map<String, Value>) -> Option<Result<Self>> {
        if map.get(BLOB_TAG) != Some(&Value::Bool(true)) {
            return None;
        }
        let Some(Value::String(url)) = map.get(BLOB_DATA) else {
            return Some(Err(Error::InvalidBlob(
                "envelope without a data literal".to_string(),
            )));
        };
        Some(Blob::from_data_url(url).map(|blob| match map.get(BLOB_TYPE) {
            Some(Value::String(media_type)) if !media_type.is_empty() => {
                Blob::new(media_type.clone(), blob.data)
            }
            _ => blob,
        }))
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("media_type", &self.media_type)
            .field("len", &self.data.len())
            .finish()
    }
}

impl Serialize for Blob {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_envelope().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Blob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::Object(map) => Blob::from_envelope(map)
                .unwrap_or_else(|| Err(Error::InvalidBlob("not a blob envelope".to_string())))
                .map_err(D::Error::custom),
            Value::String(url) => Blob::from_data_url(url).map_err(D::Error::custom),
            _ => Err(D::Error::custom("expected a blob envelope")),
        }
    }
}

/// Inline structured content of a file
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Content {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Content>),
    Object(BTreeMap<String, Content>),
    Blob(Blob),
}

impl Content {
    /// Build an object from key/value pairs
    pub fn object<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Content)>,
    {
        Content::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Textual form, with every nested blob rewritten to an envelope
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Content::Null => Value::Null,
            Content::Bool(b) => Value::Bool(*b),
            Content::Number(n) => Value::Number(n.clone()),
            Content::String(s) => Value::String(s.clone()),
            Content::Array(items) => Value::Array(items.iter().map(Content::to_json).collect()),
            Content::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Content::Blob(blob) => blob.to_envelope(),
        }
    }

    /// Inverse of [`Content::to_json`]: envelopes at any depth become blobs
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(match value {
            Value::Null => Content::Null,
            Value::Bool(b) => Content::Bool(b),
            Value::Number(n) => Content::Number(n),
            Value::String(s) => Content::String(s),
            Value::Array(items) => Content::Array(
                items
                    .into_iter()
                    .map(Content::from_json)
                    .collect::<Result<_>>()?,
            ),
            Value::Object(map) => {
                if let Some(blob) = Blob::from_envelope(&map) {
                    return blob.map(Content::Blob);
                }
                let mut out = BTreeMap::new();
                for (k, v) in map {
                    _ = out.insert(k, Content::from_json(v)?);
                }
                Content::Object(out)
            }
        })
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Content::from_json(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json())?)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Content> {
        match self {
            Content::Object(map) => map.get(key),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Content::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Content::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Depth-first visit of every string leaf
    pub fn for_each_str<F: FnMut(&str)>(&self, f: &mut F) {
        match self {
            Content::String(s) => f(s),
            Content::Array(items) => items.iter().for_each(|c| c.for_each_str(f)),
            Content::Object(map) => map.values().for_each(|c| c.for_each_str(f)),
            _ => {}
        }
    }

    /// Every blob in depth-first order
    #[must_use]
    pub fn blobs(&self) -> Vec<&Blob> {
        let mut out = Vec::new();
        self.collect_blobs(&mut out);
        out
    }

    fn collect_blobs<'a>(&'a self, out: &mut Vec<&'a Blob>) {
        match self {
            Content::Blob(b) => out.push(b),
            Content::Array(items) => items.iter().for_each(|c| c.collect_blobs(out)),
            Content::Object(map) => map.values().for_each(|c| c.collect_blobs(out)),
            _ => {}
        }
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Content::from_json(value).map_err(D::Error::custom)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::String(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::String(s)
    }
}

impl From<bool> for Content {
    fn from(b: bool) -> Self {
        Content::Bool(b)
    }
}

impl From<i64> for Content {
    fn from(n: i64) -> Self {
        Content::Number(n.into())
    }
}

impl From<Blob> for Content {
    fn from(b: Blob) -> Self {
        Content::Blob(b)
    }
}

impl From<Vec<Content>> for Content {
    fn from(items: Vec<Content>) -> Self {
        Content::Array(items)
    }
}
