// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Opaque identifiers for nodes, links and filesystem instances.
//!
//! All three are UUIDv7 strings: globally unique and, because the leading
//! bits are a millisecond timestamp, lexicographically ordered by creation
//! time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const NIL: &str = "00000000-0000-0000-0000-000000000000";

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Allocate a fresh time-ordered identifier
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid7::uuid7().to_string())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

opaque_id!(
    /// Names a storage object (file or folder)
    NodeId
);

opaque_id!(
    /// Names one link to a node inside one folder. Stable across rename and move.
    BindId
);

opaque_id!(
    /// Names a backend instance; callers use it to namespace per-instance caches
    FileSystemId
);

impl NodeId {
    /// The root folder has the same id on every backend.
    #[must_use]
    pub fn root() -> Self {
        Self(NIL.to_string())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == NIL
    }

    /// True when `s` has the canonical 8-4-4-4-12 hex layout of an id.
    ///
    /// Ids are opaque, so this only recognises ids generated by this crate.
    #[must_use]
    pub fn looks_like_id(s: &str) -> bool {
        s.len() == 36
            && s.char_indices().all(|(i, c)| match i {
                8 | 13 | 18 | 23 => c == '-',
                _ => c.is_ascii_hexdigit(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_time_ordered() {
        let ids: Vec<NodeId> = (0..64).map(|_| NodeId::generate()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = BindId::generate();
        let b = BindId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_looks_like_id() {
        assert!(NodeId::looks_like_id(NodeId::generate().as_str()));
        assert!(NodeId::looks_like_id(NodeId::root().as_str()));
        assert!(!NodeId::looks_like_id("Desktop"));
        assert!(!NodeId::looks_like_id("0000000-00000-0000-0000-000000000000"));
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = NodeId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let back: NodeId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }
}
