use std::fmt;

use bytes::Bytes;
use serde::Serialize;

/// Identity of a submitted file: `(name, last_modified, size)`.
///
/// Selecting the same file twice yields the same identity, which is how the
/// registry recognises resubmissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId {
    name: String,
    last_modified: u64,
    size: u64,
}

impl ItemId {
    pub fn new(name: impl Into<String>, last_modified: u64, size: u64) -> Self {
        Self {
            name: name.into(),
            last_modified,
            size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last-modified timestamp in milliseconds since the Unix epoch.
    pub fn last_modified(&self) -> u64 {
        self.last_modified
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.name, self.last_modified, self.size)
    }
}

/// A file handed over by the shell, with its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub last_modified: u64,
    pub bytes: Bytes,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, last_modified: u64, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            last_modified,
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn id(&self) -> ItemId {
        ItemId::new(self.name.clone(), self.last_modified, self.size())
    }
}
