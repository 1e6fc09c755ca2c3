//! Document identity.

use std::fmt;
use std::sync::Arc;

/// An interned identifier for an open composite document.
///
/// `DocumentId` is a lightweight handle (just a u32) handed out by a
/// [`DocumentSet`](crate::project::DocumentSet) for one [`DocumentPath`].
/// It is constructed once per document and passed by value; nothing in the
/// crate re-derives it from raw URI strings.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentId(u32);

impl DocumentId {
    /// Create a new DocumentId from a raw index.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// A canonicalized document path.
///
/// Canonicalization is lexical: a `file://` scheme is stripped, percent
/// escaped spaces and colons are decoded, backslashes become slashes, `.` and
/// `..` segments are resolved and a Windows drive letter is lowercased. Two
/// spellings of the same file therefore compare equal.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DocumentPath(Arc<str>);

impl DocumentPath {
    /// Canonicalize a path or `file://` URI.
    pub fn new(raw: &str) -> Self {
        let raw = raw.strip_prefix("file://").unwrap_or(raw);
        let decoded = raw.replace("%20", " ").replace("%3A", ":").replace("%3a", ":");
        let slashed = decoded.replace('\\', "/");

        let absolute = slashed.starts_with('/');
        let mut segments: Vec<&str> = Vec::new();
        for segment in slashed.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }

        let mut out = String::with_capacity(slashed.len());
        if absolute {
            out.push('/');
        }
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                out.push('/');
            }
            if i == 0 && is_drive(segment) {
                out.push_str(&segment.to_ascii_lowercase());
            } else {
                out.push_str(segment);
            }
        }

        Self(Arc::from(out))
    }

    /// The canonical path text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

fn is_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl fmt::Debug for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentPath({:?})", self.0)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
