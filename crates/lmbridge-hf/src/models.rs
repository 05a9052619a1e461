//! Repository index payloads.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    /// Anything else the host may list (e.g. submodules); skipped.
    #[serde(other)]
    Other,
}

/// One node of a repository tree listing.
///
/// `path` is relative to the repository root, also for entries listed
/// under a subdirectory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
    pub path: String,
}

impl IndexEntry {
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tree_listing() {
        let raw = r#"[
            {"type":"file","oid":"abc","size":12,"path":"model.json"},
            {"type":"directory","oid":"def","size":0,"path":"ggml"},
            {"type":"submodule","path":"ext"}
        ]"#;
        let entries: Vec<IndexEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_file());
        assert_eq!(entries[0].size, 12);
        assert!(entries[1].is_directory());
        assert_eq!(entries[2].kind, EntryKind::Other);
        assert_eq!(entries[2].size, 0);
    }

    #[test]
    fn rejects_entry_without_path() {
        assert!(serde_json::from_str::<IndexEntry>(r#"{"type":"file","size":1}"#).is_err());
    }
}
