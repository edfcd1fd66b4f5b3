//! Open document snapshots.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::text::LineIndex;

/// Immutable view of a document at one version.
///
/// Every request works off a single snapshot and rebuilds its models from
/// the text, so snapshots are never mutated after creation.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub uri: Url,
    pub version: i32,
    /// Line index over the full text (owns the text).
    pub line_index: LineIndex,
}

impl DocumentSnapshot {
    pub fn new(uri: Url, text: String, version: i32) -> Self {
        Self {
            uri,
            version,
            line_index: LineIndex::new(text),
        }
    }

    pub fn text(&self) -> &str {
        self.line_index.source()
    }

    /// Lower-cased path of the document URI, used for suffix checks.
    pub fn path(&self) -> String {
        self.uri.path().to_ascii_lowercase()
    }
}

/// Thread-safe storage for open documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<DocumentSnapshot>>,
}

impl DocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open or replace a document with the given text.
    pub fn open(&self, uri: Url, text: String, version: i32) -> Arc<DocumentSnapshot> {
        let snapshot = Arc::new(DocumentSnapshot::new(uri.clone(), text, version));
        self.documents.insert(uri, Arc::clone(&snapshot));
        snapshot
    }

    /// Close a document.
    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    /// Get a document's current snapshot.
    pub fn get(&self, uri: &Url) -> Option<Arc<DocumentSnapshot>> {
        self.documents.get(uri).map(|r| Arc::clone(&r))
    }

    /// Current snapshots of every open document, ordered by URI.
    pub fn all(&self) -> Vec<Arc<DocumentSnapshot>> {
        let mut snapshots: Vec<_> = self
            .documents
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        snapshots.sort_by(|a, b| a.uri.as_str().cmp(b.uri.as_str()));
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("file:///workspace/{}", path)).unwrap()
    }

    #[test]
    fn open_replaces_previous_snapshot() {
        let store = DocumentStore::new();
        let first = store.open(url("routes.xml"), "<a/>".to_string(), 1);
        store.open(url("routes.xml"), "<b/>".to_string(), 2);

        let current = store.get(&url("routes.xml")).unwrap();
        assert_eq!(current.version, 2);
        assert_eq!(current.text(), "<b/>");
        // Earlier snapshots stay valid for requests still holding them.
        assert_eq!(first.text(), "<a/>");
    }

    #[test]
    fn close_removes_document() {
        let store = DocumentStore::new();
        store.open(url("Routes.java"), String::new(), 0);
        store.close(&url("Routes.java"));
        assert!(store.get(&url("Routes.java")).is_none());
    }

    #[test]
    fn all_is_ordered_by_uri() {
        let store = DocumentStore::new();
        store.open(url("b.xml"), String::new(), 0);
        store.open(url("a.xml"), String::new(), 0);
        let paths: Vec<_> = store.all().iter().map(|d| d.uri.path().to_string()).collect();
        assert_eq!(paths, vec!["/workspace/a.xml", "/workspace/b.xml"]);
    }

    #[test]
    fn path_is_lowercased() {
        let snapshot = DocumentSnapshot::new(url("My.CAMEL.yaml"), String::new(), 0);
        assert_eq!(snapshot.path(), "/workspace/my.camel.yaml");
    }
}
