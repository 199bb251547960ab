//! Collection algorithms behind the model operations.
//!
//! Everything here works on the in-memory contents of one collection and is
//! free of locking and I/O; [`crate::model`] wraps these functions with
//! validation, hooks, and the flush to the backend.

use serde::Serialize;

use crate::{document::Document, query::Query};

/// Outcome of saving a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveResult {
    /// The document as it was stored, including its `_id`.
    pub document: Document,
    /// `1` when an existing document was replaced, `0` when the save was an insert.
    pub updated: usize,
}

impl SaveResult {
    pub fn was_insert(&self) -> bool {
        self.updated == 0
    }
}

/// Outcome of updating a document. Updates never insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateResult {
    pub document: Document,
    /// Number of stored documents replaced; `0` when the `_id` was not present.
    pub affected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: usize,
}

impl DeleteResult {
    pub fn new(deleted_count: usize) -> Self {
        Self { acknowledged: true, deleted_count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetResult {
    /// Number of documents the collection held before it was emptied.
    pub affected: usize,
}

/// Returns the documents matching `query`, or all of them when there is no query.
pub fn find(documents: &[Document], query: Option<&Query>) -> Vec<Document> {
    match query {
        Some(query) => documents
            .iter()
            .filter(|doc| query.matches(doc))
            .cloned()
            .collect(),
        None => documents.to_vec(),
    }
}

/// Returns the first document, in collection order, matching `query`.
pub fn find_one<'a>(documents: &'a [Document], query: &Query) -> Option<&'a Document> {
    documents.iter().find(|doc| query.matches(doc))
}

/// Replaces every document sharing `document`'s `_id`, or appends it when none does.
///
/// Returns the number of documents replaced, so `0` means the document was inserted.
pub fn upsert(documents: &mut Vec<Document>, document: Document) -> usize {
    let replaced = replace(documents, &document);
    if replaced == 0 {
        documents.push(document);
    }
    replaced
}

/// Replaces every document sharing `document`'s `_id` and returns how many were replaced.
pub fn replace(documents: &mut [Document], document: &Document) -> usize {
    let Some(id) = document.id() else {
        return 0;
    };

    let mut replaced = 0;
    for slot in documents.iter_mut().filter(|doc| doc.id() == Some(id)) {
        *slot = document.clone();
        replaced += 1;
    }
    replaced
}

/// Removes every document matching `query` and returns how many were removed.
pub fn remove_matching(documents: &mut Vec<Document>, query: &Query) -> usize {
    let before = documents.len();
    documents.retain(|doc| !query.matches(doc));
    before - documents.len()
}

/// Removes the first document with the given `_id`.
pub fn remove_by_id(documents: &mut Vec<Document>, id: &str) -> Option<Document> {
    documents
        .iter()
        .position(|doc| doc.id() == Some(id))
        .map(|index| documents.remove(index))
}

/// Empties the collection and returns its previous length.
pub fn clear(documents: &mut Vec<Document>) -> usize {
    let affected = documents.len();
    documents.clear();
    affected
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    fn people() -> Vec<Document> {
        vec![
            doc(json!({ "_id": "1", "fname": "John", "lname": "Doe" })),
            doc(json!({ "_id": "2", "fname": "Jane", "lname": "Doe" })),
            doc(json!({ "_id": "3", "fname": "John", "lname": "Roe" })),
        ]
    }

    #[test]
    fn find_without_query_returns_everything() {
        assert_eq!(find(&people(), None).len(), 3);
    }

    #[test]
    fn find_filters_on_every_condition() {
        let docs = people();
        let query = Query::new().eq("fname", "John").eq("lname", "Roe");

        let found = find(&docs, Some(&query));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), Some("3"));
    }

    #[test]
    fn find_one_returns_the_first_match() {
        let docs = people();
        let found = find_one(&docs, &Query::new().eq("fname", "John")).unwrap();
        assert_eq!(found.id(), Some("1"));
        assert!(find_one(&docs, &Query::new().eq("fname", "Zed")).is_none());
    }

    #[test]
    fn upsert_inserts_then_replaces() {
        let mut docs = people();

        let inserted = upsert(&mut docs, doc(json!({ "_id": "4", "fname": "Ann" })));
        assert_eq!(inserted, 0);
        assert_eq!(docs.len(), 4);

        let replaced = upsert(&mut docs, doc(json!({ "_id": "4", "fname": "Anne" })));
        assert_eq!(replaced, 1);
        assert_eq!(docs.len(), 4);
        assert_eq!(docs[3].get("fname"), Some(&json!("Anne")));
    }

    #[test]
    fn replace_never_inserts() {
        let mut docs = people();
        assert_eq!(replace(&mut docs, &doc(json!({ "_id": "9" }))), 0);
        assert_eq!(docs.len(), 3);
    }

    #[test]
    fn remove_matching_removes_all_and_only_matches() {
        let mut docs = people();
        let removed = remove_matching(&mut docs, &Query::new().eq("lname", "Doe"));

        assert_eq!(removed, 2);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id(), Some("3"));
    }

    #[test]
    fn remove_by_id_splices_out_one_document() {
        let mut docs = people();

        let removed = remove_by_id(&mut docs, "2").unwrap();
        assert_eq!(removed.get("fname"), Some(&json!("Jane")));
        assert_eq!(docs.len(), 2);
        assert!(remove_by_id(&mut docs, "2").is_none());
    }

    #[test]
    fn clear_reports_prior_length() {
        let mut docs = people();
        assert_eq!(clear(&mut docs), 3);
        assert!(docs.is_empty());
    }

    #[test]
    fn delete_result_serializes_like_a_driver_acknowledgement() {
        let value = serde_json::to_value(DeleteResult::new(2)).unwrap();
        assert_eq!(value, json!({ "acknowledged": true, "deletedCount": 2 }));
    }
}
