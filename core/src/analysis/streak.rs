use crate::index::IndexKey;
use crate::query::QueryShape;
use crate::report::{Reporter, SuggestionKind};

/// Number of leading index fields matched by the query's equality predicates.
///
/// Zero means the index cannot be seeked by equality at all.
pub fn streak(key: &IndexKey, shape: &QueryShape) -> usize {
    key.field_names()
        .take_while(|field| shape.is_equality(field))
        .count()
}

/// Suggest adding equality fields that an already-seekable index lacks.
pub fn check_index_support(index: &str, key: &IndexKey, shape: &QueryShape, reporter: &mut Reporter) {
    if streak(key, shape) == 0 {
        return;
    }
    let missing: Vec<&str> = shape
        .equality_fields
        .iter()
        .map(String::as_str)
        .filter(|field| !key.contains(field))
        .collect();
    if !missing.is_empty() {
        reporter.suggest(index, SuggestionKind::AddFieldsForIndexSupport, missing);
    }
}
