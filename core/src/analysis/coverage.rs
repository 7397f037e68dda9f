//! Covered-query check: can the index alone answer the projection?

use crate::index::IndexKey;
use crate::query::{IdProjection, QueryShape};
use crate::report::{Reporter, Suggestion, SuggestionKind};

pub fn check_coverage(index: &str, key: &IndexKey, shape: &QueryShape, reporter: &mut Reporter) {
    let projection = &shape.projection;
    if !projection.is_inclusion() {
        return;
    }

    let missing: Vec<String> = projection
        .included
        .iter()
        .filter(|field| !key.contains(field))
        .cloned()
        .collect();
    let id_uncovered = projection.id != IdProjection::Excluded && !key.contains("_id");

    if !missing.is_empty() {
        reporter.suggest(index, SuggestionKind::AddFieldForCoveredQuery, missing.clone());
    }

    let mut narrowing = Vec::with_capacity(2);
    if id_uncovered {
        narrowing.push(Suggestion::new(
            SuggestionKind::RemoveIdProjectionFromProjection,
            [projection.to_json()],
        ));
    }
    if !missing.is_empty() {
        narrowing.push(Suggestion::new(SuggestionKind::RemoveFieldsFromProjection, missing));
    }

    match narrowing.len() {
        0 => {}
        1 => {
            if let Some(only) = narrowing.pop() {
                reporter.insert(index, only);
            }
        }
        _ => reporter.suggest_or(index, narrowing),
    }
}
