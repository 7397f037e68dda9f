//! ESR index synthesis.

use crate::index::{Direction, IndexKey};
use crate::query::QueryShape;
use crate::report::{Reporter, SuggestionKind};

/// Build an index key following the Equality -> Sort -> Range rule.
///
/// Equality and range fields keep the order they appear in the query and are
/// indexed ascending; sort fields keep the requested order and direction. A
/// field that is both sorted on and range-filtered is placed once, with the
/// sort fields, where it serves both.
pub fn synthesize(shape: &QueryShape) -> IndexKey {
    let mut fields: Vec<(String, Direction)> = Vec::new();
    let mut place = |name: &str, direction: Direction| {
        if !fields.iter().any(|(f, _)| f == name) {
            fields.push((name.to_string(), direction));
        }
    };

    for field in &shape.equality_fields {
        place(field, Direction::Ascending);
    }
    for sort in &shape.sort_fields {
        place(&sort.field, sort.direction);
    }
    for field in &shape.range_fields {
        place(field, Direction::Ascending);
    }

    // Names are unique and non-empty by construction.
    IndexKey::new(fields).unwrap_or_default()
}

/// Recommend a brand-new ESR index for the query.
pub fn suggest_new_index(shape: &QueryShape, reporter: &mut Reporter) -> Option<IndexKey> {
    if !shape.has_fields() {
        return None;
    }
    let key = synthesize(shape);
    reporter.suggest_new_index(SuggestionKind::CreateEsrIndex, key.clone());
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortField;
    use crate::report::{NEW_INDEX_SUGGESTIONS, ReportEntry};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn orders_equality_sort_range() {
        let shape = QueryShape {
            equality_fields: vec!["status".into(), "owner".into()],
            range_fields: vec!["age".into(), "created".into()],
            sort_fields: vec![
                SortField::new("created", Direction::Descending),
                SortField::new("status", Direction::Descending),
                SortField::new("name", Direction::Ascending),
            ],
            ..QueryShape::default()
        };
        let key = synthesize(&shape);
        assert_eq!(
            key.to_json(),
            r#"{"status":1,"owner":1,"created":-1,"name":1,"age":1}"#
        );
    }

    #[test]
    fn empty_shape_suggests_nothing() {
        let mut reporter = Reporter::new();
        assert_eq!(suggest_new_index(&QueryShape::default(), &mut reporter), None);
        assert!(reporter.finish().is_empty());
    }

    #[test]
    fn new_index_goes_to_dedicated_bucket() {
        let shape = QueryShape {
            equality_fields: vec!["a".into()],
            ..QueryShape::default()
        };
        let mut reporter = Reporter::new();
        let key = suggest_new_index(&shape, &mut reporter).unwrap();
        let report = reporter.finish();
        assert_eq!(report.indexes().collect::<Vec<_>>(), vec![NEW_INDEX_SUGGESTIONS]);
        match &report.entries(NEW_INDEX_SUGGESTIONS)[0] {
            ReportEntry::NewIndex(s) => {
                assert_eq!(s.kind, SuggestionKind::CreateEsrIndex);
                assert_eq!(s.key, key);
            }
            other => panic!("expected new index suggestion, got {:?}", other),
        }
    }

    fn arb_shape() -> impl Strategy<Value = QueryShape> {
        let names = vec!["a", "b", "c", "d", "e", "f", "g"];
        (
            prop::sample::subsequence(names.clone(), 0..=7).prop_shuffle(),
            0usize..=7,
            prop::collection::vec((prop::sample::select(names), any::<bool>()), 0..4),
        )
            .prop_map(|(classified, split, sort)| {
                let split = split.min(classified.len());
                let mut sort_fields: Vec<SortField> = Vec::new();
                for (f, asc) in sort {
                    if !sort_fields.iter().any(|s| s.field == f) {
                        let dir = if asc { Direction::Ascending } else { Direction::Descending };
                        sort_fields.push(SortField::new(f, dir));
                    }
                }
                QueryShape {
                    equality_fields: classified[..split].iter().map(|f| f.to_string()).collect(),
                    range_fields: classified[split..].iter().map(|f| f.to_string()).collect(),
                    sort_fields,
                    ..QueryShape::default()
                }
            })
    }

    proptest! {
        #[test]
        fn synthesized_key_passes_position_check(shape in arb_shape()) {
            let key = synthesize(&shape);
            prop_assert!(crate::analysis::position_violations(&key, &shape).is_empty());
        }

        #[test]
        fn synthesized_key_follows_esr(shape in arb_shape()) {
            let key = synthesize(&shape);
            let names: Vec<&str> = key.field_names().collect();
            let pos = |f: &str| names.iter().position(|n| *n == f);

            // Each classified field appears exactly once.
            let mut expected: Vec<&str> = shape.equality_fields.iter().map(String::as_str)
                .chain(shape.sort_fields.iter().map(|s| s.field.as_str()))
                .chain(shape.range_fields.iter().map(String::as_str))
                .collect();
            expected.sort();
            expected.dedup();
            let mut actual = names.clone();
            actual.sort();
            prop_assert_eq!(actual, expected);

            let sort_only: Vec<&str> = shape.sort_fields.iter()
                .map(|s| s.field.as_str())
                .filter(|f| !shape.is_equality(f))
                .collect();
            let range_only: Vec<&str> = shape.range_fields.iter()
                .map(String::as_str)
                .filter(|f| !shape.is_sort(f))
                .collect();
            for e in &shape.equality_fields {
                for s in &sort_only {
                    prop_assert!(pos(e) < pos(s));
                }
                for r in &range_only {
                    prop_assert!(pos(e) < pos(r));
                }
            }
            for s in &sort_only {
                for r in &range_only {
                    prop_assert!(pos(s) < pos(r));
                }
            }
        }
    }
}
