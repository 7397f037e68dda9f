//! Field classification (equality / sort / range).

use super::ast::{Filter, FilterNode, Operator, Projection, SortField};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Equality,
    Range,
}

/// Classified view of a query, the input of every `find` analyzer.
///
/// Field lists keep the order in which fields first appear in the query so
/// that everything derived from a shape is reproducible.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryShape {
    pub equality_fields: Vec<String>,
    pub range_fields: Vec<String>,
    pub sort_fields: Vec<SortField>,
    pub projection: Projection,
}

impl QueryShape {
    pub fn is_equality(&self, field: &str) -> bool {
        self.equality_fields.iter().any(|f| f == field)
    }

    pub fn is_range(&self, field: &str) -> bool {
        self.range_fields.iter().any(|f| f == field)
    }

    pub fn is_sort(&self, field: &str) -> bool {
        self.sort_fields.iter().any(|s| s.field == field)
    }

    /// Whether the query names any field an index could serve.
    pub fn has_fields(&self) -> bool {
        !(self.equality_fields.is_empty()
            && self.range_fields.is_empty()
            && self.sort_fields.is_empty())
    }
}

/// Classify a parsed query into equality, range and sort fields.
///
/// Unsupported operators leave their field unclassified. A field seen with
/// both an equality and a range predicate is classified as equality.
pub fn classify(filter: &Filter, sort: &[SortField], projection: &Projection) -> QueryShape {
    let mut classes: Vec<(String, Class)> = Vec::new();
    collect(&filter.nodes, &mut classes);

    let mut shape = QueryShape {
        sort_fields: dedup_sort(sort),
        projection: projection.clone(),
        ..QueryShape::default()
    };
    for (field, class) in classes {
        match class {
            Class::Equality => shape.equality_fields.push(field),
            Class::Range => shape.range_fields.push(field),
        }
    }

    trace!(
        equality = ?shape.equality_fields,
        range = ?shape.range_fields,
        sort = shape.sort_fields.len(),
        "classified query"
    );
    shape
}

fn collect(nodes: &[FilterNode], classes: &mut Vec<(String, Class)>) {
    for node in nodes {
        match node {
            FilterNode::Field(predicate) => {
                if let Some(class) = classify_operators(&predicate.operators) {
                    record(classes, &predicate.field, class);
                }
            }
            FilterNode::And(inner) => collect(inner, classes),
            FilterNode::Unsupported(op) => trace!(operator = %op, "ignoring operator"),
        }
    }
}

fn classify_operators(operators: &[Operator]) -> Option<Class> {
    if operators.iter().any(Operator::is_equality) {
        Some(Class::Equality)
    } else if operators.iter().any(Operator::is_range) {
        Some(Class::Range)
    } else {
        None
    }
}

fn record(classes: &mut Vec<(String, Class)>, field: &str, class: Class) {
    match classes.iter_mut().find(|(f, _)| f == field) {
        Some(entry) => {
            if class == Class::Equality {
                entry.1 = Class::Equality;
            }
        }
        None => classes.push((field.to_string(), class)),
    }
}

fn dedup_sort(sort: &[SortField]) -> Vec<SortField> {
    let mut out: Vec<SortField> = Vec::with_capacity(sort.len());
    for key in sort {
        if !out.iter().any(|s| s.field == key.field) {
            out.push(key.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::parse_sort;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    fn shape(filter: Value, sort: Value) -> QueryShape {
        classify(
            &Filter::parse(&filter).unwrap(),
            &parse_sort(&sort).unwrap(),
            &Projection::default(),
        )
    }

    #[test]
    fn splits_equality_and_range() {
        let s = shape(
            json!({ "a": 1, "b": { "$gt": 5 }, "c": { "$in": [1] }, "d": { "$in": [1, 2] }, "e": { "$ne": 0 } }),
            json!({ "f": -1 }),
        );
        assert_eq!(s.equality_fields, vec!["a", "c"]);
        assert_eq!(s.range_fields, vec!["b", "d", "e"]);
        assert_eq!(s.sort_fields.len(), 1);
    }

    #[test]
    fn equality_wins_over_range() {
        let s = shape(
            json!({ "a": { "$gt": 1 }, "$and": [{ "a": 3 }, { "b": { "$lt": 2, "$eq": 1 } }] }),
            Value::Null,
        );
        assert_eq!(s.equality_fields, vec!["a", "b"]);
        assert!(s.range_fields.is_empty());
    }

    #[test]
    fn unknown_operators_are_ignored() {
        let s = shape(
            json!({ "a": { "$regex": "^x" }, "$or": [{ "b": 1 }], "c": { "$exists": true } }),
            Value::Null,
        );
        assert!(!s.has_fields());
    }

    fn arb_operand() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(json!(1)),
            Just(json!({ "$gt": 1 })),
            Just(json!({ "$lte": 1 })),
            Just(json!({ "$ne": 1 })),
            Just(json!({ "$in": [1] })),
            Just(json!({ "$in": [1, 2] })),
            Just(json!({ "$exists": true })),
            Just(json!({ "$gt": 1, "$eq": 2 })),
        ]
    }

    fn arb_filter() -> impl Strategy<Value = Value> {
        let field = || prop::sample::select(vec!["a", "b", "c", "d"]);
        (
            prop::collection::vec((field(), arb_operand()), 0..5),
            prop::collection::vec((field(), arb_operand()), 0..3),
        )
            .prop_map(|(top, nested)| {
                let mut doc: Map<String, Value> =
                    top.into_iter().map(|(f, v)| (f.to_string(), v)).collect();
                let clauses: Vec<Value> = nested
                    .into_iter()
                    .map(|(f, v)| {
                        let mut clause = Map::new();
                        clause.insert(f.to_string(), v);
                        Value::Object(clause)
                    })
                    .collect();
                doc.insert("$and".into(), Value::Array(clauses));
                Value::Object(doc)
            })
    }

    proptest! {
        #[test]
        fn equality_and_range_are_disjoint(filter in arb_filter()) {
            let s = shape(filter, Value::Null);
            for field in &s.equality_fields {
                prop_assert!(!s.is_range(field));
            }
            let mut all: Vec<_> = s.equality_fields.iter().chain(&s.range_fields).collect();
            let total = all.len();
            all.sort();
            all.dedup();
            prop_assert_eq!(all.len(), total);
        }
    }
}
