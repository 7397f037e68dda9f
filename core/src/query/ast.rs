//! Typed representation of `find` query documents.
//!
//! Raw filter, sort and projection documents are parsed once into the closed
//! types below so the classifier never has to inspect untyped JSON.

use crate::error::{AbbotError, AbbotResult};
use crate::index::Direction;
use serde_json::{Map, Value};

pub type Document = Map<String, Value>;

/// Comparison operator applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Eq(Value),
    In(Vec<Value>),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Ne(Value),
    Unsupported(String),
}

impl Operator {
    fn parse(name: &str, operand: &Value) -> Self {
        match name {
            "$eq" => Operator::Eq(operand.clone()),
            "$in" => match operand.as_array() {
                Some(values) => Operator::In(values.clone()),
                None => Operator::Unsupported(name.to_string()),
            },
            "$gt" => Operator::Gt(operand.clone()),
            "$gte" => Operator::Gte(operand.clone()),
            "$lt" => Operator::Lt(operand.clone()),
            "$lte" => Operator::Lte(operand.clone()),
            "$ne" => Operator::Ne(operand.clone()),
            other => Operator::Unsupported(other.to_string()),
        }
    }

    /// Direct equality, including a single-value `$in`.
    pub fn is_equality(&self) -> bool {
        match self {
            Operator::Eq(_) => true,
            Operator::In(values) => values.len() == 1,
            _ => false,
        }
    }

    pub fn is_range(&self) -> bool {
        match self {
            Operator::Gt(_)
            | Operator::Gte(_)
            | Operator::Lt(_)
            | Operator::Lte(_)
            | Operator::Ne(_) => true,
            Operator::In(values) => values.len() > 1,
            _ => false,
        }
    }
}

/// All operators applied to one field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub field: String,
    pub operators: Vec<Operator>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Field(FieldPredicate),
    And(Vec<FilterNode>),
    /// Top-level operator the classifier does not reason about (`$or`, `$expr`, ...).
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    pub nodes: Vec<FilterNode>,
}

impl Filter {
    /// Parse a filter document. `null` is treated as an empty filter.
    pub fn parse(value: &Value) -> AbbotResult<Self> {
        match value {
            Value::Null => Ok(Filter::default()),
            Value::Object(doc) => Ok(Filter {
                nodes: parse_nodes(doc),
            }),
            other => Err(AbbotError::InvalidDocument(format!(
                "filter must be a document, got {}",
                other
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn parse_nodes(doc: &Document) -> Vec<FilterNode> {
    doc.iter().map(|(key, value)| parse_node(key, value)).collect()
}

fn parse_node(key: &str, value: &Value) -> FilterNode {
    if key == "$and" {
        return match value.as_array() {
            Some(clauses) => FilterNode::And(
                clauses
                    .iter()
                    .filter_map(Value::as_object)
                    .flat_map(parse_nodes)
                    .collect(),
            ),
            None => FilterNode::Unsupported(key.to_string()),
        };
    }
    if key.starts_with('$') {
        return FilterNode::Unsupported(key.to_string());
    }

    let operators = match value {
        Value::Object(doc) if is_operator_document(doc) => doc
            .iter()
            .map(|(name, operand)| Operator::parse(name, operand))
            .collect(),
        // Literal values and embedded documents are direct equality matches.
        other => vec![Operator::Eq(other.clone())],
    };

    FilterNode::Field(FieldPredicate {
        field: key.to_string(),
        operators,
    })
}

fn is_operator_document(doc: &Document) -> bool {
    !doc.is_empty() && doc.keys().all(|k| k.starts_with('$'))
}

/// One key of a requested sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub direction: Direction,
}

impl SortField {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Parse a sort document; keys with non-numeric values (e.g. `$meta`) are skipped.
pub fn parse_sort(value: &Value) -> AbbotResult<Vec<SortField>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(doc) => Ok(doc
            .iter()
            .filter_map(|(field, dir)| {
                Direction::from_value(dir).map(|direction| SortField::new(field.clone(), direction))
            })
            .collect()),
        other => Err(AbbotError::InvalidDocument(format!(
            "sort must be a document, got {}",
            other
        ))),
    }
}

/// How the projection treats `_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdProjection {
    /// Not mentioned; MongoDB returns `_id` by default.
    #[default]
    Default,
    Included,
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    /// Included (or computed) fields, excluding `_id`.
    pub included: Vec<String>,
    /// Excluded fields, excluding `_id`.
    pub excluded: Vec<String>,
    pub id: IdProjection,
    /// Source document, kept for suggestion payloads.
    pub source: Document,
}

impl Projection {
    pub fn parse(value: &Value) -> AbbotResult<Self> {
        let doc = match value {
            Value::Null => return Ok(Projection::default()),
            Value::Object(doc) => doc,
            other => {
                return Err(AbbotError::InvalidDocument(format!(
                    "projection must be a document, got {}",
                    other
                )));
            }
        };

        let mut projection = Projection {
            source: doc.clone(),
            ..Projection::default()
        };
        for (field, spec) in doc {
            let included = match spec {
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
                // Computed fields ($slice, $elemMatch, expressions) are returned to the client.
                _ => true,
            };
            if field == "_id" {
                projection.id = if included {
                    IdProjection::Included
                } else {
                    IdProjection::Excluded
                };
            } else if included {
                projection.included.push(field.clone());
            } else {
                projection.excluded.push(field.clone());
            }
        }
        Ok(projection)
    }

    /// True for a projection that names at least one returned non-`_id` field.
    pub fn is_inclusion(&self) -> bool {
        !self.included.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.source).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn field(nodes: &[FilterNode], idx: usize) -> &FieldPredicate {
        match &nodes[idx] {
            FilterNode::Field(p) => p,
            other => panic!("expected field predicate, got {:?}", other),
        }
    }

    #[test]
    fn literal_values_are_equality() {
        let filter = Filter::parse(&json!({ "a": 1, "b": { "x": 2 } })).unwrap();
        assert_eq!(field(&filter.nodes, 0).operators, vec![Operator::Eq(json!(1))]);
        assert_eq!(
            field(&filter.nodes, 1).operators,
            vec![Operator::Eq(json!({ "x": 2 }))]
        );
    }

    #[test]
    fn operator_documents_are_split() {
        let filter = Filter::parse(&json!({ "age": { "$gt": 1, "$lt": 9, "$exists": true } })).unwrap();
        let ops = &field(&filter.nodes, 0).operators;
        assert_eq!(ops.len(), 3);
        assert!(ops[0].is_range());
        assert!(ops[1].is_range());
        assert_eq!(ops[2], Operator::Unsupported("$exists".into()));
    }

    #[test]
    fn single_value_in_is_equality() {
        assert!(Operator::In(vec![json!(1)]).is_equality());
        assert!(Operator::In(vec![json!(1), json!(2)]).is_range());
        let empty = Operator::In(vec![]);
        assert!(!empty.is_equality() && !empty.is_range());
    }

    #[test]
    fn logical_operators() {
        let filter = Filter::parse(&json!({
            "$and": [{ "a": 1 }, { "b": { "$gte": 2 } }],
            "$or": [{ "c": 1 }]
        }))
        .unwrap();
        match &filter.nodes[0] {
            FilterNode::And(inner) => assert_eq!(inner.len(), 2),
            other => panic!("expected $and, got {:?}", other),
        }
        assert_eq!(filter.nodes[1], FilterNode::Unsupported("$or".into()));
    }

    #[test]
    fn non_document_filter_is_rejected() {
        assert!(Filter::parse(&json!([1])).is_err());
        assert!(Filter::parse(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn sort_skips_meta_keys() {
        let sort = parse_sort(&json!({ "score": { "$meta": "textScore" }, "b": -1, "a": 1 })).unwrap();
        assert_eq!(
            sort,
            vec![
                SortField::new("b", Direction::Descending),
                SortField::new("a", Direction::Ascending)
            ]
        );
    }

    #[test]
    fn projection_tracks_id_separately() {
        let p = Projection::parse(&json!({ "a": 1, "b": true, "_id": 0, "c": 0 })).unwrap();
        assert_eq!(p.included, vec!["a", "b"]);
        assert_eq!(p.excluded, vec!["c"]);
        assert_eq!(p.id, IdProjection::Excluded);
        assert!(p.is_inclusion());

        let p = Projection::parse(&json!({ "c": 0 })).unwrap();
        assert!(!p.is_inclusion());
        assert_eq!(p.id, IdProjection::Default);
    }
}
