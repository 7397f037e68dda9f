//! Aggregation pipeline model
//!
//! Each stage is parsed into a [`StageOp`] carrying the operator-specific
//! payload the analyzers need, while the raw stage document is kept for
//! serialization into suggestion payloads.

use crate::error::{AbbotError, AbbotResult};
use crate::query::{Document, SortField, parse_sort};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum StageOp {
    Match(Document),
    Group(GroupStage),
    Sort(Vec<SortField>),
    Project(Document),
    Lookup(LookupStage),
    Unwind(UnwindStage),
    /// Any other stage, passed through untouched.
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupStage {
    /// Output field names of the group's accumulators.
    pub accumulators: Vec<String>,
}

impl GroupStage {
    /// Whether a field path still refers to the pre-group document.
    ///
    /// `_id` (the grouped-by key) and accumulator outputs only exist after
    /// the group, so predicates on them cannot be moved ahead of it.
    pub fn is_pre_group_field(&self, path: &str) -> bool {
        let root = root_field(path);
        root != "_id" && !self.accumulators.iter().any(|a| a == root)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupStage {
    pub as_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnwindStage {
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub op: StageOp,
    raw: Value,
}

impl Stage {
    pub fn parse(position: usize, value: &Value) -> AbbotResult<Self> {
        let invalid = |msg: &str| AbbotError::InvalidStage {
            position,
            msg: msg.to_string(),
        };
        let doc = value
            .as_object()
            .ok_or_else(|| invalid("stage must be a document"))?;
        let mut entries = doc.iter();
        let (name, body) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => return Err(invalid("stage must have exactly one operator")),
        };

        let op = match name.as_str() {
            "$match" => StageOp::Match(
                body.as_object()
                    .cloned()
                    .ok_or_else(|| invalid("$match takes a document"))?,
            ),
            "$group" => {
                let body = body
                    .as_object()
                    .ok_or_else(|| invalid("$group takes a document"))?;
                StageOp::Group(GroupStage {
                    accumulators: body.keys().filter(|k| *k != "_id").cloned().collect(),
                })
            }
            "$sort" => StageOp::Sort(parse_sort(body).map_err(|e| invalid(&e.to_string()))?),
            "$project" => StageOp::Project(
                body.as_object()
                    .cloned()
                    .ok_or_else(|| invalid("$project takes a document"))?,
            ),
            "$lookup" => StageOp::Lookup(LookupStage {
                as_field: body.get("as").and_then(Value::as_str).map(str::to_string),
            }),
            "$unwind" => {
                // `{$unwind: "$path"}` or `{$unwind: {path: "$path", ...}}`
                let path = body
                    .as_str()
                    .or_else(|| body.get("path").and_then(Value::as_str))
                    .map(|p| p.trim_start_matches('$').to_string());
                StageOp::Unwind(UnwindStage { path })
            }
            other => StageOp::Other(other.to_string()),
        };

        Ok(Self {
            op,
            raw: value.clone(),
        })
    }

    /// Compact JSON of the whole stage, e.g. `{"$sort":{"a":1}}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.raw).unwrap_or_default()
    }

    pub fn is_match(&self) -> bool {
        matches!(self.op, StageOp::Match(_))
    }
}

/// Ordered aggregation pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn parse(stages: &[Value]) -> AbbotResult<Self> {
        let stages = stages
            .iter()
            .enumerate()
            .map(|(i, v)| Stage::parse(i, v))
            .collect::<AbbotResult<Vec<_>>>()?;
        Ok(Self { stages })
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }
}

/// A pipeline together with the stages the query planner reported as able to
/// use an index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregation {
    pub pipeline: Pipeline,
    pub indexed_stages: Vec<Value>,
}

impl Aggregation {
    pub fn parse(stages: &[Value], indexed_stages: &[Value]) -> AbbotResult<Self> {
        Ok(Self {
            pipeline: Pipeline::parse(stages)?,
            indexed_stages: indexed_stages.to_vec(),
        })
    }
}

/// First segment of a dotted field path.
pub fn root_field(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// Field paths referenced by a `$match` predicate.
///
/// Returns `None` when the predicate uses an operator whose field references
/// cannot be determined statically (`$expr`, `$where`, `$text`, ...).
pub fn referenced_fields(predicate: &Document) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    for (key, value) in predicate {
        fields.extend(entry_fields(key, value)?);
    }
    Some(fields)
}

/// Field paths referenced by a single top-level predicate entry.
pub fn entry_fields(key: &str, value: &Value) -> Option<Vec<String>> {
    match key {
        "$and" | "$or" | "$nor" => {
            let mut fields = Vec::new();
            for clause in value.as_array()? {
                fields.extend(referenced_fields(clause.as_object()?)?);
            }
            Some(fields)
        }
        k if k.starts_with('$') => None,
        k => Some(vec![k.to_string()]),
    }
}
