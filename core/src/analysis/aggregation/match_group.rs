use super::window_after;
use crate::index::IndexKey;
use crate::pipeline::{GroupStage, Pipeline, StageOp, entry_fields, referenced_fields};
use crate::query::Document;
use crate::report::{Reporter, SuggestionKind};
use serde_json::Value;

/// Suggest pushing `$match` predicates on pre-group fields ahead of the `$group`.
///
/// Only the part of each predicate that refers to fields of the input
/// documents is proposed; conditions on the grouped key or on accumulator
/// outputs have to stay after the group.
pub fn match_before_group(index: &str, key: &IndexKey, pipeline: &Pipeline, reporter: &mut Reporter) {
    for (position, stage) in pipeline.stages.iter().enumerate() {
        let StageOp::Group(group) = &stage.op else {
            continue;
        };
        for later in window_after(pipeline, position) {
            let StageOp::Match(predicate) = &later.op else {
                continue;
            };
            let eligible = pre_group_subset(predicate, group);
            let touches_index = referenced_fields(&eligible)
                .unwrap_or_default()
                .iter()
                .any(|f| key.contains(f));
            if eligible.is_empty() || !touches_index {
                continue;
            }
            let pushed = serde_json::to_string(&Value::Object(eligible)).unwrap_or_default();
            reporter.suggest(index, SuggestionKind::MatchBeforeGroup, [pushed, stage.to_json()]);
        }
    }
}

fn pre_group_subset(predicate: &Document, group: &GroupStage) -> Document {
    let mut subset = Document::new();
    for (key, value) in predicate {
        if let Some(fields) = entry_fields(key, value)
            && !fields.is_empty()
            && fields.iter().all(|f| group.is_pre_group_field(f))
        {
            subset.insert(key.clone(), value.clone());
        }
    }
    subset
}
