use super::{key_serves_sort, window_after};
use crate::index::IndexKey;
use crate::pipeline::{Pipeline, StageOp};
use crate::report::{Reporter, SuggestionKind};

/// Suggest sorting before a `$group` when the sort only needs pre-group
/// fields the index can already order by.
pub fn sort_before_group(index: &str, key: &IndexKey, pipeline: &Pipeline, reporter: &mut Reporter) {
    for (position, stage) in pipeline.stages.iter().enumerate() {
        let StageOp::Group(group) = &stage.op else {
            continue;
        };
        for later in window_after(pipeline, position) {
            if let StageOp::Sort(sort) = &later.op
                && sort.iter().all(|s| group.is_pre_group_field(&s.field))
                && key_serves_sort(key, sort)
            {
                reporter.suggest(
                    index,
                    SuggestionKind::SortBeforeIntervene,
                    [later.to_json(), stage.to_json()],
                );
            }
        }
    }
}
