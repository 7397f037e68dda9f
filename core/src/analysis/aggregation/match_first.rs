use crate::index::IndexKey;
use crate::pipeline::{Aggregation, Stage, StageOp, referenced_fields, root_field};
use crate::report::{Reporter, SuggestionKind};

/// Suggest starting the pipeline with a `$match`.
///
/// When a later `$match` can be moved to the front without changing the
/// result, and it filters on this index, it is named directly. Otherwise the
/// suggestion carries the JSON list of stages the planner reported as
/// index-eligible.
pub fn match_as_first_stage(
    index: &str,
    key: &IndexKey,
    aggregation: &Aggregation,
    reporter: &mut Reporter,
) {
    let stages = &aggregation.pipeline.stages;
    let Some(first) = stages.first() else {
        return;
    };
    if first.is_match() {
        return;
    }

    let movable = stages.iter().position(Stage::is_match).and_then(|m| {
        let StageOp::Match(predicate) = &stages[m].op else {
            return None;
        };
        let fields = referenced_fields(predicate)?;
        stages[..m]
            .iter()
            .all(|s| commutes_with(s, &fields))
            .then_some((&stages[m], fields))
    });

    match movable {
        Some((stage, fields)) => {
            if fields.iter().any(|f| key.contains(f)) {
                reporter.suggest(
                    index,
                    SuggestionKind::MoveMatchFirstStage,
                    [stage.to_json(), first.to_json()],
                );
            }
        }
        None => {
            let eligible =
                serde_json::to_string(&aggregation.indexed_stages).unwrap_or_else(|_| "[]".into());
            reporter.suggest(index, SuggestionKind::AddMatchFirstStage, [eligible]);
        }
    }
}

/// Whether a `$match` on `fields` gives the same result before `stage`.
fn commutes_with(stage: &Stage, fields: &[String]) -> bool {
    let untouched = |produced: &Option<String>| match produced {
        Some(p) => fields.iter().all(|f| root_field(f) != root_field(p)),
        None => false,
    };
    match &stage.op {
        StageOp::Sort(_) => true,
        StageOp::Lookup(lookup) => untouched(&lookup.as_field),
        StageOp::Unwind(unwind) => untouched(&unwind.path),
        _ => false,
    }
}
