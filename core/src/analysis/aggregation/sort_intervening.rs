use super::key_serves_sort;
use crate::index::IndexKey;
use crate::pipeline::{Pipeline, Stage, StageOp, root_field};
use crate::query::{Document, SortField};
use crate::report::{Reporter, SuggestionKind};
use serde_json::Value;

/// Suggest moving an index-backed `$sort` ahead of the `$project`, `$unwind`
/// or `$lookup` stage that currently separates it from the collection scan.
pub fn sort_before_intervening_stages(
    index: &str,
    key: &IndexKey,
    pipeline: &Pipeline,
    reporter: &mut Reporter,
) {
    // Stages before a `$group` work on a different document shape.
    let mut segment_start = 0;
    for (position, stage) in pipeline.stages.iter().enumerate() {
        match &stage.op {
            StageOp::Group(_) => segment_start = position + 1,
            StageOp::Sort(sort) if key_serves_sort(key, sort) => {
                let blocker = pipeline.stages[segment_start..position]
                    .iter()
                    .find(|s| blocks_index(s));
                if let Some(blocker) = blocker
                    && !sort_depends_on(sort, blocker)
                {
                    reporter.suggest(
                        index,
                        SuggestionKind::SortBeforeIntervene,
                        [stage.to_json(), blocker.to_json()],
                    );
                }
            }
            _ => {}
        }
    }
}

fn blocks_index(stage: &Stage) -> bool {
    matches!(
        stage.op,
        StageOp::Project(_) | StageOp::Unwind(_) | StageOp::Lookup(_)
    )
}

/// Whether moving the sort before `stage` would change what it sorts on.
fn sort_depends_on(sort: &[SortField], stage: &Stage) -> bool {
    let touches = |path: &Option<String>| match path {
        Some(p) => sort
            .iter()
            .any(|s| root_field(&s.field) == root_field(p)),
        None => true,
    };
    match &stage.op {
        StageOp::Unwind(unwind) => touches(&unwind.path),
        StageOp::Lookup(lookup) => touches(&lookup.as_field),
        StageOp::Project(projection) => sort
            .iter()
            .any(|s| !projection_passes_through(projection, &s.field)),
        _ => false,
    }
}

/// Whether a `$project` hands `field` through unchanged.
fn projection_passes_through(projection: &Document, field: &str) -> bool {
    let spec = projection
        .get(field)
        .or_else(|| projection.get(root_field(field)));
    let inclusion = projection
        .iter()
        .any(|(k, v)| k != "_id" && is_truthy(v));

    match spec {
        Some(v) if is_flag(v) => is_truthy(v),
        // Computed field: the value after the stage is not the stored one.
        Some(_) => false,
        None => !inclusion,
    }
}

fn is_flag(v: &Value) -> bool {
    v.is_boolean() || v.is_number()
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => true,
    }
}
