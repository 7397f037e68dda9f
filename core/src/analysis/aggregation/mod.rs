//! Aggregation stage-order rules.
//!
//! Each rule scans the pipeline once and reports stage orderings that stop
//! the given index from being used.

mod match_first;
mod match_group;
mod sort_group;
mod sort_intervening;

pub use match_first::match_as_first_stage;
pub use match_group::match_before_group;
pub use sort_group::sort_before_group;
pub use sort_intervening::sort_before_intervening_stages;

use crate::index::IndexKey;
use crate::pipeline::{Pipeline, Stage, StageOp};
use crate::query::SortField;

/// Stages directly following position `after` that keep the document shape
/// produced by the stage at `after`.
fn window_after(pipeline: &Pipeline, after: usize) -> impl Iterator<Item = &Stage> {
    pipeline.stages[after + 1..]
        .iter()
        .take_while(|s| matches!(s.op, StageOp::Match(_) | StageOp::Sort(_)))
}

/// An index can only provide a sort order over fields it contains.
fn key_serves_sort(key: &IndexKey, sort: &[SortField]) -> bool {
    !sort.is_empty() && sort.iter().all(|s| key.contains(&s.field))
}
