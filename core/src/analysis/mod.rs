//! Index-usage analyzers.
//!
//! Every analyzer is a function of an index and a query (or pipeline) that
//! writes zero or more suggestions into a [`Reporter`](crate::report::Reporter).
//! Analyzers never read back what has been reported.

pub mod aggregation;
pub mod coverage;
pub mod esr;
pub mod position;
pub mod streak;

pub use aggregation::{
    match_as_first_stage, match_before_group, sort_before_group, sort_before_intervening_stages,
};
pub use coverage::check_coverage;
pub use esr::{suggest_new_index, synthesize};
pub use position::{Violations, check_position, position_violations};
pub use streak::{check_index_support, streak};

use crate::index::IndexKey;
use crate::query::QueryShape;

/// Whether the query planner could use `key` for this query at all.
///
/// That needs either an equality seek on the leading field, or, for queries
/// without equality predicates, a leading sort or range field.
pub fn supports(key: &IndexKey, shape: &QueryShape) -> bool {
    if streak(key, shape) > 0 {
        return true;
    }
    if !shape.equality_fields.is_empty() {
        return false;
    }
    key.field_names()
        .next()
        .is_some_and(|first| shape.is_sort(first) || shape.is_range(first))
}
