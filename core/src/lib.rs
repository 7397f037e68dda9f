//! Abbot - index advisor for document queries
//!
//! Checks `find` queries and aggregation pipelines against a collection's
//! indexes and reports how the indexes or the query could be changed so the
//! query planner can use them.

pub mod advisor;
pub mod analysis;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod query;
pub mod report;

pub use advisor::Advisor;
pub use error::{AbbotError, AbbotResult};
pub use index::{Direction, IndexDefinition, IndexKey, IndexSpec};
pub use pipeline::{Aggregation, Pipeline, Stage, StageOp};
pub use query::{FindQuery, QueryShape};
pub use report::{
    NEW_INDEX_SUGGESTIONS, Relation, Report, ReportEntry, Reporter, Suggestion, SuggestionKind,
};
