pub mod ast;
pub mod shape;

pub use ast::{
    Document, FieldPredicate, Filter, FilterNode, IdProjection, Operator, Projection, SortField,
    parse_sort,
};
pub use shape::{QueryShape, classify};

use crate::error::AbbotResult;
use serde_json::Value;

/// A parsed `find` query: filter, sort and projection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindQuery {
    pub filter: Filter,
    pub sort: Vec<SortField>,
    pub projection: Projection,
}

impl FindQuery {
    /// Parse raw documents; `null` stands for an absent filter, sort or projection.
    pub fn parse(filter: &Value, sort: &Value, projection: &Value) -> AbbotResult<Self> {
        Ok(Self {
            filter: Filter::parse(filter)?,
            sort: parse_sort(sort)?,
            projection: Projection::parse(projection)?,
        })
    }

    pub fn shape(&self) -> QueryShape {
        classify(&self.filter, &self.sort, &self.projection)
    }
}
