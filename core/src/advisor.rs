//! Analysis driver
//!
//! Runs the analyzers for one query or pipeline against every index of the
//! collection and collects their output into a single [`Report`].

use crate::analysis::{self, position_violations, supports};
use crate::index::IndexSpec;
use crate::pipeline::Aggregation;
use crate::query::FindQuery;
use crate::report::{Report, Reporter};
use tracing::debug;

pub struct Advisor<'a> {
    indexes: &'a [IndexSpec],
}

impl<'a> Advisor<'a> {
    pub fn new(indexes: &'a [IndexSpec]) -> Self {
        Self { indexes }
    }

    /// Analyze a `find` query.
    ///
    /// Indexes the query cannot use at all are skipped. When none of the
    /// remaining indexes follows the ESR rule, a new index is synthesized.
    pub fn analyze_find(&self, query: &FindQuery) -> Report {
        let shape = query.shape();
        let mut reporter = Reporter::new();
        if !shape.has_fields() {
            debug!("query has no classified fields, nothing to analyze");
            return reporter.finish();
        }

        let mut adequate = false;
        for index in self.indexes {
            if !supports(&index.key, &shape) {
                debug!(index = %index.name, "index cannot serve query");
                continue;
            }
            analysis::check_index_support(&index.name, &index.key, &shape, &mut reporter);
            analysis::check_position(&index.name, &index.key, &shape, &mut reporter);
            analysis::check_coverage(&index.name, &index.key, &shape, &mut reporter);
            adequate |= position_violations(&index.key, &shape).is_empty();
        }

        if !adequate {
            analysis::suggest_new_index(&shape, &mut reporter);
        }
        reporter.finish()
    }

    /// Analyze an aggregation pipeline against every index.
    pub fn analyze_aggregation(&self, aggregation: &Aggregation) -> Report {
        let pipeline = &aggregation.pipeline;
        let mut reporter = Reporter::new();
        for index in self.indexes {
            analysis::match_before_group(&index.name, &index.key, pipeline, &mut reporter);
            analysis::sort_before_group(&index.name, &index.key, pipeline, &mut reporter);
            analysis::sort_before_intervening_stages(&index.name, &index.key, pipeline, &mut reporter);
            analysis::match_as_first_stage(&index.name, &index.key, aggregation, &mut reporter);
        }
        reporter.finish()
    }
}
