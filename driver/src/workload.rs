//! Workload input and per-query results.

use abbot_core::{Advisor, Aggregation, FindQuery, IndexDefinition, IndexSpec, Report};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{DriverError, DriverResult};

/// A collection's indexes plus the queries and pipelines run against it.
#[derive(Debug, Clone, Deserialize)]
pub struct Workload {
    pub collection: String,
    pub indexes: Vec<IndexDefinition>,
    #[serde(default)]
    pub queries: Vec<QueryInput>,
    #[serde(default)]
    pub aggregations: Vec<AggregationInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryInput {
    pub filter: Value,
    pub sort: Value,
    pub projection: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AggregationInput {
    pub pipeline: Vec<Value>,
    pub indexed_stages: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Query,
    Aggregation,
}

/// Suggestions for one query or pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReport {
    pub collection: String,
    #[serde(rename = "type")]
    pub kind: QueryType,
    /// The analyzed query as compact JSON
    pub query: String,
    pub suggestions: Report,
}

impl Workload {
    pub fn from_json(s: &str) -> DriverResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> DriverResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| DriverError::io(path, e))?;
        Self::from_json(&s)
    }

    /// Indexes the analyzers understand. Anything else is skipped.
    pub fn index_specs(&self) -> Vec<IndexSpec> {
        self.indexes
            .iter()
            .filter_map(|def| match IndexSpec::try_from(def) {
                Ok(spec) => Some(spec),
                Err(e) => {
                    warn!(index = %def.name, kind = e.kind(), "skipping index: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Analyze every query, then every pipeline, in input order.
    pub fn run(&self) -> DriverResult<Vec<QueryReport>> {
        let indexes = self.index_specs();
        let advisor = Advisor::new(&indexes);
        info!(
            collection = %self.collection,
            indexes = indexes.len(),
            queries = self.queries.len(),
            aggregations = self.aggregations.len(),
            "analyzing workload"
        );

        let mut reports = Vec::with_capacity(self.queries.len() + self.aggregations.len());
        for input in &self.queries {
            let query = FindQuery::parse(&input.filter, &input.sort, &input.projection)?;
            reports.push(QueryReport {
                collection: self.collection.clone(),
                kind: QueryType::Query,
                query: serde_json::to_string(input)?,
                suggestions: advisor.analyze_find(&query),
            });
        }
        for input in &self.aggregations {
            let aggregation = Aggregation::parse(&input.pipeline, &input.indexed_stages)?;
            reports.push(QueryReport {
                collection: self.collection.clone(),
                kind: QueryType::Aggregation,
                query: serde_json::to_string(&input.pipeline)?,
                suggestions: advisor.analyze_aggregation(&aggregation),
            });
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abbot_core::NEW_INDEX_SUGGESTIONS;
    use pretty_assertions::assert_eq;

    const WORKLOAD: &str = r#"{
        "collection": "orders",
        "indexes": [
            { "name": "_id_", "key": { "_id": 1 } },
            { "name": "body_text", "key": { "body": "text" } },
            { "name": "status_1", "key": { "status": 1 } }
        ],
        "queries": [
            { "filter": { "status": "A", "qty": { "$lt": 5 } } },
            { "filter": { "customer": "c1" }, "sort": { "ts": -1 } }
        ],
        "aggregations": [
            {
                "pipeline": [
                    { "$group": { "_id": "$status", "n": { "$sum": 1 } } },
                    { "$match": { "status": "A" } }
                ],
                "indexedStages": [{ "$match": { "status": "A" } }]
            }
        ]
    }"#;

    #[test]
    fn unsupported_indexes_are_skipped() {
        let workload = Workload::from_json(WORKLOAD).unwrap();
        let names: Vec<_> = workload.index_specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["_id_", "status_1"]);
    }

    #[test]
    fn reports_follow_input_order() {
        let reports = Workload::from_json(WORKLOAD).unwrap().run().unwrap();
        let kinds: Vec<_> = reports.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![QueryType::Query, QueryType::Query, QueryType::Aggregation]
        );
        assert!(reports.iter().all(|r| r.collection == "orders"));

        // status_1 serves the first query, nothing serves the second.
        assert!(reports[0].suggestions.new_indexes().next().is_none());
        assert_eq!(
            reports[1].suggestions.indexes().collect::<Vec<_>>(),
            vec![NEW_INDEX_SUGGESTIONS]
        );
        assert!(!reports[2].suggestions.entries("status_1").is_empty());
    }

    #[test]
    fn query_text_is_compact_json() {
        let reports = Workload::from_json(WORKLOAD).unwrap().run().unwrap();
        assert_eq!(
            reports[0].query,
            r#"{"filter":{"status":"A","qty":{"$lt":5}},"sort":null,"projection":null}"#
        );
        assert_eq!(
            reports[2].query,
            r#"[{"$group":{"_id":"$status","n":{"$sum":1}}},{"$match":{"status":"A"}}]"#
        );
    }

    #[test]
    fn invalid_stage_is_reported() {
        let workload = Workload::from_json(
            r#"{ "collection": "c", "indexes": [], "aggregations": [{ "pipeline": [{ "$a": 1, "$b": 2 }] }] }"#,
        )
        .unwrap();
        let err = workload.run().unwrap_err();
        assert_eq!(err.kind(), "invalid_stage");
    }
}
