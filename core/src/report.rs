//! Suggestion accumulator
//!
//! Analyzers write into a [`Reporter`] while a run is in progress; once every
//! analyzer has run, [`Reporter::finish`] freezes it into a read-only
//! [`Report`]. Entries are append-only and keep insertion order, both within
//! each index bucket and across buckets.

use crate::index::IndexKey;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bucket collecting recommendations for indexes that do not exist yet.
pub const NEW_INDEX_SUGGESTIONS: &str = "NEW_INDEX_SUGGESTIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    AddFieldsForIndexSupport,
    ChangeRangeToFollowEsr,
    AddFieldForCoveredQuery,
    ChangeSortKeysToFollowEsr,
    #[serde(rename = "create_new_index")]
    CreateEsrIndex,
    #[serde(rename = "remove_id_from_projection")]
    RemoveIdProjectionFromProjection,
    RemoveFieldsFromProjection,
    SortBeforeIntervene,
    MatchBeforeGroup,
    AddMatchFirstStage,
    MoveMatchFirstStage,
}

impl SuggestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SuggestionKind::AddFieldsForIndexSupport => "add_fields_for_index_support",
            SuggestionKind::ChangeRangeToFollowEsr => "change_range_to_follow_esr",
            SuggestionKind::AddFieldForCoveredQuery => "add_field_for_covered_query",
            SuggestionKind::ChangeSortKeysToFollowEsr => "change_sort_keys_to_follow_esr",
            SuggestionKind::CreateEsrIndex => "create_new_index",
            SuggestionKind::RemoveIdProjectionFromProjection => "remove_id_from_projection",
            SuggestionKind::RemoveFieldsFromProjection => "remove_fields_from_projection",
            SuggestionKind::SortBeforeIntervene => "sort_before_intervene",
            SuggestionKind::MatchBeforeGroup => "match_before_group",
            SuggestionKind::AddMatchFirstStage => "add_match_first_stage",
            SuggestionKind::MoveMatchFirstStage => "move_match_first_stage",
        }
    }
}

impl std::fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relation {
    /// Recommendations that reinforce each other; apply all of them.
    And,
    /// Independent alternatives; any one of them helps.
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "suggestion")]
    pub kind: SuggestionKind,
    pub fields: Vec<String>,
}

impl Suggestion {
    pub fn new<I, S>(kind: SuggestionKind, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionGroup {
    pub relation: Relation,
    pub suggestions: Vec<Suggestion>,
}

/// Synthesized index recommendation, stored under [`NEW_INDEX_SUGGESTIONS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIndexSuggestion {
    #[serde(rename = "suggestion")]
    pub kind: SuggestionKind,
    pub key: IndexKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportEntry {
    Group(SuggestionGroup),
    Suggestion(Suggestion),
    NewIndex(NewIndexSuggestion),
}

impl From<Suggestion> for ReportEntry {
    fn from(s: Suggestion) -> Self {
        ReportEntry::Suggestion(s)
    }
}

impl From<SuggestionGroup> for ReportEntry {
    fn from(g: SuggestionGroup) -> Self {
        ReportEntry::Group(g)
    }
}

type Buckets = Vec<(String, Vec<ReportEntry>)>;

/// Accumulating side of a report, written to by analyzers.
#[derive(Debug, Default)]
pub struct Reporter {
    buckets: Buckets,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to `index`'s bucket, creating the bucket on first use.
    pub fn insert(&mut self, index: &str, entry: impl Into<ReportEntry>) {
        let entry = entry.into();
        match self.buckets.iter_mut().find(|(name, _)| name == index) {
            Some((_, entries)) => entries.push(entry),
            None => self.buckets.push((index.to_string(), vec![entry])),
        }
    }

    pub fn suggest<I, S>(&mut self, index: &str, kind: SuggestionKind, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let suggestion = Suggestion::new(kind, fields);
        debug!(index, kind = %kind, fields = ?suggestion.fields, "suggestion");
        self.insert(index, suggestion);
    }

    pub fn suggest_or(&mut self, index: &str, suggestions: Vec<Suggestion>) {
        self.group(index, Relation::Or, suggestions);
    }

    pub fn suggest_and(&mut self, index: &str, suggestions: Vec<Suggestion>) {
        self.group(index, Relation::And, suggestions);
    }

    fn group(&mut self, index: &str, relation: Relation, suggestions: Vec<Suggestion>) {
        debug!(index, ?relation, count = suggestions.len(), "suggestion group");
        self.insert(
            index,
            SuggestionGroup {
                relation,
                suggestions,
            },
        );
    }

    pub fn suggest_new_index(&mut self, kind: SuggestionKind, key: IndexKey) {
        debug!(kind = %kind, key = %key.to_json(), "new index suggestion");
        self.insert(
            NEW_INDEX_SUGGESTIONS,
            ReportEntry::NewIndex(NewIndexSuggestion { kind, key }),
        );
    }

    /// Stop accumulating and hand out the read-only report.
    pub fn finish(self) -> Report {
        Report {
            buckets: self.buckets,
        }
    }
}

/// Finalized suggestions of one analysis run, keyed by index name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    buckets: Buckets,
}

impl Report {
    /// Entries recorded for `index`, empty when nothing was suggested.
    pub fn entries(&self, index: &str) -> &[ReportEntry] {
        self.buckets
            .iter()
            .find(|(name, _)| name == index)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn new_indexes(&self) -> impl Iterator<Item = &NewIndexSuggestion> {
        self.entries(NEW_INDEX_SUGGESTIONS)
            .iter()
            .filter_map(|e| match e {
                ReportEntry::NewIndex(s) => Some(s),
                _ => None,
            })
    }

    pub fn indexes(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ReportEntry])> {
        self.buckets
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|(_, e)| e.len()).sum()
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (name, entries) in &self.buckets {
            map.serialize_entry(name, entries)?;
        }
        map.end()
    }
}
