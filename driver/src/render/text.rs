//! Human readable report.

use abbot_core::{Relation, ReportEntry, Suggestion, SuggestionKind};
use colored::{ColoredString, Colorize};
use serde_json::Value;

use crate::workload::QueryReport;

const QUERY_WIDTH: usize = 256;
const STAGES_WIDTH: usize = 50;
const ESR_LINK: &str = "https://www.mongodb.com/blog/post/performance-best-practices-indexing";

pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render(&self, reports: &[QueryReport]) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.paint("\n** ABBOT REPORT **", |s| s.cyan().on_black())));

        if reports.is_empty() {
            out.push_str(&format!(
                "{}\n",
                self.paint("\n\nCould not find anything to report.\n", |s| s.red())
            ));
            return out;
        }

        for report in reports {
            let query = format!("\nQuery: {}", truncate(&report.query, QUERY_WIDTH));
            out.push_str(&format!("{}\n", self.paint(&query, |s| s.blue())));

            if report.suggestions.is_empty() {
                out.push_str("No suggestions to report. Looks good!\n");
                continue;
            }
            for (index, entries) in report.suggestions.iter() {
                for entry in entries {
                    out.push_str(&self.entry(index, entry));
                }
            }
            out.push('\n');
        }
        out
    }

    fn entry(&self, index: &str, entry: &ReportEntry) -> String {
        match entry {
            ReportEntry::Suggestion(s) => self.suggestion(index, s),
            ReportEntry::Group(group) => {
                let connector = match group.relation {
                    Relation::And => "AND",
                    Relation::Or => "OR",
                };
                group
                    .suggestions
                    .iter()
                    .map(|s| self.suggestion(index, s))
                    .collect::<Vec<_>>()
                    .join(connector)
            }
            ReportEntry::NewIndex(new) => format!(
                "\nNo existing index can support your query. According to the ESR rule {}, here's an index that could help.\n {}\n",
                self.link(),
                new.key.to_json()
            ),
        }
    }

    fn suggestion(&self, index: &str, s: &Suggestion) -> String {
        let index = self.highlight(index);
        let fields = self.highlight(&s.fields.join(", "));
        let field = |i: usize| self.highlight(s.fields.get(i).map(String::as_str).unwrap_or(""));

        match s.kind {
            SuggestionKind::AddFieldsForIndexSupport => format!(
                "\nAdd the field(s) {fields} to the index {index} with any sorting order to utilize this index better.\n"
            ),
            SuggestionKind::ChangeRangeToFollowEsr => format!(
                "\nFor the query and index {index} combination, some range fields ({fields}) do not follow the ESR rule. Consider moving the fields to the right of the index. {}\n",
                self.link()
            ),
            SuggestionKind::AddFieldForCoveredQuery => format!(
                "\nAdd the field(s) {fields} to the query to utilize this index ({index}) better.\n"
            ),
            SuggestionKind::ChangeSortKeysToFollowEsr => format!(
                "\nFor the index {index}, some sort fields ({fields}) in your query do not follow the ESR rule. {}\n",
                self.link()
            ),
            SuggestionKind::CreateEsrIndex => format!(
                "\nNo existing index can support your query. According to the ESR rule {}, here's an index that could help.\n {}\n",
                self.link(),
                s.fields.join(", ")
            ),
            SuggestionKind::RemoveIdProjectionFromProjection => format!(
                "\nFor better support with index ({index}) add `\"_id\": 0` to your projection {}\n",
                field(0)
            ),
            SuggestionKind::RemoveFieldsFromProjection => format!(
                "\nFor better support with index ({index}) remove these fields ({fields}) from your projection\n"
            ),
            SuggestionKind::SortBeforeIntervene => format!(
                "\n\nMove the $sort stage {} before the index usage intervening stage {}.\n",
                field(0),
                field(1)
            ),
            SuggestionKind::MatchBeforeGroup => format!(
                "\nConsider moving this match stage ({}) before the group stage ({}) for better support with index ({index})\n",
                field(0),
                field(1)
            ),
            SuggestionKind::AddMatchFirstStage => {
                let payload = s.fields.first().map(String::as_str).unwrap_or("");
                match decode_stages(payload) {
                    Some(stages) if !stages.is_empty() => format!(
                        "\nReduce documents by adding a $match stage at the start of this pipeline - {}\n",
                        self.highlight(&truncate(payload, STAGES_WIDTH))
                    ),
                    _ => "\nReduce documents by adding a $match stage that will utilize any index as the first stage of your pipeline.\n".to_string(),
                }
            }
            SuggestionKind::MoveMatchFirstStage => format!(
                "\nMove the $match stage ({}) before the index usage intervening stage ({})\n",
                field(0),
                field(1)
            ),
        }
    }

    fn link(&self) -> String {
        format!("(Read more about it here: {})", self.paint(ESR_LINK, |s| s.blue()))
    }

    fn highlight(&self, s: &str) -> String {
        self.paint(s, |s| s.yellow())
    }

    fn paint(&self, s: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(s).to_string()
        } else {
            s.to_string()
        }
    }
}

/// Decode the stage list carried by `add_match_first_stage`.
fn decode_stages(payload: &str) -> Option<Vec<Value>> {
    serde_json::from_str::<Option<Vec<Value>>>(payload).ok().flatten()
}

fn truncate(s: &str, len: usize) -> String {
    match s.char_indices().nth(len) {
        Some((end, _)) => format!("{}... (truncated)", &s[..end]),
        None => s.to_string(),
    }
}
