//! ESR ordering check between an index key and a classified query.
//!
//! Every index field the query touches falls into one zone: Equality, Sort or
//! Range. A compliant index lays those zones out as one contiguous
//! Equality -> Sort -> Range sequence, and orders its sort fields the way the
//! query requests them.

use crate::index::IndexKey;
use crate::query::{QueryShape, SortField};
use crate::report::{Reporter, Suggestion, SuggestionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Zone {
    Equality,
    Sort,
    Range,
}

fn zone_of(field: &str, shape: &QueryShape) -> Option<Zone> {
    if shape.is_equality(field) {
        Some(Zone::Equality)
    } else if shape.is_range(field) {
        // A field that is both sorted on and range-filtered is placed as a range.
        Some(Zone::Range)
    } else if shape.is_sort(field) {
        Some(Zone::Sort)
    } else {
        None
    }
}

/// ESR violations of one index for one query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Violations {
    /// Range fields positioned before an equality or sort field.
    pub range: Vec<String>,
    /// Sort fields out of the query's requested order or direction.
    pub sort: Vec<String>,
}

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.range.is_empty() && self.sort.is_empty()
    }
}

pub fn position_violations(key: &IndexKey, shape: &QueryShape) -> Violations {
    let zoned: Vec<(&str, Zone)> = key
        .field_names()
        .filter_map(|field| zone_of(field, shape).map(|zone| (field, zone)))
        .collect();

    let range = zoned
        .iter()
        .enumerate()
        .filter(|(i, (field, zone))| {
            let later = &zoned[i + 1..];
            match zone {
                // Also sorted on: its place among the sort keys is checked there.
                Zone::Range if shape.is_sort(field) => {
                    later.iter().any(|(_, z)| *z == Zone::Equality)
                }
                Zone::Range => later.iter().any(|(_, z)| *z < Zone::Range),
                _ => false,
            }
        })
        .map(|(_, (field, _))| field.to_string())
        .collect();

    Violations {
        range,
        sort: misordered_sort_fields(key, shape, &zoned),
    }
}

fn misordered_sort_fields(key: &IndexKey, shape: &QueryShape, zoned: &[(&str, Zone)]) -> Vec<String> {
    // Index sort fields in index order, and the query's sort restricted to
    // fields the index actually has. Equality-matched fields hold a single
    // value, so they never affect the order.
    let in_index: Vec<SortField> = key
        .fields()
        .iter()
        .filter(|f| shape.is_sort(&f.name) && !shape.is_equality(&f.name))
        .map(|f| SortField::new(f.name.clone(), f.direction))
        .collect();
    let requested: Vec<&SortField> = shape
        .sort_fields
        .iter()
        .filter(|s| key.contains(&s.field) && !shape.is_equality(&s.field))
        .collect();

    let mut bad: Vec<&str> = Vec::new();

    // An index can be walked backwards, so directions must all agree or all be inverted.
    let forward = in_index
        .iter()
        .zip(&requested)
        .all(|(i, r)| i.direction == r.direction);
    let backward = in_index
        .iter()
        .zip(&requested)
        .all(|(i, r)| i.direction == r.direction.reversed());
    if !forward && !backward {
        bad.extend(requested.iter().map(|s| s.field.as_str()));
    }

    for (i, r) in in_index.iter().zip(&requested) {
        if i.field != r.field {
            bad.push(r.field.as_str());
        }
    }

    // Sort fields must precede no equality field.
    for (pos, (field, zone)) in zoned.iter().enumerate() {
        if *zone == Zone::Sort && zoned[pos + 1..].iter().any(|(_, z)| *z == Zone::Equality) {
            bad.push(field);
        }
    }

    requested
        .iter()
        .map(|s| s.field.as_str())
        .filter(|field| bad.contains(field))
        .map(str::to_string)
        .collect()
}

/// Report ESR violations of `key` against `shape` under `index`.
pub fn check_position(index: &str, key: &IndexKey, shape: &QueryShape, reporter: &mut Reporter) {
    let Violations { range, sort } = position_violations(key, shape);
    match (range.is_empty(), sort.is_empty()) {
        (true, true) => {}
        (false, true) => reporter.suggest(index, SuggestionKind::ChangeRangeToFollowEsr, range),
        (true, false) => reporter.suggest(index, SuggestionKind::ChangeSortKeysToFollowEsr, sort),
        (false, false) => reporter.suggest_and(
            index,
            vec![
                Suggestion::new(SuggestionKind::ChangeRangeToFollowEsr, range),
                Suggestion::new(SuggestionKind::ChangeSortKeysToFollowEsr, sort),
            ],
        ),
    }
}
