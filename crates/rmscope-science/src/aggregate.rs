//! Cross-record summaries: current affiliation and highest degree.

use std::cmp::Reverse;

use rmscope_core::Category;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::{DEGREE_FIELDS, Extractor, RecordScope, start_sort_key};
use crate::text::{clean, join_non_empty};

/// Degree rank, lowest first. Matched by lower-cased substring, checked from
/// the highest rank down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeLevel {
    Unspecified,
    Associate,
    Bachelor,
    Master,
    Doctor,
}

const LEVEL_KEYWORDS: &[(DegreeLevel, &[&str])] = &[
    (DegreeLevel::Doctor, &["doctor", "ph.d", "phd"]),
    (DegreeLevel::Master, &["master", "m.s", "msc", "m.sc"]),
    (DegreeLevel::Bachelor, &["bachelor", "b.s", "ba", "b.a", "b.sc"]),
    (DegreeLevel::Associate, &["associate"]),
];

impl DegreeLevel {
    /// `None` for an empty string; unrecognized text is [`Unspecified`](Self::Unspecified).
    pub fn from_text(degree: &str) -> Option<Self> {
        let lower = degree.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        let level = LEVEL_KEYWORDS
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
            .map(|(level, _)| *level)
            .unwrap_or(DegreeLevel::Unspecified);
        Some(level)
    }

    pub fn priority(self) -> u8 {
        self as u8 + 1
    }
}

/// Title of the research-experience record with the latest start.
///
/// Ties keep the earlier record. Empty input gives an empty string.
pub fn affiliation_summary(extractor: &Extractor, records: &[Value]) -> String {
    let lang = extractor.lang();
    let latest = records
        .iter()
        .enumerate()
        .max_by_key(|(i, record)| (start_sort_key(lang, record), Reverse(*i)))
        .map(|(_, record)| record);
    match latest {
        Some(record) => clean(&extractor.title(Category::ResearchExperience, record)),
        None => String::new(),
    }
}

/// `<degree> (<unit>, <school>)` for the best doctoral education record,
/// else the configured default line.
///
/// Highest level wins, then the latest start, then the earlier record.
pub fn degree_summary(extractor: &Extractor, records: &[Value]) -> String {
    let lang = extractor.lang();
    let best = records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let degree = clean(&lang.first_field(record, DEGREE_FIELDS));
            let level = DegreeLevel::from_text(&degree)?;
            if level < DegreeLevel::Doctor {
                return None;
            }
            Some((level, start_sort_key(lang, record), i, record, degree))
        })
        .max_by_key(|(level, start, i, _, _)| (*level, *start, Reverse(*i)));

    let Some((_, _, _, record, degree)) = best else {
        return extractor.default_degree_line().to_string();
    };

    let parts = extractor.education_parts(&RecordScope::new(record));
    let unit = clean(parts.primary_unit());
    let school = clean(&parts.school);
    let inside = join_non_empty(&[unit, school], ", ");
    if inside.is_empty() {
        degree
    } else {
        format!("{degree} ({inside})")
    }
}
