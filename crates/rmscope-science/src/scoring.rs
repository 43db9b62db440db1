//! Candidate ranking over collected leaves.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::collect::Leaf;
use crate::text::{char_len, clean};

static BARE_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}([-/][0-9]{1,2}){0,2}$").expect("valid bare date regex"));
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").expect("valid url regex"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid digits regex"));

const MIN_LEN: usize = 2;
const MAX_LEN: usize = 240;

/// A scored string. Higher score wins; on ties the earlier discovery wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub score: u32,
    pub order: usize,
}

/// Extra regex constraints on candidate values.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternFilter<'a> {
    /// Every pattern must match.
    pub require: &'a [&'a Regex],
    /// No pattern may match.
    pub exclude: &'a [&'a Regex],
}

impl PatternFilter<'_> {
    fn admits(&self, s: &str) -> bool {
        !self.exclude.iter().any(|re| re.is_match(s)) && self.require.iter().all(|re| re.is_match(s))
    }
}

/// Path substrings and the bonus each group earns in whole-record search.
#[derive(Debug, Clone, Copy)]
pub struct PathHint {
    pub needles: &'static [&'static str],
    pub bonus: u32,
}

pub const WHOLE_RECORD_HINTS: &[PathHint] = &[
    PathHint { needles: &["title", "name"], bonus: 30 },
    PathHint { needles: &["keyword", "interest", "area"], bonus: 20 },
    PathHint { needles: &["course", "subject"], bonus: 18 },
    PathHint {
        needles: &["affiliation", "institution", "organization", "society"],
        bonus: 14,
    },
];

/// Hints for keyword-like records, searched with the strict resolver.
pub const KEYWORD_RECORD_HINTS: &[PathHint] = &[
    PathHint { needles: &["title", "name"], bonus: 30 },
    PathHint { needles: &["keyword", "interest"], bonus: 20 },
];

/// Shared admission test: sensible length, not a bare date, URL or number.
pub fn is_displayable(s: &str) -> bool {
    let len = char_len(s);
    (MIN_LEN..=MAX_LEN).contains(&len)
        && !BARE_DATE_RE.is_match(s)
        && !URL_RE.is_match(s)
        && !DIGITS_RE.is_match(s)
}

pub fn length_bonus(s: &str) -> u32 {
    (char_len(s) / 12).min(20) as u32
}

/// Highest score first, discovery order on ties.
pub fn rank(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.order.cmp(&b.order)));
    candidates
}

pub fn best(candidates: Vec<Candidate>) -> Option<String> {
    rank(candidates).into_iter().next().map(|c| c.text)
}

/// Rank leaves whose lower-cased path contains at least one keyword.
///
/// Score is `25 × matched keywords + length bonus`.
pub fn score_by_path(leaves: &[Leaf], keywords: &[&str], filter: PatternFilter<'_>) -> String {
    let candidates = leaves
        .iter()
        .enumerate()
        .filter(|(_, leaf)| is_displayable(&leaf.text) && filter.admits(&leaf.text))
        .filter_map(|(order, leaf)| {
            let path = leaf.path.to_lowercase();
            let hits = keywords.iter().filter(|kw| path.contains(*kw)).count() as u32;
            if hits == 0 {
                return None;
            }
            let text = clean(&leaf.text);
            if text.is_empty() {
                return None;
            }
            let score = 25 * hits + length_bonus(&text);
            Some(Candidate { text, score, order })
        })
        .collect();
    best(candidates).unwrap_or_default()
}

/// Rank leaves by how many `include` patterns their value matches.
///
/// Score is `50 × matched patterns + length bonus`.
pub fn score_by_value(leaves: &[Leaf], include: &[&Regex], filter: PatternFilter<'_>) -> String {
    let candidates = leaves
        .iter()
        .enumerate()
        .filter(|(_, leaf)| is_displayable(&leaf.text) && filter.admits(&leaf.text))
        .filter_map(|(order, leaf)| {
            let hits = include.iter().filter(|re| re.is_match(&leaf.text)).count() as u32;
            if hits == 0 {
                return None;
            }
            let score = 50 * hits + length_bonus(&leaf.text);
            Some(Candidate {
                text: leaf.text.clone(),
                score,
                order,
            })
        })
        .collect();
    best(candidates).unwrap_or_default()
}

/// Last-resort search over every leaf, scored by path hints.
///
/// `accept` may transform or reject a leaf's text before scoring.
pub fn score_whole_record<F>(leaves: &[Leaf], hints: &[PathHint], mut accept: F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let candidates = leaves
        .iter()
        .enumerate()
        .filter(|(_, leaf)| is_displayable(&leaf.text))
        .filter_map(|(order, leaf)| {
            let text = accept(&leaf.text).filter(|t| !t.is_empty())?;
            let path = leaf.path.to_lowercase();
            let bonus: u32 = hints
                .iter()
                .filter(|hint| hint.needles.iter().any(|n| path.contains(n)))
                .map(|hint| hint.bonus)
                .sum();
            let score = bonus + length_bonus(&text);
            Some(Candidate { text, score, order })
        })
        .collect();
    best(candidates)
}
