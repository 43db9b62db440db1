use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::lang::LangResolver;

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("valid year regex"));
static YEAR_OR_SENTINEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2}|9999)\b").expect("valid year range regex"));

/// End dates of ongoing positions are recorded as `9999`.
const ONGOING_SENTINEL: &str = "9999";
const PRESENT: &str = "present";

const START_FIELDS: [&str; 6] = [
    "start_date",
    "from_date",
    "publication_date",
    "date",
    "year",
    "modified",
];
const END_FIELDS: [&str; 2] = ["to_date", "end_date"];
const SORT_FIELDS: [&str; 5] = ["start_date", "from_date", "date", "publication_date", "year"];

pub const START_SORT_ABSENT: i32 = -1;
pub const START_SORT_PRESENT: i32 = 9999;

fn year_token(raw: &str) -> Option<&str> {
    if raw.contains(ONGOING_SENTINEL) {
        return Some(PRESENT);
    }
    YEAR_RE.captures(raw).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Up to two distinct year tokens in order of appearance (`9999` → `present`).
fn year_pair(raw: &str) -> Vec<&str> {
    let mut years: Vec<&str> = Vec::with_capacity(2);
    for m in YEAR_OR_SENTINEL_RE.find_iter(raw) {
        let token = if m.as_str() == ONGOING_SENTINEL {
            PRESENT
        } else {
            m.as_str()
        };
        if !years.contains(&token) {
            years.push(token);
        }
        if years.len() == 2 {
            break;
        }
    }
    years
}

/// `""`, `YYYY`, `YYYY-YYYY` or `YYYY-present` from the record's date fields.
///
/// A start field holding a compound range (`2015/04 - 2019/03`) supplies
/// both ends when no end field resolves.
pub fn year_range(lang: &LangResolver, record: &Value) -> String {
    let start_raw = lang.first_field(record, &START_FIELDS);
    let end_raw = lang.first_field(record, &END_FIELDS);

    let start = year_token(&start_raw);
    let end = year_token(&end_raw);
    if let (Some(s), Some(e)) = (start, end) {
        return format!("{s}-{e}");
    }

    match year_pair(&start_raw).as_slice() {
        [first, second, ..] => format!("{first}-{second}"),
        _ => start.unwrap_or_default().to_string(),
    }
}

/// Sort key for "most recent start": absent sorts lowest, ongoing highest.
pub fn start_sort_key(lang: &LangResolver, record: &Value) -> i32 {
    let raw = lang.first_field(record, &SORT_FIELDS);
    match year_token(&raw) {
        None => START_SORT_ABSENT,
        Some(PRESENT) => START_SORT_PRESENT,
        Some(y) => y.parse().unwrap_or(START_SORT_ABSENT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmscope_core::ExtractConfig;
    use serde_json::json;

    fn lang() -> LangResolver {
        LangResolver::new("en", &ExtractConfig::default())
    }

    #[test]
    fn compound_start_field_yields_range() {
        let record = json!({"date": "2015/04 - 2019/03"});
        assert_eq!(year_range(&lang(), &record), "2015-2019");
    }

    #[test]
    fn ongoing_sentinel_maps_to_present() {
        let record = json!({"from_date": "2020-04", "to_date": "9999"});
        assert_eq!(year_range(&lang(), &record), "2020-present");
    }

    #[test]
    fn no_date_field_is_empty() {
        assert_eq!(year_range(&lang(), &json!({"title": "Published in 2019"})), "");
        assert_eq!(year_range(&lang(), &json!("2019")), "");
    }

    #[test]
    fn single_year_and_numeric_field() {
        assert_eq!(year_range(&lang(), &json!({"publication_date": "2018-03-01"})), "2018");
        assert_eq!(year_range(&lang(), &json!({"year": 2011})), "2011");
    }

    #[test]
    fn start_fields_follow_priority() {
        let record = json!({"modified": "2024-01-01", "publication_date": "2012-05"});
        assert_eq!(year_range(&lang(), &record), "2012");
    }

    #[test]
    fn end_without_start_is_empty() {
        assert_eq!(year_range(&lang(), &json!({"to_date": "2019"})), "");
    }

    #[test]
    fn out_of_range_years_ignored() {
        assert_eq!(year_range(&lang(), &json!({"from_date": "1850", "to_date": "2101"})), "");
    }

    #[test]
    fn compound_with_sentinel_keeps_order() {
        assert_eq!(year_range(&lang(), &json!({"date": "2015 - 9999"})), "2015-present");
    }

    #[test]
    fn sort_key() {
        let l = lang();
        assert_eq!(start_sort_key(&l, &json!({"from_date": "2016-04"})), 2016);
        assert_eq!(start_sort_key(&l, &json!({"start_date": "9999"})), START_SORT_PRESENT);
        assert_eq!(start_sort_key(&l, &json!({})), START_SORT_ABSENT);
    }
}
