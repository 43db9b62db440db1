use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup regex"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Known misspellings in institution names, applied in order.
static TYPO_FIXES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\bUniverisity\b", "University"),
        (r"\bUniveristy\b", "University"),
        (r"\bEnviroment\b", "Environment"),
        (r"\bEnvironment Studies\b", "Environmental Studies"),
    ]
    .into_iter()
    .map(|(pattern, fix)| (Regex::new(pattern).expect("valid typo regex"), fix))
    .collect()
});

/// Decoding artifacts removed outright. `?` is among them even though it
/// also deletes genuine question marks in titles; upstream records
/// substitute it for characters they failed to decode.
fn is_artifact(c: char) -> bool {
    matches!(c, '\u{FFFD}' | '?' | '？')
}

pub fn strip_markup(raw: &str) -> String {
    MARKUP_RE.replace_all(raw, "").into_owned()
}

/// Normalize a raw string for display.
///
/// Markup is stripped first and whitespace collapsed before the typo table
/// runs, so `clean(clean(x)) == clean(x)`.
pub fn clean(raw: &str) -> String {
    let stripped = MARKUP_RE.replace_all(raw, "");
    let without_artifacts = stripped.replace(is_artifact, "");
    let collapsed = WHITESPACE_RE.replace_all(&without_artifacts, " ");
    let mut out = collapsed.trim().to_string();
    for (re, fix) in TYPO_FIXES.iter() {
        if re.is_match(&out) {
            out = re.replace_all(&out, *fix).into_owned();
        }
    }
    out
}

/// Text form of a scalar leaf: cleaned strings and numbers. Everything else is `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(clean(s)),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

/// Integers print without a fractional part, matching how the API emits years.
pub fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_default()
    }
}

/// Clean every part, drop empties, join with `sep`.
pub fn join_non_empty<S: AsRef<str>>(parts: &[S], sep: &str) -> String {
    parts
        .iter()
        .map(|p| clean(p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Length in characters, which is what the scorers measure.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
