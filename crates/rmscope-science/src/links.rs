//! Outbound link discovery and ranking for publication-like records.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde_json::Value;
use tracing::trace;

use crate::collect::walk_leaves_except;
use crate::doi::{Doi, extract_dois_from_text};
use crate::lang::LangResolver;

static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href\s*=\s*(?:"(https?://[^"]+)"|'(https?://[^']+)')"#)
        .expect("valid href regex")
});
static PLAIN_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s"'<>()]+"#).expect("valid url regex"));
static TRAILING_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[)\],.;:!?]+$").expect("valid trailing punctuation regex"));
static LEADING_BRACKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[(\[]+").expect("valid leading bracket regex"));
static JSON_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.json([?#]|$)").expect("valid json suffix regex"));

const ENTITIES: [(&str, &str); 6] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#x27;", "'"),
    ("&amp;", "&"),
];

/// Host reputation: `(suffix, score)`. A host matches when it equals the
/// suffix or ends with `.suffix`. Only the best matching entry counts.
const HOST_REPUTATION: &[(&str, i32)] = &[
    ("doi.org", 90),
    ("jstage.jst.go.jp", 80),
    ("springer.com", 70),
    ("sciencedirect.com", 70),
    ("wiley.com", 70),
    ("tandfonline.com", 70),
    ("nature.com", 65),
    ("aps.org", 65),
    ("cambridge.org", 65),
    ("oup.com", 65),
    ("oxfordjournals.org", 65),
    ("projecteuclid.org", 60),
    ("acm.org", 60),
    ("ieee.org", 60),
    ("arxiv.org", 55),
];

/// External links live in `see_also[].@id`, so only the type annotation is skipped.
const LINK_SCAN_SKIP: [&str; 1] = ["@type"];

const ARTICLE_SEGMENTS: [&str; 4] = ["/article/", "/abs/", "/doi/", "/document/"];
const ARTICLE_BONUS: i32 = 10;
const PDF_PENALTY: i32 = 10;

fn host_matches(host: &str, suffix: &str) -> bool {
    host == suffix
        || host
            .strip_suffix(suffix)
            .is_some_and(|rest| rest.ends_with('.'))
}

fn decode_entities(s: &str) -> String {
    let mut out = s.to_string();
    for (entity, ch) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, ch);
        }
    }
    out
}

/// Reputation of a parsed URL; unknown hosts score 0.
pub fn reputation(url: &Url) -> i32 {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let path = url.path().to_ascii_lowercase();

    let mut score = HOST_REPUTATION
        .iter()
        .filter(|(suffix, _)| host_matches(&host, suffix))
        .map(|(_, s)| *s)
        .max()
        .unwrap_or(0);
    if ARTICLE_SEGMENTS.iter().any(|seg| path.contains(seg)) {
        score += ARTICLE_BONUS;
    }
    if path.ends_with(".pdf") {
        score -= PDF_PENALTY;
    }
    score
}

#[derive(Debug, Clone)]
pub struct LinkResolver {
    platform_domain: String,
}

impl LinkResolver {
    pub fn new(platform_domain: &str) -> Self {
        Self {
            platform_domain: platform_domain.trim().to_ascii_lowercase(),
        }
    }

    fn is_platform_host(&self, host: &str) -> bool {
        !self.platform_domain.is_empty() && host_matches(host, &self.platform_domain)
    }

    /// Normalize a raw URL token. `None` when it is not an acceptable external link.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let decoded = decode_entities(raw.trim());
        let trimmed = TRAILING_PUNCT_RE.replace(&decoded, "");
        let token = LEADING_BRACKET_RE.replace(&trimmed, "");
        let token = token.trim();
        if !(token.starts_with("http://") || token.starts_with("https://")) {
            return None;
        }

        let mut url = Url::parse(token).ok()?;

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let kept: Vec<(String, String)> = pairs
            .iter()
            .filter(|(k, _)| k != "format")
            .cloned()
            .collect();
        if kept.len() != pairs.len() {
            if kept.is_empty() {
                url.set_query(None);
            } else {
                url.query_pairs_mut().clear().extend_pairs(kept);
            }
        }

        let host = url.host_str()?.to_ascii_lowercase();
        if self.is_platform_host(&host) {
            return None;
        }

        let out = url.to_string();
        if out.to_ascii_lowercase().contains("format=json") || JSON_SUFFIX_RE.is_match(&out) {
            return None;
        }
        Some(out)
    }

    /// Links found in one string: markup hrefs, then bare URLs, then DOI tokens.
    fn scan_text(&self, text: &str, out: &mut Vec<String>) {
        let hrefs = HREF_RE
            .captures_iter(text)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string());
        let plain = PLAIN_URL_RE.find_iter(text).map(|m| m.as_str().to_string());
        let dois = extract_dois_from_text(text).into_iter().map(|d| d.url);

        for raw in hrefs.chain(plain).chain(dois) {
            if let Some(url) = self.normalize(&raw) {
                push_unique(out, url);
            }
        }
    }

    /// All acceptable links in first-seen order, identifier DOI first.
    pub fn candidates(&self, record: &Value, lang: &LangResolver) -> Vec<String> {
        let mut out = Vec::new();

        let doi_field = record
            .pointer("/identifiers/doi/0")
            .or_else(|| record.pointer("/identifiers/doi").filter(|v| !v.is_array()))
            .map(|v| lang.resolve(v))
            .filter(|s| !s.is_empty())
            .or_else(|| Some(lang.field(record, "doi")).filter(|s| !s.is_empty()));
        if let Some(url) = doi_field
            .as_deref()
            .and_then(Doi::parse)
            .and_then(|doi| self.normalize(&doi.url))
        {
            out.push(url);
        }

        walk_leaves_except(record, &LINK_SCAN_SKIP, &mut |_path: &str, leaf: &Value| {
            if let Value::String(s) = leaf {
                self.scan_text(s, &mut out);
            }
        });
        out
    }

    /// The best-reputed external link, or empty.
    pub fn pick_link(&self, record: &Value, lang: &LangResolver) -> String {
        let mut best: Option<(i32, String)> = None;
        for url in self.candidates(record, lang) {
            let score = Url::parse(&url).map(|u| reputation(&u)).unwrap_or(0);
            trace!(%url, score, "link candidate");
            if best.as_ref().is_none_or(|(top, _)| score > *top) {
                best = Some((score, url));
            }
        }
        best.map(|(_, url)| url).unwrap_or_default()
    }
}

fn push_unique(out: &mut Vec<String>, url: String) {
    if !out.contains(&url) {
        out.push(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmscope_core::ExtractConfig;
    use serde_json::json;

    fn resolver() -> LinkResolver {
        LinkResolver::new("researchmap.jp")
    }

    fn lang() -> LangResolver {
        LangResolver::new("en", &ExtractConfig::default())
    }

    #[test]
    fn normalize_trims_punctuation_and_brackets() {
        let r = resolver();
        assert_eq!(
            r.normalize("(https://example.org/paper/1)."),
            Some("https://example.org/paper/1".to_string())
        );
        assert_eq!(
            r.normalize("https://example.org/a?x=1&amp;y=2"),
            Some("https://example.org/a?x=1&y=2".to_string())
        );
    }

    #[test]
    fn normalize_requires_http_scheme() {
        let r = resolver();
        assert_eq!(r.normalize("ftp://example.org/x"), None);
        assert_eq!(r.normalize("example.org/x"), None);
        assert_eq!(r.normalize("https://"), None);
    }

    #[test]
    fn normalize_drops_format_parameter() {
        let r = resolver();
        assert_eq!(
            r.normalize("https://example.org/paper?id=3&format=json"),
            Some("https://example.org/paper?id=3".to_string())
        );
        assert_eq!(
            r.normalize("https://example.org/paper?format=html"),
            Some("https://example.org/paper".to_string())
        );
    }

    #[test]
    fn normalize_rejects_remaining_json_signals() {
        let r = resolver();
        assert_eq!(r.normalize("https://example.org/data.json"), None);
        assert_eq!(r.normalize("https://example.org/data.JSON?x=1"), None);
        assert_eq!(r.normalize("https://example.org/p?format=json#format=json"), None);
    }

    #[test]
    fn normalize_rejects_platform_domain() {
        let r = resolver();
        assert_eq!(r.normalize("https://researchmap.jp/tokuo"), None);
        assert_eq!(r.normalize("https://api.researchmap.jp/tokuo/published_papers"), None);
        assert!(r.normalize("https://notresearchmap.jp/x").is_some());
    }

    #[test]
    fn reputation_table() {
        let score = |s: &str| reputation(&Url::parse(s).unwrap());
        assert_eq!(score("https://doi.org/10.1/x"), 90);
        assert_eq!(score("https://link.springer.com/article/10.1007/x"), 80);
        assert_eq!(score("https://arxiv.org/abs/1706.03762"), 65);
        assert_eq!(score("https://arxiv.org/pdf/1706.03762.pdf"), 45);
        assert_eq!(score("https://example.org/x"), 0);
        assert_eq!(score("https://notnature.com/x"), 0);
    }

    #[test]
    fn doi_field_beats_low_reputation_url() {
        let record = json!({
            "paper_title": {"en": "A study"},
            "see_also": [{"label": "url", "@id": "https://blog.example.org/post"}],
            "identifiers": {"doi": ["10.1234/ABC.5"]}
        });
        assert_eq!(resolver().pick_link(&record, &lang()), "https://doi.org/10.1234/abc.5");
    }

    #[test]
    fn scans_hrefs_bare_urls_and_doi_tokens() {
        let record = json!({
            "description": {
                "en": "<a href=\"https://www.jstage.jst.go.jp/article/x/1/1_1/_article\">J-STAGE</a> or doi 10.5555/ZZZ"
            },
            "url": "https://researchmap.jp/tokuo/published_papers/1"
        });
        let r = resolver();
        let found = r.candidates(&record, &lang());
        assert_eq!(
            found,
            vec![
                "https://www.jstage.jst.go.jp/article/x/1/1_1/_article".to_string(),
                "https://doi.org/10.5555/zzz".to_string(),
            ]
        );
        // jstage article (80 + 10) ties the resolver (90); first seen wins
        assert_eq!(
            r.pick_link(&record, &lang()),
            "https://www.jstage.jst.go.jp/article/x/1/1_1/_article"
        );
    }

    #[test]
    fn see_also_id_is_a_link_source() {
        let record = json!({
            "@id": "https://api.researchmap.jp/tokuo/published_papers/12",
            "@type": "published_papers",
            "paper_title": {"en": "A study"},
            "see_also": [{
                "label": "url",
                "@id": "https://www.jstage.jst.go.jp/article/jjl/80/1/80_1/_article"
            }]
        });
        assert_eq!(
            resolver().pick_link(&record, &lang()),
            "https://www.jstage.jst.go.jp/article/jjl/80/1/80_1/_article"
        );
    }

    #[test]
    fn ties_keep_first_seen() {
        let record = json!({"a": "https://one.example.org/x", "b": "https://two.example.org/y"});
        assert_eq!(resolver().pick_link(&record, &lang()), "https://one.example.org/x");
    }

    #[test]
    fn nothing_acceptable_yields_empty() {
        let record = json!({"see_also": "https://api.researchmap.jp/tokuo?format=json"});
        assert_eq!(resolver().pick_link(&record, &lang()), "");
    }
}
