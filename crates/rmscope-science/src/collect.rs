//! Deep traversal of arbitrarily nested records.

use serde_json::Value;

use crate::text::scalar_text;

/// Traversal stops below this depth; real records nest three or four levels.
pub const MAX_DEPTH: usize = 12;

/// JSON-LD annotations, never content.
const RESERVED_KEYS: [&str; 2] = ["@id", "@type"];

/// A cleaned leaf string and the route that reached it (`a.b[0].c`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub path: String,
    pub text: String,
}

/// Visit every scalar leaf of `value` in document order with its path.
///
/// Containers and null are not reported; reserved keys are skipped.
pub fn walk_leaves<'a, F>(value: &'a Value, visit: &mut F)
where
    F: FnMut(&str, &'a Value),
{
    walk_leaves_except(value, &RESERVED_KEYS, visit);
}

/// [`walk_leaves`] with a caller-chosen set of object keys to skip.
pub fn walk_leaves_except<'a, F>(value: &'a Value, skip: &[&str], visit: &mut F)
where
    F: FnMut(&str, &'a Value),
{
    walk(value, String::new(), 0, skip, visit);
}

fn walk<'a, F>(value: &'a Value, path: String, depth: usize, skip: &[&str], visit: &mut F)
where
    F: FnMut(&str, &'a Value),
{
    if depth > MAX_DEPTH {
        return;
    }
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk(item, format!("{path}[{i}]"), depth + 1, skip, visit);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                if skip.contains(&key.as_str()) {
                    continue;
                }
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(item, child, depth + 1, skip, visit);
            }
        }
        Value::Null => {}
        leaf => visit(&path, leaf),
    }
}

/// Every non-empty string or number leaf, cleaned, in discovery order.
pub fn collect(value: &Value) -> Vec<Leaf> {
    let mut out = Vec::new();
    walk_leaves(value, &mut |path: &str, leaf: &Value| {
        if let Some(text) = scalar_text(leaf).filter(|t| !t.is_empty()) {
            out.push(Leaf {
                path: path.to_string(),
                text,
            });
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(leaves: &[Leaf]) -> Vec<&str> {
        leaves.iter().map(|l| l.path.as_str()).collect()
    }

    #[test]
    fn paths_use_dots_and_brackets() {
        let record = json!({
            "paper_title": {"en": "A <i>study</i>", "ja": "研究"},
            "authors": {"en": [{"name": "Tokuo"}, {"name": "Smith"}]},
            "publication_date": "2019-04"
        });
        let leaves = collect(&record);
        assert_eq!(
            paths(&leaves),
            vec![
                "paper_title.en",
                "paper_title.ja",
                "authors.en[0].name",
                "authors.en[1].name",
                "publication_date",
            ]
        );
        assert_eq!(leaves[0].text, "A study");
    }

    #[test]
    fn skips_reserved_keys_empty_strings_and_booleans() {
        let record = json!({
            "@id": "https://api.researchmap.jp/x/published_papers/1",
            "@type": "published_papers",
            "title": "  ? ",
            "is_open": true,
            "volume": 12,
            "note": null
        });
        let leaves = collect(&record);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0], Leaf { path: "volume".to_string(), text: "12".to_string() });
    }

    #[test]
    fn custom_skip_set_keeps_ids() {
        let record = json!({
            "@type": "published_papers",
            "see_also": [{"label": "url", "@id": "https://example.org/a"}]
        });
        let mut seen = Vec::new();
        walk_leaves_except(&record, &["@type"], &mut |path: &str, _leaf: &Value| {
            seen.push(path.to_string());
        });
        assert_eq!(seen, vec!["see_also[0].label", "see_also[0].@id"]);
    }

    #[test]
    fn depth_is_capped() {
        let mut nested = json!("deep");
        for _ in 0..20 {
            nested = json!({ "k": nested });
        }
        assert!(collect(&nested).is_empty());

        let mut shallow = json!("ok");
        for _ in 0..MAX_DEPTH {
            shallow = json!({ "k": shallow });
        }
        assert_eq!(collect(&shallow).len(), 1);
    }

    #[test]
    fn scalar_root_has_empty_path() {
        let leaves = collect(&json!("Kyoto University"));
        assert_eq!(leaves[0].path, "");
    }
}
