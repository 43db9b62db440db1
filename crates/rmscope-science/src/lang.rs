use rmscope_core::ExtractConfig;
use serde_json::Value;

use crate::collect::MAX_DEPTH;
use crate::text::{clean, number_text};

/// Collapses scalars and language-keyed mappings (`{"en": .., "ja": ..}`)
/// into a single display string.
#[derive(Debug, Clone)]
pub struct LangResolver {
    /// Preferred language followed by the fallbacks, without duplicates.
    order: Vec<String>,
    /// Keys consulted by the strict variant, in order.
    strict_order: Vec<String>,
    disallowed: Vec<(u32, u32)>,
}

impl LangResolver {
    pub fn new(preferred: &str, config: &ExtractConfig) -> Self {
        let mut order = vec![preferred.to_string()];
        for lang in &config.fallback_languages {
            if !order.contains(lang) {
                order.push(lang.clone());
            }
        }
        let mut strict_order = vec![config.strict_language.clone()];
        if preferred != config.strict_language {
            strict_order.push(preferred.to_string());
        }
        Self {
            order,
            strict_order,
            disallowed: config.disallowed_ranges.clone(),
        }
    }

    pub fn preferred(&self) -> &str {
        &self.order[0]
    }

    /// Resolve under the preference order, then fall back to the first
    /// nested entry that resolves to something. Empty when nothing does.
    pub fn resolve(&self, value: &Value) -> String {
        self.resolve_at(value, 0)
    }

    fn resolve_at(&self, value: &Value, depth: usize) -> String {
        if depth > MAX_DEPTH {
            return String::new();
        }
        match value {
            Value::String(s) => clean(s),
            Value::Number(n) => number_text(n),
            Value::Object(map) => {
                for lang in &self.order {
                    if let Some(Value::String(s)) = map.get(lang) {
                        let cleaned = clean(s);
                        if !cleaned.is_empty() {
                            return cleaned;
                        }
                    }
                }
                map.values()
                    .map(|v| self.resolve_at(v, depth + 1))
                    .find(|s| !s.is_empty())
                    .unwrap_or_default()
            }
            Value::Array(items) => items
                .iter()
                .map(|v| self.resolve_at(v, depth + 1))
                .find(|s| !s.is_empty())
                .unwrap_or_default(),
            Value::Null | Value::Bool(_) => String::new(),
        }
    }

    /// Like [`resolve`](Self::resolve) but only over the strict language keys,
    /// without the nested fallback, and never returning text that contains a
    /// disallowed-script character.
    pub fn resolve_strict(&self, value: &Value) -> String {
        match value {
            Value::Number(n) => number_text(n),
            Value::String(s) => self.reject_disallowed(clean(s)),
            Value::Object(map) => self
                .strict_order
                .iter()
                .filter_map(|lang| match map.get(lang) {
                    Some(Value::String(s)) => Some(self.reject_disallowed(clean(s))),
                    _ => None,
                })
                .find(|s| !s.is_empty())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    pub fn has_disallowed_script(&self, s: &str) -> bool {
        s.chars().any(|c| {
            let cp = c as u32;
            self.disallowed.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
        })
    }

    fn reject_disallowed(&self, s: String) -> String {
        if self.has_disallowed_script(&s) {
            String::new()
        } else {
            s
        }
    }

    /// Resolve `record[key]`; empty when the record is not a mapping or lacks the key.
    pub fn field(&self, record: &Value, key: &str) -> String {
        record
            .get(key)
            .map(|v| self.resolve(v))
            .unwrap_or_default()
    }

    pub fn field_strict(&self, record: &Value, key: &str) -> String {
        record
            .get(key)
            .map(|v| self.resolve_strict(v))
            .unwrap_or_default()
    }

    /// First non-empty [`field`](Self::field) among `keys`.
    pub fn first_field(&self, record: &Value, keys: &[&str]) -> String {
        keys.iter()
            .map(|k| self.field(record, k))
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }

    pub fn first_field_strict(&self, record: &Value, keys: &[&str]) -> String {
        keys.iter()
            .map(|k| self.field_strict(record, k))
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }
}
