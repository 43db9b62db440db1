use once_cell::sync::Lazy;
use regex::Regex;

static DOI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b10\.\d{4,9}/[-._;()/:A-Z0-9]+[A-Z0-9/]").expect("valid DOI regex")
});

const RESOLVER_PREFIXES: [&str; 4] = [
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doi {
    pub normalized: String,
    pub url: String,
}

impl Doi {
    /// Accepts a bare DOI, a `doi:` label, or a resolver URL.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();

        let stripped = RESOLVER_PREFIXES
            .iter()
            .find_map(|p| input.strip_prefix(p))
            .or_else(|| {
                input
                    .strip_prefix("doi:")
                    .or_else(|| input.strip_prefix("DOI:"))
                    .map(str::trim_start)
            })
            .unwrap_or(input);

        // Must start with "10.", contain "/", and have a non-empty suffix
        if !stripped.starts_with("10.") {
            return None;
        }
        let (_, suffix) = stripped.split_once('/')?;
        if suffix.trim().is_empty() || stripped.chars().any(char::is_whitespace) {
            return None;
        }

        let normalized = stripped.to_lowercase();
        let url = format!("https://doi.org/{normalized}");
        Some(Self { normalized, url })
    }
}

/// Every DOI-shaped token in free text, in order of appearance.
pub fn extract_dois_from_text(text: &str) -> Vec<Doi> {
    DOI_REGEX
        .find_iter(text)
        .filter_map(|m| Doi::parse(m.as_str()))
        .collect()
}
