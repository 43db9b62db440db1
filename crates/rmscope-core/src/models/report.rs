use serde::{Deserialize, Serialize};

use super::category::Category;

const SEP_VENUE: &str = " - ";

/// Display fields computed for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    /// Empty for categories without a venue concept.
    pub venue: String,
    /// Empty, `YYYY`, `YYYY-YYYY` or `YYYY-present`.
    pub year: String,
    /// Empty or an absolute http(s) URL.
    pub link: String,
}

impl ExtractionResult {
    /// `title - venue (year)`, with the link appended in angle brackets when present.
    pub fn display_line(&self) -> String {
        let mut line = self.title.clone();
        if !self.venue.is_empty() {
            line.push_str(SEP_VENUE);
            line.push_str(&self.venue);
        }
        if !self.year.is_empty() {
            line.push_str(&format!(" ({})", self.year));
        }
        if !self.link.is_empty() {
            line.push_str(&format!(" <{}>", self.link));
        }
        line
    }
}

/// Cross-record summaries. Empty strings mean "not computed yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub affiliation: String,
    pub degree: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: Category,
    pub label: String,
    pub results: Vec<ExtractionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CategoryReport {
    pub fn success(category: Category, results: Vec<ExtractionResult>) -> Self {
        Self {
            category,
            label: category.label().to_string(),
            results,
            error: None,
        }
    }

    pub fn failure(category: Category, error: impl Into<String>) -> Self {
        Self {
            category,
            label: category.label().to_string(),
            results: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything the presentation layer consumes, as of the last finished category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub summary: AggregateSummary,
    pub categories: Vec<CategoryReport>,
}

impl RunSnapshot {
    pub fn report(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|r| r.category == category)
    }

    /// Plain-text rendering: summaries first, then every non-empty or failed category.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.summary.affiliation.is_empty() {
            lines.push("Affiliation".to_string());
            lines.push(format!("  {}", self.summary.affiliation));
        }
        if !self.summary.degree.is_empty() {
            lines.push("Degree".to_string());
            lines.push(format!("  {}", self.summary.degree));
        }
        for report in &self.categories {
            if let Some(err) = &report.error {
                lines.push(format!("{} (error)", report.label));
                lines.push(format!("  {err}"));
                continue;
            }
            if report.results.is_empty() {
                continue;
            }
            lines.push(format!("{} ({})", report.label, report.results.len()));
            lines.extend(report.results.iter().map(|r| format!("  {}", r.display_line())));
        }
        lines
    }
}
