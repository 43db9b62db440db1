use rmscope_core::Category;
use serde_json::Value;

use super::Extractor;

const PAPER_VENUE_FIELDS: &[&str] = &[
    "journal",
    "journal_name",
    "journal_title",
    "publication_name",
    "published_in",
    "container_title",
    "source",
    "publisher",
    "proceedings",
    "conference",
    "book_title",
];

const MISC_VENUE_FIELDS: &[&str] = &[
    "journal",
    "journal_name",
    "journal_title",
    "publication_name",
    "published_in",
    "source",
    "publisher",
    "magazine",
    "book_title",
    "proceedings",
    "conference",
];

const PRESENTATION_VENUE_FIELDS: &[&str] = &[
    "conference",
    "conference_name",
    "conference_title",
    "meeting",
    "meeting_name",
    "meeting_title",
    "event",
    "event_name",
    "event_title",
    "society",
    "society_name",
    "organization",
    "organization_name",
    "venue",
    "place",
    "proceedings",
    "publisher",
];

fn venue_fields(category: Category) -> &'static [&'static str] {
    match category {
        Category::PublishedPapers => PAPER_VENUE_FIELDS,
        Category::Misc => MISC_VENUE_FIELDS,
        Category::Presentations => PRESENTATION_VENUE_FIELDS,
        _ => &[],
    }
}

impl Extractor {
    /// Journal, conference or similar; empty for categories without a venue.
    pub fn venue(&self, category: Category, record: &Value) -> String {
        self.lang.first_field(record, venue_fields(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmscope_core::{ExtractConfig, ProfileConfig};
    use serde_json::json;

    fn extractor() -> Extractor {
        Extractor::new(&ProfileConfig::default(), &ExtractConfig::default())
    }

    #[test]
    fn paper_venue_prefers_journal_fields() {
        let record = json!({
            "publisher": {"en": "Springer"},
            "publication_name": {"en": "Ecological Research", "ja": "生態学研究"}
        });
        assert_eq!(extractor().venue(Category::PublishedPapers, &record), "Ecological Research");
    }

    #[test]
    fn presentation_venue_uses_event_fields() {
        let record = json!({
            "event": {"ja": "日本生態学会大会"},
            "publisher": "Ignored"
        });
        assert_eq!(extractor().venue(Category::Presentations, &record), "日本生態学会大会");
    }

    #[test]
    fn other_categories_have_no_venue() {
        let record = json!({"journal": "Nature"});
        assert_eq!(extractor().venue(Category::Awards, &record), "");
        assert_eq!(extractor().venue(Category::Misc, &record), "Nature");
    }
}
