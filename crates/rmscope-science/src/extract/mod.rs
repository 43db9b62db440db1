//! Per-category recipes turning a record into display fields.

mod education;
mod title;
mod venue;
mod year;

use std::cell::OnceCell;

use rmscope_core::{Category, ExtractConfig, ExtractionResult, ProfileConfig};
use serde_json::Value;

use crate::collect::{Leaf, collect};
use crate::lang::LangResolver;
use crate::links::LinkResolver;

pub(crate) use education::DEGREE_FIELDS;
pub use education::EducationParts;
pub use year::{START_SORT_ABSENT, START_SORT_PRESENT, start_sort_key, year_range};

/// A record plus its lazily collected leaves, shared by every tier of one extraction.
pub(crate) struct RecordScope<'a> {
    pub record: &'a Value,
    leaves: OnceCell<Vec<Leaf>>,
}

impl<'a> RecordScope<'a> {
    pub fn new(record: &'a Value) -> Self {
        Self {
            record,
            leaves: OnceCell::new(),
        }
    }

    pub fn leaves(&self) -> &[Leaf] {
        self.leaves.get_or_init(|| collect(self.record))
    }
}

/// Holds the language policy, link policy and sentinels for one run.
#[derive(Debug, Clone)]
pub struct Extractor {
    lang: LangResolver,
    links: LinkResolver,
    no_title: String,
    default_degree_line: String,
}

impl Extractor {
    pub fn new(profile: &ProfileConfig, config: &ExtractConfig) -> Self {
        Self {
            lang: LangResolver::new(&profile.lang, config),
            links: LinkResolver::new(&profile.platform_domain),
            no_title: config.no_title.clone(),
            default_degree_line: config.default_degree_line.clone(),
        }
    }

    pub fn lang(&self) -> &LangResolver {
        &self.lang
    }

    pub fn no_title(&self) -> &str {
        &self.no_title
    }

    pub fn default_degree_line(&self) -> &str {
        &self.default_degree_line
    }

    /// All display fields for one record. Never fails; missing data degrades
    /// to empty strings or the no-title sentinel.
    pub fn extract(&self, category: Category, record: &Value) -> ExtractionResult {
        let scope = RecordScope::new(record);
        ExtractionResult {
            title: self.title_in(category, &scope),
            venue: self.venue(category, record),
            year: year_range(&self.lang, record),
            link: if category.is_publication_like() {
                self.links.pick_link(record, &self.lang)
            } else {
                String::new()
            },
        }
    }

    pub fn title(&self, category: Category, record: &Value) -> String {
        self.title_in(category, &RecordScope::new(record))
    }

    pub fn year(&self, record: &Value) -> String {
        year_range(&self.lang, record)
    }

    pub fn link(&self, record: &Value) -> String {
        self.links.pick_link(record, &self.lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extractor() -> Extractor {
        Extractor::new(&ProfileConfig::default(), &ExtractConfig::default())
    }

    #[test]
    fn published_paper_end_to_end() {
        let record = json!({
            "@type": "published_papers",
            "@id": "https://api.researchmap.jp/tokuo/published_papers/123",
            "paper_title": {"en": "Seasonal dynamics of <i>Daphnia</i>", "ja": "ミジンコの季節動態"},
            "publication_name": {"en": "Ecological Research"},
            "publication_date": "2018-03",
            "identifiers": {"doi": ["10.1007/s11284-018-1234-5"]},
            "see_also": [{"label": "url", "@id": "https://researchmap.jp/tokuo"}]
        });
        let result = extractor().extract(Category::PublishedPapers, &record);
        assert_eq!(result.title, "Seasonal dynamics of Daphnia");
        assert_eq!(result.venue, "Ecological Research");
        assert_eq!(result.year, "2018");
        assert_eq!(result.link, "https://doi.org/10.1007/s11284-018-1234-5");
    }

    #[test]
    fn non_publication_has_no_link_or_venue() {
        let record = json!({
            "award_name": {"en": "Best Paper Award"},
            "title": {"en": "Best Paper Award"},
            "award_date": "2020",
            "url": "https://doi.org/10.1/x"
        });
        let result = extractor().extract(Category::Awards, &record);
        assert_eq!(result.title, "Best Paper Award");
        assert_eq!(result.venue, "");
        assert_eq!(result.link, "");
    }

    #[test]
    fn misc_and_books_have_no_link() {
        let ex = extractor();
        let record = json!({
            "paper_title": {"en": "Field notes"},
            "book_title": {"en": "Field notes"},
            "identifiers": {"doi": ["10.1234/notes.1"]},
            "see_also": [{"label": "url", "@id": "https://www.jstage.jst.go.jp/article/x/1/1_1/_article"}]
        });
        assert_eq!(ex.extract(Category::Misc, &record).link, "");
        assert_eq!(ex.extract(Category::BooksEtc, &record).link, "");
        assert_eq!(
            ex.extract(Category::PublishedPapers, &record).link,
            "https://doi.org/10.1234/notes.1"
        );
    }

    #[test]
    fn malformed_record_degrades_to_sentinel() {
        let ex = extractor();
        for record in [json!(null), json!([]), json!(42), json!({"x": {"y": true}})] {
            let result = ex.extract(Category::Misc, &record);
            assert_eq!(result.title, "(no title)");
            assert_eq!(result.venue, "");
            assert_eq!(result.year, "");
            assert_eq!(result.link, "");
        }
    }
}
