use rmscope_core::Category;

use super::{Extractor, RecordScope};
use crate::scoring::{
    KEYWORD_RECORD_HINTS, PatternFilter, WHOLE_RECORD_HINTS, score_by_path, score_whole_record,
};
use crate::text::{clean, join_non_empty};

const KEYWORD_FIELDS: &[&str] = &[
    "research_interest",
    "keyword",
    "research_keyword",
    "research_interests",
    "name",
    "title",
];

const EXPERIENCE_ORG_FIELDS: &[&str] = &[
    "affiliation",
    "institution",
    "organization",
    "workplace",
    "employer",
    "university",
    "company",
    "school",
];
const EXPERIENCE_UNIT_FIELDS: &[&str] = &[
    "graduate_school",
    "faculty",
    "college",
    "department",
    "division",
    "section",
];
const EXPERIENCE_POSITION_FIELDS: &[&str] = &["position", "job", "role", "occupation", "title"];

const COURSE_FIELDS: &[&str] = &["course_name", "course", "subject", "class_name", "name", "title"];
const TEACHING_ORG_FIELDS: &[&str] = &[
    "affiliation",
    "institution",
    "organization",
    "university",
    "school",
];

const ASSOCIATION_FIELDS: &[&str] = &["association", "organization", "society", "name", "title"];

const ACTIVITY_FIELDS: &[&str] = &[
    "activity",
    "contribution",
    "role",
    "name",
    "title",
    "description",
    "summary",
];
const CONTRIBUTION_ORG_FIELDS: &[&str] = &["organization", "institution", "affiliation"];

const GENERIC_FIELDS: &[&str] = &[
    "title",
    "name",
    "paper_title",
    "book_title",
    "presentation_title",
    "work_title",
    "project_title",
    "activity_title",
    "subject",
    "description",
    "summary",
];
const GENERIC_PATH_KEYWORDS: &[&str] = &["title", "name"];

impl Extractor {
    pub(crate) fn title_in(&self, category: Category, scope: &RecordScope<'_>) -> String {
        let title = match category {
            Category::ResearchInterests => return self.keyword_title(scope),
            Category::ResearchExperience => self.composite(
                scope,
                &[
                    EXPERIENCE_ORG_FIELDS,
                    EXPERIENCE_UNIT_FIELDS,
                    EXPERIENCE_POSITION_FIELDS,
                ],
            ),
            Category::Education => self.education_parts(scope).joined(),
            Category::TeachingExperience => {
                self.composite(scope, &[COURSE_FIELDS, TEACHING_ORG_FIELDS])
            }
            Category::AssociationMemberships => {
                self.lang.first_field(scope.record, ASSOCIATION_FIELDS)
            }
            Category::AcademicContribution => {
                self.composite(scope, &[ACTIVITY_FIELDS, CONTRIBUTION_ORG_FIELDS])
            }
            _ => self.generic_title(scope),
        };
        let title = clean(&title);
        if title.is_empty() {
            self.whole_record_title(scope)
        } else {
            title
        }
    }

    /// One lookup per field group, joined with ` / `.
    fn composite(&self, scope: &RecordScope<'_>, groups: &[&[&str]]) -> String {
        let parts: Vec<String> = groups
            .iter()
            .map(|fields| self.lang.first_field(scope.record, fields))
            .collect();
        join_non_empty(&parts, " / ")
    }

    fn generic_title(&self, scope: &RecordScope<'_>) -> String {
        let named = self.lang.first_field(scope.record, GENERIC_FIELDS);
        if !named.is_empty() {
            return named;
        }
        score_by_path(scope.leaves(), GENERIC_PATH_KEYWORDS, PatternFilter::default())
    }

    /// Keywords are shown in the strict language only; text with a
    /// disallowed script is never chosen, even by the whole-record search.
    fn keyword_title(&self, scope: &RecordScope<'_>) -> String {
        let named = clean(&self.lang.first_field_strict(scope.record, KEYWORD_FIELDS));
        if !named.is_empty() {
            return named;
        }
        score_whole_record(scope.leaves(), KEYWORD_RECORD_HINTS, |text| {
            let text = clean(text);
            (!self.lang.has_disallowed_script(&text)).then_some(text)
        })
        .unwrap_or_else(|| self.no_title.clone())
    }

    fn whole_record_title(&self, scope: &RecordScope<'_>) -> String {
        score_whole_record(scope.leaves(), WHOLE_RECORD_HINTS, |text| Some(clean(text)))
            .unwrap_or_else(|| self.no_title.clone())
    }
}
