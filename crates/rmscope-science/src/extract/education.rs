//! Education records: school, graduate unit, faculty, department, degree.
//!
//! Each part tries named fields first, then value patterns, then path
//! keywords. The exclusions keep a department or graduate-school phrase from
//! being taken as the faculty (and vice versa).

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Extractor, RecordScope};
use crate::scoring::{PatternFilter, score_by_path, score_by_value};
use crate::text::{clean, join_non_empty};

static UNIVERSITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bUniversity\b").expect("valid university regex"));
static GRADUATE_SCHOOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bGraduate School\b").expect("valid graduate school regex"));
static FACULTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bFaculty\b").expect("valid faculty regex"));
static DEPARTMENT_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Department of\b").expect("valid department regex"));
static FACULTY_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Faculty of\b").expect("valid faculty prefix regex"));
static COLLEGE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^College of\b").expect("valid college prefix regex"));

const SCHOOL_FIELDS: &[&str] = &[
    "university",
    "school",
    "institution",
    "affiliation",
    "organization",
    "school_name",
    "university_name",
    "institution_name",
];
const GRADUATE_FIELDS: &[&str] = &[
    "graduate_school",
    "graduate",
    "school_of",
    "graduate_school_name",
    "grad_school",
    "gradschool",
];
const FACULTY_FIELDS: &[&str] = &[
    "faculty",
    "college",
    "division",
    "faculty_name",
    "college_name",
    "division_name",
];
pub(crate) const DEGREE_FIELDS: &[&str] = &[
    "degree",
    "education_level",
    "qualification",
    "status",
    "completion",
];

/// The resolved pieces of one education record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EducationParts {
    pub school: String,
    pub graduate: String,
    pub faculty: String,
    pub department: String,
    pub degree: String,
}

impl EducationParts {
    /// `school / graduate / faculty / department / degree`, empties skipped.
    pub fn joined(&self) -> String {
        join_non_empty(
            &[
                &self.school,
                &self.graduate,
                &self.faculty,
                &self.department,
                &self.degree,
            ],
            " / ",
        )
    }

    /// The most specific unit below the school.
    pub fn primary_unit(&self) -> &str {
        [&self.graduate, &self.faculty, &self.department]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Drop the faculty when it merely repeats the graduate unit.
fn suppress_duplicate_unit(graduate: &str, faculty: String) -> String {
    if !graduate.is_empty() && clean(graduate) == clean(&faculty) {
        String::new()
    } else {
        faculty
    }
}

impl Extractor {
    pub(crate) fn education_parts(&self, scope: &RecordScope<'_>) -> EducationParts {
        let graduate = self.education_graduate(scope);
        let faculty = suppress_duplicate_unit(&graduate, self.education_faculty(scope));
        EducationParts {
            school: self.education_school(scope),
            graduate,
            faculty,
            department: education_department(scope),
            degree: self.lang.first_field(scope.record, DEGREE_FIELDS),
        }
    }

    fn education_school(&self, scope: &RecordScope<'_>) -> String {
        let named = self.lang.first_field(scope.record, SCHOOL_FIELDS);
        if !named.is_empty() {
            return named;
        }
        let units: [&Regex; 4] = [
            &*DEPARTMENT_PREFIX_RE,
            &*GRADUATE_SCHOOL_RE,
            &*FACULTY_RE,
            &*COLLEGE_PREFIX_RE,
        ];
        let by_value = score_by_value(
            scope.leaves(),
            &[&*UNIVERSITY_RE],
            PatternFilter {
                exclude: &units,
                ..Default::default()
            },
        );
        if !by_value.is_empty() {
            return by_value;
        }
        let department: [&Regex; 1] = [&*DEPARTMENT_PREFIX_RE];
        score_by_path(
            scope.leaves(),
            &["university", "institution", "school", "organization"],
            PatternFilter {
                exclude: &department,
                ..Default::default()
            },
        )
    }

    fn education_graduate(&self, scope: &RecordScope<'_>) -> String {
        let named = self.lang.first_field(scope.record, GRADUATE_FIELDS);
        if !named.is_empty() && GRADUATE_SCHOOL_RE.is_match(&named) {
            return named;
        }
        let other_units: [&Regex; 3] = [&*DEPARTMENT_PREFIX_RE, &*FACULTY_PREFIX_RE, &*COLLEGE_PREFIX_RE];
        let graduate: [&Regex; 1] = [&*GRADUATE_SCHOOL_RE];
        let by_value = score_by_value(
            scope.leaves(),
            &graduate,
            PatternFilter {
                exclude: &other_units,
                ..Default::default()
            },
        );
        if !by_value.is_empty() {
            return by_value;
        }
        score_by_path(
            scope.leaves(),
            &["graduate", "grad", "graduate_school", "gradschool"],
            PatternFilter {
                require: &graduate,
                exclude: &other_units,
            },
        )
    }

    fn education_faculty(&self, scope: &RecordScope<'_>) -> String {
        let named = self.lang.first_field(scope.record, FACULTY_FIELDS);
        if !named.is_empty()
            && !GRADUATE_SCHOOL_RE.is_match(&named)
            && !DEPARTMENT_PREFIX_RE.is_match(&named)
        {
            return named;
        }
        let dept_or_grad: [&Regex; 2] = [&*DEPARTMENT_PREFIX_RE, &*GRADUATE_SCHOOL_RE];
        let filter = PatternFilter {
            exclude: &dept_or_grad,
            ..Default::default()
        };
        let prefixed = score_by_value(
            scope.leaves(),
            &[&*FACULTY_PREFIX_RE, &*COLLEGE_PREFIX_RE],
            filter,
        );
        if !prefixed.is_empty() {
            return prefixed;
        }
        let mentions = score_by_value(scope.leaves(), &[&*FACULTY_RE], filter);
        if !mentions.is_empty() {
            return mentions;
        }
        score_by_path(scope.leaves(), &["faculty", "college", "division"], filter)
    }
}

fn education_department(scope: &RecordScope<'_>) -> String {
    score_by_value(
        scope.leaves(),
        &[&*DEPARTMENT_PREFIX_RE],
        PatternFilter::default(),
    )
}
