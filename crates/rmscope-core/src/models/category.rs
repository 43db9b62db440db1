use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One of the fixed record types served per profile.
///
/// Variants are declared in run order; [`Category::ALL`] preserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ResearchInterests,
    ResearchExperience,
    Education,
    CommitteeMemberships,
    Awards,
    PublishedPapers,
    Misc,
    BooksEtc,
    Presentations,
    TeachingExperience,
    AssociationMemberships,
    Works,
    IndustrialPropertyRights,
    SocialContribution,
    MediaCoverage,
    AcademicContribution,
    Others,
}

impl Category {
    pub const ALL: [Category; 17] = [
        Category::ResearchInterests,
        Category::ResearchExperience,
        Category::Education,
        Category::CommitteeMemberships,
        Category::Awards,
        Category::PublishedPapers,
        Category::Misc,
        Category::BooksEtc,
        Category::Presentations,
        Category::TeachingExperience,
        Category::AssociationMemberships,
        Category::Works,
        Category::IndustrialPropertyRights,
        Category::SocialContribution,
        Category::MediaCoverage,
        Category::AcademicContribution,
        Category::Others,
    ];

    /// Endpoint segment used by the remote API.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ResearchInterests => "research_interests",
            Self::ResearchExperience => "research_experience",
            Self::Education => "education",
            Self::CommitteeMemberships => "committee_memberships",
            Self::Awards => "awards",
            Self::PublishedPapers => "published_papers",
            Self::Misc => "misc",
            Self::BooksEtc => "books_etc",
            Self::Presentations => "presentations",
            Self::TeachingExperience => "teaching_experience",
            Self::AssociationMemberships => "association_memberships",
            Self::Works => "works",
            Self::IndustrialPropertyRights => "industrial_property_rights",
            Self::SocialContribution => "social_contribution",
            Self::MediaCoverage => "media_coverage",
            Self::AcademicContribution => "academic_contribution",
            Self::Others => "others",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ResearchInterests => "Research Interests / Keywords",
            Self::ResearchExperience => "Research Experience",
            Self::Education => "Education",
            Self::CommitteeMemberships => "Committee Memberships",
            Self::Awards => "Awards",
            Self::PublishedPapers => "Published Papers",
            Self::Misc => "MISC",
            Self::BooksEtc => "Books and Other Publications",
            Self::Presentations => "Presentations",
            Self::TeachingExperience => "Teaching Experience",
            Self::AssociationMemberships => "Professional Memberships",
            Self::Works => "Works",
            Self::IndustrialPropertyRights => "Industrial Property Rights",
            Self::SocialContribution => "Social Contribution",
            Self::MediaCoverage => "Media Coverage",
            Self::AcademicContribution => "Academic Contribution",
            Self::Others => "Others",
        }
    }

    pub fn has_venue(&self) -> bool {
        matches!(self, Self::PublishedPapers | Self::Misc | Self::Presentations)
    }

    /// Categories whose records get an outbound link. Only papers do.
    pub fn is_publication_like(&self) -> bool {
        matches!(self, Self::PublishedPapers)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s.trim()).ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}
