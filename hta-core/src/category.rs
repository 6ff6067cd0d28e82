//! Project categories.
//!
//! A category is chosen once per batch, from a tag or from the project folder
//! name, and selects which extraction rules apply to every record.

use serde::{Deserialize, Serialize};

/// The disease domain of an HTA project.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProjectCategory {
    HpvVaccine,
    NcdScreening,
    Dialysis,
    Mdrtb,
    AiTbCxr,
    /// Fallback for anything unrecognized. No extraction rules apply.
    #[default]
    #[serde(other)]
    General,
}

/// Folder-name markers, checked in order; the first hit wins.
const PROJECT_NAME_MARKERS: &[(&str, ProjectCategory)] = &[
    ("hpv", ProjectCategory::HpvVaccine),
    ("ncd", ProjectCategory::NcdScreening),
    ("dialysis", ProjectCategory::Dialysis),
    ("mdrtb", ProjectCategory::Mdrtb),
    ("ai_tb", ProjectCategory::AiTbCxr),
];

impl ProjectCategory {
    /// The five categories that carry extraction rules.
    pub const RECOGNIZED: [ProjectCategory; 5] = [
        ProjectCategory::HpvVaccine,
        ProjectCategory::NcdScreening,
        ProjectCategory::Dialysis,
        ProjectCategory::Mdrtb,
        ProjectCategory::AiTbCxr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::HpvVaccine => "hpv_vaccine",
            ProjectCategory::NcdScreening => "ncd_screening",
            ProjectCategory::Dialysis => "dialysis",
            ProjectCategory::Mdrtb => "mdrtb",
            ProjectCategory::AiTbCxr => "ai_tb_cxr",
            ProjectCategory::General => "general",
        }
    }

    /// Exact tag match. Unknown tags degrade to [`ProjectCategory::General`].
    pub fn from_tag(tag: &str) -> Self {
        Self::RECOGNIZED
            .into_iter()
            .find(|c| c.as_str() == tag)
            .unwrap_or(ProjectCategory::General)
    }

    /// Detect the category from a project folder name such as
    /// `hta_project_01_hpv_vaccine`.
    pub fn from_project_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        PROJECT_NAME_MARKERS
            .iter()
            .find(|(marker, _)| lowered.contains(marker))
            .map(|(_, category)| *category)
            .unwrap_or(ProjectCategory::General)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ProjectCategory::General)
    }

    /// Human-readable domain label used in report headings.
    pub fn label(&self) -> &'static str {
        match self {
            ProjectCategory::HpvVaccine => "HPV vaccination",
            ProjectCategory::NcdScreening => "NCD screening",
            ProjectCategory::Dialysis => "Dialysis",
            ProjectCategory::Mdrtb => "MDR-TB treatment",
            ProjectCategory::AiTbCxr => "AI-assisted TB chest X-ray screening",
            ProjectCategory::General => "General",
        }
    }
}

impl std::fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_roundtrip() {
        for category in ProjectCategory::RECOGNIZED {
            assert_eq!(ProjectCategory::from_tag(category.as_str()), category);
        }
    }

    #[test]
    fn test_from_tag_unknown_is_general() {
        assert_eq!(ProjectCategory::from_tag("oncology"), ProjectCategory::General);
        assert_eq!(ProjectCategory::from_tag(""), ProjectCategory::General);
        assert_eq!(ProjectCategory::from_tag("HPV_VACCINE"), ProjectCategory::General);
    }

    #[test]
    fn test_from_project_name() {
        assert_eq!(
            ProjectCategory::from_project_name("hta_project_01_hpv_vaccine"),
            ProjectCategory::HpvVaccine
        );
        assert_eq!(
            ProjectCategory::from_project_name("hta_project_02_NCD_Screening"),
            ProjectCategory::NcdScreening
        );
        assert_eq!(
            ProjectCategory::from_project_name("hta_project_03_dialysis"),
            ProjectCategory::Dialysis
        );
        assert_eq!(
            ProjectCategory::from_project_name("hta_project_04_mdrtb_bpalm"),
            ProjectCategory::Mdrtb
        );
        assert_eq!(
            ProjectCategory::from_project_name("hta_project_05_ai_tb_cxr"),
            ProjectCategory::AiTbCxr
        );
        assert_eq!(
            ProjectCategory::from_project_name("hta_project_06_oncology"),
            ProjectCategory::General
        );
    }

    #[test]
    fn test_from_project_name_first_marker_wins() {
        assert_eq!(
            ProjectCategory::from_project_name("hpv_and_ncd"),
            ProjectCategory::HpvVaccine
        );
    }

    #[test]
    fn test_serde_tags() {
        let json = serde_json::to_string(&ProjectCategory::AiTbCxr).unwrap();
        assert_eq!(json, "\"ai_tb_cxr\"");
        let parsed: ProjectCategory = serde_json::from_str("\"something_else\"").unwrap();
        assert_eq!(parsed, ProjectCategory::General);
    }
}
