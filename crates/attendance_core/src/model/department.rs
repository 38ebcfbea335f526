//! Department label parsing.
//!
//! Labels optionally carry the semester as a suffix: `CS-3rd`, `IT-2`,
//! `Software Engineering-5th`. A label without a recognizable suffix is the
//! department name as-is.

use once_cell::sync::Lazy;
use regex::Regex;

static SEMESTER_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?P<code>.*?\S)\s*-\s*(?P<semester>\d{1,2})(?:st|nd|rd|th)?\s*$")
        .expect("valid semester suffix regex")
});

/// Department label split into its department code and semester number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentLabel {
    pub code: String,
    pub semester: Option<u32>,
}

impl DepartmentLabel {
    pub fn parse(label: &str) -> Self {
        if let Some(captures) = SEMESTER_SUFFIX_RE.captures(label) {
            let semester = captures["semester"].parse::<u32>().ok();
            return Self {
                code: captures["code"].to_string(),
                semester,
            };
        }
        Self {
            code: label.trim().to_string(),
            semester: None,
        }
    }
}

/// Case-insensitive substring filter over department labels.
///
/// `"all"` and blank input match everything. Substring (not exact) matching
/// lets `"cs"` select `"CS-3rd"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DepartmentFilter {
    #[default]
    All,
    Contains(String),
}

impl DepartmentFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::All,
            Some(value) if value.eq_ignore_ascii_case("all") => Self::All,
            Some(value) => Self::Contains(value.to_lowercase()),
        }
    }

    pub fn matches(&self, department: &str) -> bool {
        match self {
            Self::All => true,
            Self::Contains(needle) => department.to_lowercase().contains(needle.as_str()),
        }
    }
}

impl From<&str> for DepartmentFilter {
    fn from(value: &str) -> Self {
        Self::parse(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{DepartmentFilter, DepartmentLabel};

    #[test]
    fn parses_semester_suffixes() {
        assert_eq!(
            DepartmentLabel::parse("CS-3rd"),
            DepartmentLabel {
                code: "CS".to_string(),
                semester: Some(3),
            }
        );
        assert_eq!(DepartmentLabel::parse("IT-2").semester, Some(2));
        assert_eq!(
            DepartmentLabel::parse("Software Engineering - 5th").code,
            "Software Engineering"
        );
    }

    #[test]
    fn labels_without_suffix_keep_full_name() {
        let label = DepartmentLabel::parse("Computer Science");
        assert_eq!(label.code, "Computer Science");
        assert_eq!(label.semester, None);

        let label = DepartmentLabel::parse("Pre-Med");
        assert_eq!(label.code, "Pre-Med");
        assert_eq!(label.semester, None);
    }

    #[test]
    fn filter_matches_substring_case_insensitively() {
        let filter = DepartmentFilter::from("cs");
        assert!(filter.matches("CS-3rd"));
        assert!(!filter.matches("IT-2nd"));

        assert_eq!(DepartmentFilter::from("all"), DepartmentFilter::All);
        assert_eq!(DepartmentFilter::parse(None), DepartmentFilter::All);
        assert_eq!(DepartmentFilter::from("  "), DepartmentFilter::All);
    }
}
