//! Canonical survey fields.
//!
//! Every column the pipeline understands is identified by a [`CanonicalField`]
//! rather than by the decorated question text a form exports. Each field
//! declares a [`FieldKind`]; numeric items live on the closed 1..=5 Likert
//! scale.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower bound of the response scale.
pub const SCALE_MIN: f64 = 1.0;
/// Upper bound of the response scale.
pub const SCALE_MAX: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Timestamp,
    StudentId,
    StudentName,
    Expectation,
    Anxiety,
    AnticipatedEnjoyment,
    Confidence,
    Focus,
    Enjoyment,
    ConfidenceChange,
    EnjoymentChange,
    AnxietyChange,
    Understanding,
    SummaryText,
    SelfEvaluation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Likert response on the `SCALE_MIN..=SCALE_MAX` scale.
    Numeric,
    Text,
}

/// The ten numeric questionnaire items, in presentation order.
pub const SURVEY_ITEMS: [CanonicalField; 10] = [
    CanonicalField::Expectation,
    CanonicalField::Anxiety,
    CanonicalField::AnticipatedEnjoyment,
    CanonicalField::Confidence,
    CanonicalField::Focus,
    CanonicalField::Enjoyment,
    CanonicalField::ConfidenceChange,
    CanonicalField::EnjoymentChange,
    CanonicalField::AnxietyChange,
    CanonicalField::Understanding,
];

/// Before/after change items.
pub const DELTA_ITEMS: [CanonicalField; 3] = [
    CanonicalField::ConfidenceChange,
    CanonicalField::EnjoymentChange,
    CanonicalField::AnxietyChange,
];

pub const ALL_FIELDS: [CanonicalField; 15] = [
    CanonicalField::Timestamp,
    CanonicalField::StudentId,
    CanonicalField::StudentName,
    CanonicalField::Expectation,
    CanonicalField::Anxiety,
    CanonicalField::AnticipatedEnjoyment,
    CanonicalField::Confidence,
    CanonicalField::Focus,
    CanonicalField::Enjoyment,
    CanonicalField::ConfidenceChange,
    CanonicalField::EnjoymentChange,
    CanonicalField::AnxietyChange,
    CanonicalField::Understanding,
    CanonicalField::SummaryText,
    CanonicalField::SelfEvaluation,
];

impl CanonicalField {
    pub fn kind(self) -> FieldKind {
        match self {
            CanonicalField::Expectation
            | CanonicalField::Anxiety
            | CanonicalField::AnticipatedEnjoyment
            | CanonicalField::Confidence
            | CanonicalField::Focus
            | CanonicalField::Enjoyment
            | CanonicalField::ConfidenceChange
            | CanonicalField::EnjoymentChange
            | CanonicalField::AnxietyChange
            | CanonicalField::Understanding => FieldKind::Numeric,
            CanonicalField::Timestamp
            | CanonicalField::StudentId
            | CanonicalField::StudentName
            | CanonicalField::SummaryText
            | CanonicalField::SelfEvaluation => FieldKind::Text,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.kind() == FieldKind::Numeric
    }

    /// Short display label used on chart axes and in tables.
    pub fn label(self) -> &'static str {
        match self {
            CanonicalField::Timestamp => "타임스탬프",
            CanonicalField::StudentId => "학번",
            CanonicalField::StudentName => "학생 이름",
            CanonicalField::Expectation => "수업 기대도",
            CanonicalField::Anxiety => "긴장도",
            CanonicalField::AnticipatedEnjoyment => "재미 예상도",
            CanonicalField::Confidence => "자신감",
            CanonicalField::Focus => "집중도",
            CanonicalField::Enjoyment => "즐거움",
            CanonicalField::ConfidenceChange => "자신감 변화",
            CanonicalField::EnjoymentChange => "재미 변화",
            CanonicalField::AnxietyChange => "긴장도 변화",
            CanonicalField::Understanding => "이해도",
            CanonicalField::SummaryText => "수업 요약",
            CanonicalField::SelfEvaluation => "자기 평가",
        }
    }

    /// Stable identifier, matching the serialized form.
    pub fn key(self) -> &'static str {
        match self {
            CanonicalField::Timestamp => "timestamp",
            CanonicalField::StudentId => "student_id",
            CanonicalField::StudentName => "student_name",
            CanonicalField::Expectation => "expectation",
            CanonicalField::Anxiety => "anxiety",
            CanonicalField::AnticipatedEnjoyment => "anticipated_enjoyment",
            CanonicalField::Confidence => "confidence",
            CanonicalField::Focus => "focus",
            CanonicalField::Enjoyment => "enjoyment",
            CanonicalField::ConfidenceChange => "confidence_change",
            CanonicalField::EnjoymentChange => "enjoyment_change",
            CanonicalField::AnxietyChange => "anxiety_change",
            CanonicalField::Understanding => "understanding",
            CanonicalField::SummaryText => "summary_text",
            CanonicalField::SelfEvaluation => "self_evaluation",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn in_scale(value: f64) -> bool {
    (SCALE_MIN..=SCALE_MAX).contains(&value)
}

pub fn labels_of(fields: &[CanonicalField]) -> Vec<String> {
    fields.iter().map(|field| field.label().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_items_are_all_numeric() {
        assert!(SURVEY_ITEMS.iter().all(|field| field.is_numeric()));
        assert_eq!(
            ALL_FIELDS.iter().filter(|field| field.is_numeric()).count(),
            SURVEY_ITEMS.len()
        );
    }

    #[test]
    fn delta_items_are_a_subset_of_survey_items() {
        for field in DELTA_ITEMS {
            assert!(SURVEY_ITEMS.contains(&field), "{field:?} missing");
        }
    }

    #[test]
    fn key_matches_serialized_name() {
        for field in ALL_FIELDS {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }

    #[test]
    fn scale_bounds_are_inclusive() {
        assert!(in_scale(1.0));
        assert!(in_scale(5.0));
        assert!(!in_scale(0.0));
        assert!(!in_scale(5.5));
    }
}
