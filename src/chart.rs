//! Chart request resolution.
//!
//! [`resolve`] validates a [`ChartRequest`] against a dataset and returns the
//! exact numeric payload a renderer needs, together with a [`ChartSpec`]
//! describing titles, axis labels and annotation precision. Nothing here draws.

use std::fmt;

use clap::ValueEnum;
use log::info;
use serde::Serialize;

use crate::{
    aggregate::Aggregator,
    dataset::Dataset,
    error::SurveyError,
    fields::{CanonicalField, DELTA_ITEMS, SCALE_MAX, SURVEY_ITEMS, labels_of},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// One student's ten item scores plus free-text answers
    Profile,
    /// Mean and standard deviation per item
    Means,
    /// One student's before/after change items
    Delta,
    /// Item-by-item correlation heatmap
    Correlation,
    /// Every student's item scores side by side
    Comparison,
}

impl ChartKind {
    pub fn requires_entity(self) -> bool {
        matches!(self, ChartKind::Profile | ChartKind::Delta)
    }

    pub fn required_fields(self) -> Vec<CanonicalField> {
        let mut fields = Vec::new();
        match self {
            ChartKind::Profile | ChartKind::Comparison => {
                fields.push(CanonicalField::StudentName);
                fields.extend(SURVEY_ITEMS);
            }
            ChartKind::Delta => {
                fields.push(CanonicalField::StudentName);
                fields.extend(DELTA_ITEMS);
            }
            ChartKind::Means | ChartKind::Correlation => fields.extend(SURVEY_ITEMS),
        }
        fields
    }

    fn spec(self, student: Option<&str>) -> ChartSpec {
        let student = student.unwrap_or_default();
        let (title, y_label, y_range, decimals) = match self {
            ChartKind::Profile => (
                format!("{student} 학생의 설문 응답"),
                Some("점수 (1-5)"),
                Some((0.0, SCALE_MAX)),
                1,
            ),
            ChartKind::Means => (
                "문항별 평균 점수 (오차 막대: 표준편차)".to_string(),
                Some("평균 점수 (1-5)"),
                Some((0.0, SCALE_MAX)),
                2,
            ),
            ChartKind::Delta => (
                format!("{student} 학생의 수업 전후 변화"),
                Some("변화 점수 (1-5)"),
                Some((0.0, SCALE_MAX)),
                1,
            ),
            ChartKind::Correlation => ("문항별 상관관계".to_string(), None, None, 2),
            ChartKind::Comparison => (
                "모든 학생의 설문 응답 비교".to_string(),
                Some("점수 (1-5)"),
                Some((0.0, SCALE_MAX)),
                1,
            ),
        };
        ChartSpec {
            kind: self,
            title,
            y_label: y_label.map(str::to_string),
            y_range,
            decimals,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Profile => "profile",
            ChartKind::Means => "means",
            ChartKind::Delta => "delta",
            ChartKind::Correlation => "correlation",
            ChartKind::Comparison => "comparison",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub student: Option<String>,
}

impl ChartRequest {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            student: None,
        }
    }

    pub fn for_student(kind: ChartKind, student: impl Into<String>) -> Self {
        Self {
            kind,
            student: Some(student.into()),
        }
    }

    /// Student name, treating a blank selection as absent.
    fn student(&self) -> Option<&str> {
        self.student
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

/// Presentation hints handed to the renderer alongside the numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub y_label: Option<String>,
    pub y_range: Option<(f64, f64)>,
    /// Digits after the decimal point for value annotations.
    pub decimals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub student: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartPayload {
    Profile {
        student: String,
        labels: Vec<String>,
        values: Vec<f64>,
        substituted: Vec<CanonicalField>,
        summary: Option<String>,
        self_evaluation: Option<String>,
    },
    Means {
        labels: Vec<String>,
        means: Vec<Option<f64>>,
        std_devs: Vec<Option<f64>>,
        counts: Vec<usize>,
    },
    Delta {
        student: String,
        labels: Vec<String>,
        values: Vec<f64>,
        substituted: Vec<CanonicalField>,
    },
    Correlation {
        labels: Vec<String>,
        matrix: Vec<Vec<Option<f64>>>,
    },
    Comparison {
        labels: Vec<String>,
        series: Vec<Series>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedChart {
    pub spec: ChartSpec,
    pub payload: ChartPayload,
}

pub fn resolve(dataset: &Dataset, request: &ChartRequest) -> Result<ResolvedChart, SurveyError> {
    let kind = request.kind;
    let student = request.student();
    if kind.requires_entity() && student.is_none() {
        return Err(SurveyError::MissingEntityName(kind));
    }

    let missing = kind
        .required_fields()
        .into_iter()
        .filter(|field| !dataset.declares(*field))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(SurveyError::MissingRequiredFields(missing));
    }

    let aggregator = Aggregator::new(dataset);
    let payload = match (kind, student) {
        (ChartKind::Profile, Some(name)) => {
            let profile = aggregator.per_entity(name)?;
            ChartPayload::Profile {
                student: profile.name,
                labels: labels_of(&profile.items.fields),
                values: profile.items.presented(),
                substituted: profile.items.substituted(),
                summary: profile.summary,
                self_evaluation: profile.self_evaluation,
            }
        }
        (ChartKind::Delta, Some(name)) => {
            let delta = aggregator.delta_triple(name)?;
            ChartPayload::Delta {
                student: delta.name,
                labels: labels_of(&delta.items.fields),
                values: delta.items.presented(),
                substituted: delta.items.substituted(),
            }
        }
        (ChartKind::Profile | ChartKind::Delta, None) => {
            return Err(SurveyError::MissingEntityName(kind));
        }
        (ChartKind::Means, _) => {
            let summaries = aggregator.field_means();
            ChartPayload::Means {
                labels: labels_of(aggregator.items()),
                means: summaries.iter().map(|summary| summary.mean).collect(),
                std_devs: summaries.iter().map(|summary| summary.std_dev).collect(),
                counts: summaries.iter().map(|summary| summary.count).collect(),
            }
        }
        (ChartKind::Correlation, _) => {
            let matrix = aggregator.correlation_matrix();
            ChartPayload::Correlation {
                labels: labels_of(&matrix.fields),
                matrix: matrix.values,
            }
        }
        (ChartKind::Comparison, _) => ChartPayload::Comparison {
            labels: labels_of(aggregator.items()),
            series: aggregator
                .comparison()
                .into_iter()
                .map(|profile| Series {
                    values: profile.items.presented(),
                    student: profile.name,
                })
                .collect(),
        },
    };

    info!("Resolved '{kind}' chart over {} record(s)", dataset.len());
    Ok(ResolvedChart {
        spec: kind.spec(student),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_scoped_kinds_are_profile_and_delta() {
        assert!(ChartKind::Profile.requires_entity());
        assert!(ChartKind::Delta.requires_entity());
        assert!(!ChartKind::Means.requires_entity());
        assert!(!ChartKind::Correlation.requires_entity());
        assert!(!ChartKind::Comparison.requires_entity());
    }

    #[test]
    fn delta_requires_name_and_change_items() {
        assert_eq!(
            ChartKind::Delta.required_fields(),
            vec![
                CanonicalField::StudentName,
                CanonicalField::ConfidenceChange,
                CanonicalField::EnjoymentChange,
                CanonicalField::AnxietyChange,
            ]
        );
        assert_eq!(ChartKind::Means.required_fields().len(), 10);
        assert_eq!(ChartKind::Profile.required_fields().len(), 11);
    }

    #[test]
    fn blank_student_counts_as_absent() {
        let request = ChartRequest::for_student(ChartKind::Profile, "   ");
        assert_eq!(request.student(), None);
    }

    #[test]
    fn spec_titles_include_student() {
        let spec = ChartKind::Delta.spec(Some("민지"));
        assert_eq!(spec.title, "민지 학생의 수업 전후 변화");
        assert_eq!(spec.decimals, 1);
        assert_eq!(ChartKind::Correlation.spec(None).y_range, None);
    }
}
