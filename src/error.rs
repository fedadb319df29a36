use itertools::Itertools;
use thiserror::Error;

use crate::{chart::ChartKind, fields::CanonicalField};

/// Failures the pipeline reports to its caller.
///
/// Per-cell parse problems are not errors; they are recorded on the
/// [`Record`](crate::dataset::Record) and the pipeline keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    #[error("header row is empty; no responses can be processed")]
    HeaderEmpty,
    #[error("student '{0}' was not found in the responses")]
    EntityNotFound(String),
    #[error("chart '{0}' requires a student name")]
    MissingEntityName(ChartKind),
    #[error("responses are missing required field(s): {}", .0.iter().map(|f| f.label()).join(", "))]
    MissingRequiredFields(Vec<CanonicalField>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_names_every_field() {
        let err = SurveyError::MissingRequiredFields(vec![
            CanonicalField::Anxiety,
            CanonicalField::Understanding,
        ]);
        assert_eq!(
            err.to_string(),
            "responses are missing required field(s): 긴장도, 이해도"
        );
    }

    #[test]
    fn missing_entity_name_mentions_chart_kind() {
        let err = SurveyError::MissingEntityName(ChartKind::Delta);
        assert_eq!(err.to_string(), "chart 'delta' requires a student name");
    }
}
