//! Summaries derived from a [`Dataset`].
//!
//! Every statistic excludes "not available" cells field by field: a record
//! missing one item still contributes to every other item. Zero is only
//! substituted for missing values when a vector is prepared for display
//! (see [`ItemVector::presented`]).

use itertools::Itertools;
use serde::Serialize;

use crate::{
    dataset::{Dataset, Record},
    error::SurveyError,
    fields::{CanonicalField, DELTA_ITEMS, SURVEY_ITEMS},
};

/// Values of a fixed list of items taken from a single record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemVector {
    pub fields: Vec<CanonicalField>,
    pub values: Vec<Option<f64>>,
}

impl ItemVector {
    fn from_record(record: &Record, fields: &[CanonicalField]) -> Self {
        Self {
            fields: fields.to_vec(),
            values: record.numeric_vector(fields),
        }
    }

    /// Values ready for plotting, with missing entries drawn as 0.
    pub fn presented(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|value| value.unwrap_or(0.0))
            .collect()
    }

    /// Fields whose presented value is a substituted 0.
    pub fn substituted(&self) -> Vec<CanonicalField> {
        self.fields
            .iter()
            .zip(&self.values)
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| *field)
            .collect()
    }

    pub fn get(&self, field: CanonicalField) -> Option<f64> {
        self.fields
            .iter()
            .position(|candidate| *candidate == field)
            .and_then(|idx| self.values[idx])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityProfile {
    pub name: String,
    pub row: usize,
    pub items: ItemVector,
    pub summary: Option<String>,
    pub self_evaluation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaTriple {
    pub name: String,
    pub row: usize,
    pub items: ItemVector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub field: CanonicalField,
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub fields: Vec<CanonicalField>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: CanonicalField, b: CanonicalField) -> Option<f64> {
        let row = self.fields.iter().position(|field| *field == a)?;
        let col = self.fields.iter().position(|field| *field == b)?;
        self.values[row][col]
    }
}

/// Computes summaries over one dataset for a fixed list of numeric items.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    dataset: &'a Dataset,
    items: &'a [CanonicalField],
}

impl<'a> Aggregator<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self::with_items(dataset, &SURVEY_ITEMS)
    }

    pub fn with_items(dataset: &'a Dataset, items: &'a [CanonicalField]) -> Self {
        Self { dataset, items }
    }

    pub fn items(&self) -> &[CanonicalField] {
        self.items
    }

    /// First record named `name` (input order), its items and free-text answers.
    pub fn per_entity(&self, name: &str) -> Result<EntityProfile, SurveyError> {
        let record = self.first_named(name)?;
        Ok(self.profile_of(name, record))
    }

    pub fn delta_triple(&self, name: &str) -> Result<DeltaTriple, SurveyError> {
        let record = self.first_named(name)?;
        Ok(DeltaTriple {
            name: name.to_string(),
            row: record.row,
            items: ItemVector::from_record(record, &DELTA_ITEMS),
        })
    }

    pub fn field_means(&self) -> Vec<FieldSummary> {
        self.items
            .iter()
            .map(|field| {
                let mut stats = ColumnStats::default();
                for value in self.dataset.column(*field).into_iter().flatten() {
                    stats.add_value(value);
                }
                FieldSummary {
                    field: *field,
                    count: stats.count,
                    mean: stats.mean(),
                    std_dev: stats.std_dev(),
                }
            })
            .collect()
    }

    /// Pearson correlation over pairwise-complete observations.
    pub fn correlation_matrix(&self) -> CorrelationMatrix {
        let columns = self
            .items
            .iter()
            .map(|field| self.dataset.column(*field))
            .collect::<Vec<_>>();
        let varies = columns.iter().map(|column| has_variance(column)).collect::<Vec<_>>();

        let n = self.items.len();
        let mut values = vec![vec![None; n]; n];
        for (idx, row) in values.iter_mut().enumerate() {
            row[idx] = varies[idx].then_some(1.0);
        }
        for (i, j) in (0..n).tuple_combinations() {
            let r = if varies[i] && varies[j] {
                pearson(&columns[i], &columns[j])
            } else {
                None
            };
            values[i][j] = r;
            values[j][i] = r;
        }

        CorrelationMatrix {
            fields: self.items.to_vec(),
            values,
        }
    }

    /// One profile per distinct student name, in name order.
    pub fn comparison(&self) -> Vec<EntityProfile> {
        self.dataset
            .all_entity_names()
            .into_iter()
            .filter_map(|name| {
                let record = self.dataset.first_named(&name)?;
                Some(self.profile_of(&name, record))
            })
            .collect()
    }

    fn first_named(&self, name: &str) -> Result<&'a Record, SurveyError> {
        self.dataset
            .first_named(name)
            .ok_or_else(|| SurveyError::EntityNotFound(name.to_string()))
    }

    fn profile_of(&self, name: &str, record: &Record) -> EntityProfile {
        EntityProfile {
            name: name.to_string(),
            row: record.row,
            items: ItemVector::from_record(record, self.items),
            summary: record
                .text(CanonicalField::SummaryText)
                .map(str::to_string),
            self_evaluation: record
                .text(CanonicalField::SelfEvaluation)
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Default)]
struct ColumnStats {
    sum: f64,
    sum_squares: f64,
    count: usize,
}

impl ColumnStats {
    fn add_value(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_squares += value * value;
    }

    fn mean(&self) -> Option<f64> {
        if self.count > 0 {
            Some(self.sum / self.count as f64)
        } else {
            None
        }
    }

    fn std_dev(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        let mean = self.mean()?;
        let variance =
            (self.sum_squares - self.count as f64 * mean * mean) / (self.count as f64 - 1.0);
        Some(variance.max(0.0).sqrt())
    }
}

fn has_variance(column: &[Option<f64>]) -> bool {
    let available = column.iter().flatten().copied().collect::<Vec<_>>();
    if available.len() < 2 {
        return false;
    }
    let mean = available.iter().sum::<f64>() / available.len() as f64;
    available.iter().map(|value| (value - mean).powi(2)).sum::<f64>() > 0.0
}

fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect::<Vec<_>>();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_dev_needs_two_values() {
        let mut stats = ColumnStats::default();
        assert_eq!(stats.mean(), None);
        stats.add_value(3.0);
        assert_eq!(stats.mean(), Some(3.0));
        assert_eq!(stats.std_dev(), None);
        stats.add_value(5.0);
        let std_dev = stats.std_dev().unwrap();
        assert!((std_dev - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn pearson_uses_only_complete_pairs() {
        let x = [Some(1.0), Some(2.0), None, Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(100.0), Some(6.0)];
        let r = pearson(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_detects_anticorrelation() {
        let x = [Some(1.0), Some(2.0), Some(3.0)];
        let y = [Some(5.0), Some(3.0), Some(1.0)];
        assert!((pearson(&x, &y).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_is_undefined_for_flat_or_sparse_pairs() {
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
        assert_eq!(
            pearson(&[Some(1.0), Some(2.0)], &[Some(3.0), Some(3.0)]),
            None
        );
    }

    #[test]
    fn variance_ignores_missing_cells() {
        assert!(!has_variance(&[Some(2.0), None, Some(2.0)]));
        assert!(has_variance(&[Some(2.0), None, Some(4.0)]));
        assert!(!has_variance(&[None, None]));
    }

    #[test]
    fn presented_vector_substitutes_zero() {
        let vector = ItemVector {
            fields: vec![CanonicalField::Focus, CanonicalField::Anxiety],
            values: vec![Some(4.0), None],
        };
        assert_eq!(vector.presented(), vec![4.0, 0.0]);
        assert_eq!(vector.substituted(), vec![CanonicalField::Anxiety]);
        assert_eq!(vector.get(CanonicalField::Focus), Some(4.0));
        assert_eq!(vector.get(CanonicalField::Anxiety), None);
    }
}
