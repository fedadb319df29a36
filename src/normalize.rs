//! Row normalization: raw string rows to typed [`Record`]s.
//!
//! Rows shorter than the header are padded with "not available" cells and
//! longer rows are truncated; spreadsheet exports routinely drop trailing
//! empty cells. Numeric fields are parsed here and every cell that cannot be
//! used is recorded on its record instead of failing the batch.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    dataset::{CellValue, CoercionFailure, Dataset, FailureReason, Record},
    error::SurveyError,
    fields::{CanonicalField, FieldKind, in_scale},
    labels::HeaderMapping,
};

/// What to do with a parsed number outside the response scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Keep the value and list the field in [`Record::out_of_range`].
    #[default]
    Flag,
    /// Store "not available" and record an `OutOfRange` coercion failure.
    Reject,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    pub range_policy: RangePolicy,
}

impl Normalizer {
    pub fn new(range_policy: RangePolicy) -> Self {
        Self { range_policy }
    }

    pub fn normalize(
        &self,
        mapping: HeaderMapping,
        rows: &[Vec<String>],
    ) -> Result<Dataset, SurveyError> {
        if mapping.is_empty() {
            return Err(SurveyError::HeaderEmpty);
        }

        let width = mapping.len();
        let mut records = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if row.len() > width {
                debug!(
                    "Row {} has {} cell(s) for {} header(s); ignoring the extra cells",
                    idx + 1,
                    row.len(),
                    width
                );
            }
            records.push(self.build_record(&mapping, idx + 1, row));
        }

        let dataset = Dataset::new(mapping, records);
        let failures = dataset.coercion_failures().count();
        let flagged = dataset.out_of_range().count();
        info!(
            "Normalized {} record(s) across {} column(s)",
            dataset.len(),
            width
        );
        if failures > 0 {
            warn!("{failures} numeric cell(s) could not be used and are treated as not available");
        }
        if flagged > 0 {
            warn!("{flagged} numeric cell(s) fall outside the 1-5 response scale");
        }
        Ok(dataset)
    }

    fn build_record(&self, mapping: &HeaderMapping, row_number: usize, row: &[String]) -> Record {
        let mut record = Record::new(row_number);
        for (position, column) in mapping.columns().iter().enumerate() {
            let cell = row.get(position).map(String::as_str);
            let value = match (column.key.kind(), column.key.field()) {
                (FieldKind::Numeric, Some(field)) => {
                    record.failures.retain(|failure| failure.field != field);
                    record.out_of_range.retain(|flagged| *flagged != field);
                    self.coerce(field, cell, &mut record)
                }
                _ => cell
                    .map(|text| CellValue::Text(text.to_string()))
                    .unwrap_or(CellValue::NotAvailable),
            };
            record.values.insert(column.key.clone(), value);
        }
        record
    }

    fn coerce(&self, field: CanonicalField, cell: Option<&str>, record: &mut Record) -> CellValue {
        let Some(raw) = cell else {
            return CellValue::NotAvailable;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::NotAvailable;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                if in_scale(value) {
                    return CellValue::Number(value);
                }
                match self.range_policy {
                    RangePolicy::Flag => {
                        debug!("Row {} {:?}: {value} is outside 1-5", record.row, field);
                        record.out_of_range.push(field);
                        CellValue::Number(value)
                    }
                    RangePolicy::Reject => {
                        record_failure(record, field, raw, FailureReason::OutOfRange);
                        CellValue::NotAvailable
                    }
                }
            }
            _ => {
                record_failure(record, field, raw, FailureReason::NotNumeric);
                CellValue::NotAvailable
            }
        }
    }
}

fn record_failure(record: &mut Record, field: CanonicalField, raw: &str, reason: FailureReason) {
    debug!(
        "Row {} {:?}: cannot use {raw:?} ({reason:?})",
        record.row, field
    );
    record.failures.push(CoercionFailure {
        field,
        original: raw.to_string(),
        reason,
    });
}

/// Normalizes with the default range policy.
pub fn normalize(mapping: HeaderMapping, rows: &[Vec<String>]) -> Result<Dataset, SurveyError> {
    Normalizer::default().normalize(mapping, rows)
}
