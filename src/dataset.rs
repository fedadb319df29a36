//! Typed, immutable survey dataset.
//!
//! A [`Dataset`] owns the [`HeaderMapping`] it was built from and an ordered
//! list of [`Record`]s. Numeric cells that could not be used are stored as
//! [`CellValue::NotAvailable`]; they are never folded into zero.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{
    fields::{CanonicalField, FieldKind, SURVEY_ITEMS},
    labels::{ColumnKey, HeaderMapping},
};

static NOT_AVAILABLE: CellValue = CellValue::NotAvailable;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    NotAvailable,
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, CellValue::NotAvailable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The text is not a finite number.
    NotNumeric,
    /// Parsed, but rejected by the range policy.
    OutOfRange,
}

/// A cell that could not be used as the number its field declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionFailure {
    pub field: CanonicalField,
    pub original: String,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// 1-based position among data rows.
    pub row: usize,
    pub(crate) values: BTreeMap<ColumnKey, CellValue>,
    pub(crate) failures: Vec<CoercionFailure>,
    pub(crate) out_of_range: Vec<CanonicalField>,
}

impl Record {
    pub(crate) fn new(row: usize) -> Self {
        let mut values = BTreeMap::new();
        for field in SURVEY_ITEMS {
            values.insert(ColumnKey::Field(field), CellValue::NotAvailable);
        }
        Self {
            row,
            values,
            failures: Vec::new(),
            out_of_range: Vec::new(),
        }
    }

    pub fn get(&self, key: &ColumnKey) -> &CellValue {
        self.values.get(key).unwrap_or(&NOT_AVAILABLE)
    }

    pub fn field(&self, field: CanonicalField) -> &CellValue {
        self.get(&ColumnKey::Field(field))
    }

    pub fn number(&self, field: CanonicalField) -> Option<f64> {
        self.field(field).as_number()
    }

    pub fn text(&self, field: CanonicalField) -> Option<&str> {
        self.field(field).as_text()
    }

    pub fn opaque(&self, header: &str) -> Option<&str> {
        self.get(&ColumnKey::Opaque(header.to_string())).as_text()
    }

    /// The respondent's name; a blank cell counts as no name.
    pub fn student_name(&self) -> Option<&str> {
        self.text(CanonicalField::StudentName)
            .filter(|name| !name.trim().is_empty())
    }

    pub fn values(&self) -> impl Iterator<Item = (&ColumnKey, &CellValue)> {
        self.values.iter()
    }

    pub fn coercion_failures(&self) -> &[CoercionFailure] {
        &self.failures
    }

    /// Numeric fields holding a value outside the response scale.
    pub fn out_of_range(&self) -> &[CanonicalField] {
        &self.out_of_range
    }

    pub fn numeric_vector(&self, fields: &[CanonicalField]) -> Vec<Option<f64>> {
        fields.iter().map(|field| self.number(*field)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAvailability {
    pub field: CanonicalField,
    pub declared: bool,
    pub available: usize,
    pub missing: usize,
    pub failures: usize,
    pub out_of_range: usize,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    mapping: HeaderMapping,
    records: Vec<Record>,
}

impl Dataset {
    pub(crate) fn new(mapping: HeaderMapping, records: Vec<Record>) -> Self {
        Self { mapping, records }
    }

    pub fn mapping(&self) -> &HeaderMapping {
        &self.mapping
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn declares(&self, field: CanonicalField) -> bool {
        self.mapping.declares(field)
    }

    /// Numeric fields present in the source header row.
    pub fn numeric_fields(&self) -> Vec<CanonicalField> {
        self.mapping
            .declared_fields()
            .into_iter()
            .filter(|field| field.kind() == FieldKind::Numeric)
            .collect()
    }

    /// Free-text fields present in the source header row, canonical ones first
    /// followed by opaque headers in column order.
    pub fn text_fields(&self) -> Vec<ColumnKey> {
        let mut keys: Vec<ColumnKey> = self
            .mapping
            .declared_fields()
            .into_iter()
            .filter(|field| field.kind() == FieldKind::Text)
            .map(ColumnKey::Field)
            .collect();
        for header in self.mapping.opaque_headers() {
            let key = ColumnKey::Opaque(header.to_string());
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Every record whose student name equals `name`, in input order.
    pub fn entities_named(&self, name: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| record.student_name() == Some(name))
            .collect()
    }

    pub fn first_named(&self, name: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|record| record.student_name() == Some(name))
    }

    pub fn all_entity_names(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .filter_map(|record| record.student_name())
            .map(str::to_string)
            .collect()
    }

    /// Values of `field` aligned with record order; `None` marks "not available".
    pub fn column(&self, field: CanonicalField) -> Vec<Option<f64>> {
        self.records
            .iter()
            .map(|record| record.number(field))
            .collect()
    }

    pub fn coercion_failures(&self) -> impl Iterator<Item = (usize, &CoercionFailure)> {
        self.records.iter().flat_map(|record| {
            record
                .coercion_failures()
                .iter()
                .map(move |failure| (record.row, failure))
        })
    }

    pub fn out_of_range(&self) -> impl Iterator<Item = (usize, CanonicalField)> + '_ {
        self.records.iter().flat_map(|record| {
            record
                .out_of_range()
                .iter()
                .map(move |field| (record.row, *field))
        })
    }

    pub fn availability(&self, fields: &[CanonicalField]) -> Vec<FieldAvailability> {
        fields
            .iter()
            .map(|field| {
                let available = self
                    .records
                    .iter()
                    .filter(|record| record.field(*field).is_available())
                    .count();
                FieldAvailability {
                    field: *field,
                    declared: self.declares(*field),
                    available,
                    missing: self.records.len() - available,
                    failures: self
                        .coercion_failures()
                        .filter(|(_, failure)| failure.field == *field)
                        .count(),
                    out_of_range: self.out_of_range().filter(|(_, f)| f == field).count(),
                }
            })
            .collect()
    }
}
