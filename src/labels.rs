//! Header mapping from exported question text to canonical fields.
//!
//! Form exports label their columns with the full decorated prompt (emoji,
//! question, scale hint). [`LabelDictionary`] resolves those strings to a
//! [`CanonicalField`]; anything it does not recognize is kept verbatim as an
//! opaque text column so no data is dropped.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::fields::{ALL_FIELDS, CanonicalField, FieldKind};

/// Bumped whenever a default label is added, removed or remapped.
pub const LABEL_DICTIONARY_VERSION: u32 = 1;

const DECORATED_LABELS: &[(&str, CanonicalField)] = &[
    ("📌 학생 번호를 선택하세요.", CanonicalField::StudentId),
    ("🧑\u{200d}🎓 학생 이름을 입력하세요.", CanonicalField::StudentName),
    ("🤩 오늘 수학 수업이 기대돼요. (1점: 전혀 기대되지 않아요 ~ 5점: 매우 기대돼요)", CanonicalField::Expectation),
    ("😨 오늘 수학 수업이 좀 긴장돼요. (1점: 전혀 긴장되지 않아요 ~ 5점: 매우 긴장돼요)", CanonicalField::Anxiety),
    ("🎲 오늘 배우는 수학 내용이 재미있을 것 같아요. (1점: 전혀 재미없을 것 같아요 ~ 5점: 매우 재미있을 것 같아요)", CanonicalField::AnticipatedEnjoyment),
    ("💪 오늘 수업을 잘 해낼 자신이 있어요. (1점: 전혀 자신 없어요 ~ 5점: 매우 자신 있어요)", CanonicalField::Confidence),
    ("🎯 지금 수업에 집중하고 있어요. (1점: 전혀 집중하지 못해요 ~ 5점: 완전히 집중하고 있어요)", CanonicalField::Focus),
    ("😆 지금 수업이 즐거워요. (1점: 전혀 즐겁지 않아요 ~ 5점: 매우 즐거워요)", CanonicalField::Enjoyment),
    ("🌟 이제 수학 공부에 자신감이 더 생겼어요. (1점: 전혀 그렇지 않아요 ~ 5점: 매우 그래요)", CanonicalField::ConfidenceChange),
    ("🎉 수업 후에 수학이 전보다 더 재미있어졌어요. (1점: 전혀 그렇지 않아요 ~ 5점: 매우 그래요)", CanonicalField::EnjoymentChange),
    ("😌 수업 후에는 수학 시간에 전보다 덜 긴장돼요. (1점: 전혀 그렇지 않아요 ~ 5점: 매우 그래요)", CanonicalField::AnxietyChange),
    ("🧠 오늘 수업 내용을 잘 이해했어요. (1점: 전혀 이해하지 못했어요 ~ 5점: 매우 잘 이해했어요)", CanonicalField::Understanding),
    ("📋 ✏\u{fe0f} 오늘 배운 수학 내용을 한 줄로 요약해 보세요.", CanonicalField::SummaryText),
    ("📋 💭 오늘 수업에서 스스로 잘한 점이나 아쉬운 점을 한 문장으로 적어 보세요.", CanonicalField::SelfEvaluation),
];

const ENGLISH_ALIASES: &[(&str, CanonicalField)] = &[
    ("Timestamp", CanonicalField::Timestamp),
    ("Student ID", CanonicalField::StudentId),
    ("Name", CanonicalField::StudentName),
    ("Student Name", CanonicalField::StudentName),
];

/// The questionnaire prompt the default dictionary knows for `field`.
pub fn decorated_label(field: CanonicalField) -> Option<&'static str> {
    DECORATED_LABELS
        .iter()
        .find(|(_, candidate)| *candidate == field)
        .map(|(label, _)| *label)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ColumnKey {
    Field(CanonicalField),
    Opaque(String),
}

impl ColumnKey {
    pub fn kind(&self) -> FieldKind {
        match self {
            ColumnKey::Field(field) => field.kind(),
            ColumnKey::Opaque(_) => FieldKind::Text,
        }
    }

    pub fn field(&self) -> Option<CanonicalField> {
        match self {
            ColumnKey::Field(field) => Some(*field),
            ColumnKey::Opaque(_) => None,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ColumnKey::Field(field) => field.label(),
            ColumnKey::Opaque(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    pub raw: String,
    pub key: ColumnKey,
}

/// Positional mapping of one header row. Column `i` of every data row is
/// interpreted through `columns()[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    columns: Vec<MappedColumn>,
}

impl HeaderMapping {
    pub fn columns(&self) -> &[MappedColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn declares(&self, field: CanonicalField) -> bool {
        self.columns
            .iter()
            .any(|column| column.key == ColumnKey::Field(field))
    }

    pub fn declared_fields(&self) -> BTreeSet<CanonicalField> {
        self.columns
            .iter()
            .filter_map(|column| column.key.field())
            .collect()
    }

    /// Position of the column backing `field`. Duplicate headers resolve to
    /// the last one, matching how rows are assembled.
    pub fn position_of(&self, field: CanonicalField) -> Option<usize> {
        self.columns
            .iter()
            .rposition(|column| column.key == ColumnKey::Field(field))
    }

    pub fn opaque_headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter_map(|column| match &column.key {
            ColumnKey::Opaque(raw) => Some(raw.as_str()),
            ColumnKey::Field(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LabelDictionary {
    entries: BTreeMap<String, CanonicalField>,
    normalized: HashMap<String, CanonicalField>,
}

impl Default for LabelDictionary {
    fn default() -> Self {
        let mut dictionary = Self::empty();
        for field in ALL_FIELDS {
            dictionary.insert(field.label(), field);
        }
        dictionary.extend(ENGLISH_ALIASES.iter().map(|(label, field)| (*label, *field)));
        dictionary.extend(DECORATED_LABELS.iter().map(|(label, field)| (*label, *field)));
        dictionary
    }
}

impl LabelDictionary {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
            normalized: HashMap::new(),
        }
    }

    pub fn insert(&mut self, label: impl Into<String>, field: CanonicalField) {
        let label = label.into();
        self.normalized.insert(normalize_label(&label), field);
        self.entries.insert(label, field);
    }

    /// Adds caller supplied labels. Later entries replace earlier ones.
    pub fn extend<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = (S, CanonicalField)>,
        S: Into<String>,
    {
        for (label, field) in labels {
            self.insert(label, field);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, CanonicalField)> {
        self.entries
            .iter()
            .map(|(label, field)| (label.as_str(), *field))
    }

    pub fn lookup(&self, raw: &str) -> Option<CanonicalField> {
        self.entries
            .get(raw)
            .copied()
            .or_else(|| self.normalized.get(&normalize_label(raw)).copied())
    }

    pub fn map(&self, raw_headers: &[String]) -> HeaderMapping {
        let columns = raw_headers
            .iter()
            .map(|raw| {
                let key = match self.lookup(raw) {
                    Some(field) => ColumnKey::Field(field),
                    None => {
                        debug!("Header {raw:?} is not in the label dictionary; keeping it as text");
                        ColumnKey::Opaque(raw.clone())
                    }
                };
                MappedColumn {
                    raw: raw.clone(),
                    key,
                }
            })
            .collect();
        HeaderMapping { columns }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.entries).context("Serializing label dictionary to YAML")
    }
}

fn normalize_label(label: &str) -> String {
    label.split_whitespace().join(" ")
}
