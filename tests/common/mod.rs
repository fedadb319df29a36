#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use survey_insight::{
    fields::{CanonicalField, SURVEY_ITEMS},
    labels::decorated_label,
    source::RawTable,
};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a classroom export with the full questionnaire header.
    pub fn write_classroom(&self, name: &str) -> PathBuf {
        let table = classroom();
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(self.temp_dir.path().join(name))
            .expect("create csv writer");
        writer.write_record(&table.headers).expect("write headers");
        for row in &table.rows {
            writer.write_record(row).expect("write row");
        }
        writer.flush().expect("flush csv");
        self.temp_dir.path().join(name)
    }
}

/// Header row exactly as the questionnaire exports it.
pub fn questionnaire_headers() -> Vec<String> {
    let mut headers = vec![
        "타임스탬프".to_string(),
        prompt(CanonicalField::StudentId),
        prompt(CanonicalField::StudentName),
    ];
    headers.extend(SURVEY_ITEMS.iter().map(|field| prompt(*field)));
    headers.push(prompt(CanonicalField::SummaryText));
    headers.push(prompt(CanonicalField::SelfEvaluation));
    headers
}

pub fn prompt(field: CanonicalField) -> String {
    decorated_label(field)
        .expect("decorated prompt for field")
        .to_string()
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

/// Three students, one of them answering twice, one with a malformed cell
/// and one whose export dropped the trailing free-text cells.
pub fn classroom() -> RawTable {
    RawTable {
        headers: questionnaire_headers(),
        rows: vec![
            row(&[
                "2025. 3. 29 오전 9:01:00", "1", "민지", "4", "2", "5", "4", "5", "5", "4", "5",
                "3", "4", "분수의 덧셈", "집중을 잘 했다",
            ]),
            row(&[
                "2025. 3. 29 오전 9:02:10", "2", "서준", "2", "4", "3", "2", "3", "3", "3", "2",
                "4", "3", "분수", "조금 어려웠다",
            ]),
            row(&[
                "2025. 3. 29 오전 9:03:45", "3", "하윤", "3", "abc", "4", "3", "4", "4", "5", "4",
                "5",
            ]),
            row(&[
                "2025. 3. 29 오전 9:10:00", "1", "민지", "1", "1", "1", "1", "1", "1", "1", "1",
                "1", "1", "다시 제출", "",
            ]),
        ],
    }
}
