//! CSV reading helpers: delimiter and encoding resolution, reader
//! construction, and record decoding.
//!
//! Readers are built *flexible* and without header handling so ragged rows
//! reach the normalizer exactly as exported. The `-` path reads stdin.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

const BYTE_ORDER_MARK: char = '\u{feff}';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Reads every record of `reader` as decoded strings, first row included.
pub fn read_all_records<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<Vec<String>>>
where
    R: Read,
{
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading line {}", idx + 1))?;
        let mut decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding line {}", idx + 1))?;
        if idx == 0
            && let Some(first) = decoded.first_mut()
            && first.starts_with(BYTE_ORDER_MARK)
        {
            *first = first.trim_start_matches(BYTE_ORDER_MARK).to_string();
        }
        rows.push(decoded);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn delimiter_follows_extension_unless_provided() {
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(&PathBuf::from("a.csv"), None), b',');
        assert_eq!(
            resolve_input_delimiter(&PathBuf::from("a.tsv"), Some(b';')),
            b';'
        );
    }

    #[test]
    fn unknown_encoding_is_an_error() {
        assert!(resolve_encoding(Some("klingon")).is_err());
        assert_eq!(resolve_encoding(Some("euc-kr")).unwrap().name(), "EUC-KR");
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
    }

    #[test]
    fn ragged_rows_and_bom_survive_reading() {
        let input = "\u{feff}Name,긴장도,자신감\nAlice,2\nBob,3,4,extra\n";
        let mut reader = open_csv_reader(input.as_bytes(), b',');
        let rows = read_all_records(&mut reader, UTF_8).unwrap();
        assert_eq!(rows[0], vec!["Name", "긴장도", "자신감"]);
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows[2].len(), 4);
    }
}
