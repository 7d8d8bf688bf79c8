//! CSV reader for statement files under validation.
//!
//! Reads a comma-delimited, UTF-8 (optionally BOM-prefixed) file into ordered
//! [`Row`]s keyed by the header line. Anything that prevents validation from
//! starting (missing file, wrong encoding, no data rows) is a fatal
//! [`CsvError`].

use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::Row;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Data rows in file order
    pub rows: Vec<Row>,
    /// Column headers as written in the file
    pub headers: Vec<String>,
    /// Whether the file started with a UTF-8 byte-order mark
    pub had_bom: bool,
}

/// Detect the most likely encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "" => "an unknown encoding".to_string(),
        _ => charset,
    }
}

/// Decode strict UTF-8, stripping a leading byte-order mark.
///
/// Returns the text and whether a BOM was present. A UTF-16 BOM or any
/// invalid UTF-8 sequence is rejected with the encoding chardet suggests.
pub fn decode_utf8(bytes: &[u8]) -> CsvResult<(Cow<'_, str>, bool)> {
    let (body, had_bom) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) if encoding == UTF_8 => (&bytes[bom_len..], true),
        Some((encoding, _)) => {
            return Err(CsvError::NotUtf8 {
                detected: encoding.name().to_string(),
            })
        }
        None => (bytes, false),
    };

    UTF_8
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| (text, had_bom))
        .ok_or_else(|| CsvError::NotUtf8 {
            detected: detect_encoding(body),
        })
}

/// Parse CSV text with a header line into rows.
///
/// Short rows are padded with empty values; extra trailing fields are
/// ignored. Blank lines are skipped.
pub fn parse_str(content: &str) -> CsvResult<(Vec<String>, Vec<Row>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.as_str(), record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Parse CSV bytes: decode, split into rows, refuse empty files.
pub fn parse_bytes(bytes: &[u8]) -> CsvResult<ParseResult> {
    let (content, had_bom) = decode_utf8(bytes)?;
    let (headers, rows) = parse_str(&content)?;

    if rows.is_empty() {
        return Err(CsvError::Empty);
    }

    Ok(ParseResult {
        rows,
        headers,
        had_bom,
    })
}

/// Read and parse a CSV file.
///
/// # Example
/// ```ignore
/// let result = read_csv_file(Path::new("statement.csv"))?;
/// println!("{} rows, columns: {}", result.rows.len(), result.headers.join(", "));
/// ```
pub fn read_csv_file(path: &Path) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => CsvError::NotFound(path.to_path_buf()),
        _ => CsvError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    parse_bytes(&bytes)
}

fn parse_error(err: csv::Error) -> CsvError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    CsvError::Parse {
        line,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "transaction_date,amount\n2024-01-05,10.00\n2024-01-06,12.50";
        let result = parse_bytes(csv.as_bytes()).unwrap();

        assert_eq!(result.headers, vec!["transaction_date", "amount"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].get("amount"), "10.00");
        assert_eq!(result.rows[1].get("transaction_date"), "2024-01-06");
        assert!(!result.had_bom);
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"unique_id,amount\nA,1.00\n");
        let result = parse_bytes(&bytes).unwrap();

        assert!(result.had_bom);
        assert_eq!(result.headers[0], "unique_id");
        assert_eq!(result.rows[0].get("unique_id"), "A");
    }

    #[test]
    fn test_quoted_values() {
        let csv = "description,amount\n\"Coffee, large\",\"1,234.00\"";
        let result = parse_bytes(csv.as_bytes()).unwrap();

        assert_eq!(result.rows[0].get("description"), "Coffee, large");
        assert_eq!(result.rows[0].get("amount"), "1,234.00");
    }

    #[test]
    fn test_short_rows_padded() {
        let csv = "a,b,c\n1";
        let result = parse_bytes(csv.as_bytes()).unwrap();

        assert_eq!(result.rows[0].get("a"), "1");
        assert_eq!(result.rows[0].get("c"), "");
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = parse_bytes(b"transaction_date,amount\n").unwrap_err();
        assert!(matches!(err, CsvError::Empty));
    }

    #[test]
    fn test_zero_bytes_is_empty() {
        let err = parse_bytes(b"").unwrap_err();
        assert!(matches!(err, CsvError::Empty));
    }

    #[test]
    fn test_latin1_rejected() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = b"description\nSoci\xE9t\xE9 G\xE9n\xE9rale\n";
        let err = parse_bytes(bytes).unwrap_err();
        assert!(matches!(err, CsvError::NotUtf8 { .. }));
    }

    #[test]
    fn test_utf16_bom_rejected() {
        let bytes: &[u8] = &[0xFF, 0xFE, b'a', 0x00];
        match parse_bytes(bytes).unwrap_err() {
            CsvError::NotUtf8 { detected } => assert_eq!(detected, "UTF-16LE"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, CsvError::NotFound(_)));
    }
}
