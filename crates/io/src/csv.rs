// Delimited-file loader: one record per data row, attribute names from the header.

use std::collections::HashSet;
use std::path::Path;

use reident_linkage::{Record, Value};

use crate::error::LoadError;

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvOptions {
    /// Keep empty cells as empty plain values. By default they are dropped so
    /// that a blank cell imposes no match constraint.
    pub keep_empty: bool,
}

pub fn load(path: &Path, options: CsvOptions) -> Result<Vec<Record>, LoadError> {
    let content = read_utf8(path)?;
    parse(&content, &path.display().to_string(), options)
}

/// Read a file that must be UTF-8. A leading byte-order mark is dropped.
pub fn read_utf8(path: &Path) -> Result<String, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8(bytes).map_err(|e| LoadError::Encoding {
        path: path.to_path_buf(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

/// Parse comma-separated text with a header row into plain-valued records.
///
/// Header names must be non-blank and unique. Rows whose every cell is
/// empty are skipped. A row with a different field count than the header is
/// an error naming its line.
pub fn parse(content: &str, source_name: &str, options: CsvOptions) -> Result<Vec<Record>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        source_name: source_name.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::MissingHeader {
            source_name: source_name.to_string(),
        });
    }

    if let Some(i) = headers.iter().position(|h| h.is_empty()) {
        return Err(LoadError::BlankColumn {
            source_name: source_name.to_string(),
            position: i + 1,
        });
    }

    let mut seen = HashSet::new();
    for h in &headers {
        if !seen.insert(h.as_str()) {
            return Err(LoadError::DuplicateColumn {
                source_name: source_name.to_string(),
                column: h.clone(),
            });
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        let line = row.position().map_or(0, |p| p.line());

        if row.len() != headers.len() {
            return Err(LoadError::RowWidth {
                source_name: source_name.to_string(),
                line,
                expected: headers.len(),
                found: row.len(),
            });
        }

        let mut record = Record::new();
        for (name, field) in headers.iter().zip(row.iter()) {
            if field.is_empty() && !options.keep_empty {
                continue;
            }
            record.insert(name.clone(), Value::plain(field));
        }

        if record.is_empty() || record.iter().all(|(_, v)| v.as_plain() == Some("")) {
            log::warn!("{source_name}, line {line}: row has no values, skipped");
            continue;
        }
        records.push(record);
    }

    log::debug!("{source_name}: {} records, {} columns", records.len(), headers.len());
    Ok(records)
}
