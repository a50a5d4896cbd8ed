// Narrow SQLite tables: one (entity, attribute, value) triple per row,
// pivoted into one record per entity.

use std::path::Path;

use reident_linkage::narrow::{pivot_narrow, NarrowRow};
use reident_linkage::Record;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use crate::error::LoadError;

/// Which table and columns hold the triples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrowTable {
    pub table: String,
    pub id_column: String,
    pub key_column: String,
    pub value_column: String,
}

impl NarrowTable {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_column: "id".into(),
            key_column: "key".into(),
            value_column: "value".into(),
        }
    }

    fn select_sql(&self) -> String {
        format!(
            "SELECT {}, {}, {} FROM {}",
            quote_ident(&self.id_column),
            quote_ident(&self.key_column),
            quote_ident(&self.value_column),
            quote_ident(&self.table),
        )
    }
}

/// Identifiers come from config, never interpolated bare.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Open `path` read-only and pivot the configured table.
pub fn load(path: &Path, table: &NarrowTable) -> Result<Vec<Record>, LoadError> {
    let source_name = path.display().to_string();
    if !path.exists() {
        return Err(LoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|source| LoadError::Sqlite {
            source_name: source_name.clone(),
            source,
        })?;
    read(&conn, table, &source_name)
}

/// Read and pivot from an open connection.
///
/// NULL values are skipped; a NULL entity or attribute is an error, as is any
/// blob. Integers and reals are stringified.
pub fn read(conn: &Connection, table: &NarrowTable, source_name: &str) -> Result<Vec<Record>, LoadError> {
    let sqlite_err = |source| LoadError::Sqlite {
        source_name: source_name.to_string(),
        source,
    };

    let mut stmt = conn.prepare(&table.select_sql()).map_err(sqlite_err)?;
    let mut rows = stmt.query([]).map_err(sqlite_err)?;

    let mut triples = Vec::new();
    let mut skipped = 0usize;
    while let Some(row) = rows.next().map_err(sqlite_err)? {
        let id = row.get_ref(0).map_err(sqlite_err)?;
        let key = row.get_ref(1).map_err(sqlite_err)?;
        let value = row.get_ref(2).map_err(sqlite_err)?;

        let entity = cell_text(id, &table.id_column, source_name)?
            .ok_or_else(|| null_in(&table.id_column, source_name))?;
        let attribute = cell_text(key, &table.key_column, source_name)?
            .ok_or_else(|| null_in(&table.key_column, source_name))?;
        match cell_text(value, &table.value_column, source_name)? {
            Some(value) => triples.push(NarrowRow::new(entity, attribute, value)),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("{source_name}: skipped {skipped} NULL values in '{}'", table.table);
    }
    let records = pivot_narrow(triples);
    log::debug!("{source_name}: {} entities from '{}'", records.len(), table.table);
    Ok(records)
}

fn cell_text(value: ValueRef<'_>, column: &str, source_name: &str) -> Result<Option<String>, LoadError> {
    let unsupported = |kind| LoadError::UnsupportedValue {
        source_name: source_name.to_string(),
        column: column.to_string(),
        kind,
    };
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(i) => Ok(Some(i.to_string())),
        ValueRef::Real(f) => Ok(Some(f.to_string())),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Some(s.to_string()))
            .map_err(|_| unsupported("non-UTF-8 text")),
        ValueRef::Blob(_) => Err(unsupported("blob")),
    }
}

fn null_in(column: &str, source_name: &str) -> LoadError {
    LoadError::UnsupportedValue {
        source_name: source_name.to_string(),
        column: column.to_string(),
        kind: "NULL",
    }
}
