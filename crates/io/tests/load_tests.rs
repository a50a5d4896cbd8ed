// Loader tests against on-disk fixtures, ending in a join across loader kinds.

use std::path::Path;

use reident_io::{load_source, LoadError};
use reident_linkage::config::SourceConfig;
use reident_linkage::{join, RuleSet, Value};

fn fixtures() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
}

fn csv(path: &str) -> SourceConfig {
    SourceConfig::Csv {
        path: path.into(),
        keep_empty: false,
        name: None,
    }
}

#[test]
fn census_fixture_skips_blank_cells() {
    let dataset = load_source(&csv("census.csv"), fixtures(), "census").unwrap();
    assert_eq!(dataset.name, "census");
    assert_eq!(dataset.len(), 3);
    assert!(!dataset.records[1].contains("city"));
    assert!(!dataset.records[2].contains("birth_year"));
    assert_eq!(dataset.records[2].get("city"), Some(&Value::plain("Busan")));
}

#[test]
fn ragged_fixture_names_the_line() {
    let err = load_source(&csv("ragged.csv"), fixtures(), "x").unwrap_err();
    assert!(matches!(err, LoadError::RowWidth { line: 2, expected: 2, found: 3, .. }));
    assert!(err.to_string().contains("ragged.csv, line 2"));
}

#[test]
fn csv_joins_with_narrow_table() {
    let dir = tempfile::TempDir::new().unwrap();
    let conn = rusqlite::Connection::open(dir.path().join("people.db")).unwrap();
    conn.execute_batch(
        "CREATE TABLE kv (id INTEGER, key TEXT, value TEXT);
         INSERT INTO kv VALUES (1, 'name', 'lee');
         INSERT INTO kv VALUES (1, 'job', 'nurse');
         INSERT INTO kv VALUES (2, 'name', 'choi');",
    )
    .unwrap();
    drop(conn);

    let census = load_source(&csv("census.csv"), fixtures(), "census").unwrap();
    let narrow = SourceConfig::SqliteNarrow {
        path: "people.db".into(),
        table: "kv".into(),
        id_column: "id".into(),
        key_column: "key".into(),
        value_column: "value".into(),
        name: Some("people".into()),
    };
    let people = load_source(&narrow, dir.path(), "additional").unwrap();

    let result = join(&census, &people, &RuleSet::new()).unwrap();
    assert_eq!(result.stats.merged, 1);
    let lee = &result.dataset.records[0];
    assert_eq!(lee.get("job"), Some(&Value::plain("nurse")));
    assert_eq!(lee.get("birth_year"), Some(&Value::plain("1985")));
}
