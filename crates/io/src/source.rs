use std::path::{Path, PathBuf};

use reident_linkage::config::SourceConfig;
use reident_linkage::Dataset;

use crate::csv::{self as delimited, CsvOptions};
use crate::error::LoadError;
use crate::narrow::{self, NarrowTable};

/// Load one configured source into a named dataset.
///
/// Relative paths resolve against `base_dir` (the config file's directory).
/// `fallback_name` names the dataset when the source sets no `name`.
pub fn load_source(source: &SourceConfig, base_dir: &Path, fallback_name: &str) -> Result<Dataset, LoadError> {
    let path = resolve(base_dir, source.path());
    let records = match source {
        SourceConfig::Csv { keep_empty, .. } => delimited::load(
            &path,
            CsvOptions {
                keep_empty: *keep_empty,
            },
        )?,
        SourceConfig::SqliteNarrow {
            table,
            id_column,
            key_column,
            value_column,
            ..
        } => narrow::load(
            &path,
            &NarrowTable {
                table: table.clone(),
                id_column: id_column.clone(),
                key_column: key_column.clone(),
                value_column: value_column.clone(),
            },
        )?,
    };

    let name = source.dataset_name(fallback_name);
    log::info!("loaded {} records as '{name}' from {}", records.len(), path.display());
    Ok(Dataset::new(name, records))
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
