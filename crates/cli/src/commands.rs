//! `reident join | find | unique | validate`.
//!
//! Every command except `validate` runs the same pipeline: parse the job
//! config, load both sources, normalize them, then outer-join.

use std::path::{Path, PathBuf};

use reident_io::load_source;
use reident_linkage::config::{ReidentConfig, SourceConfig};
use reident_linkage::{find, join, unique, JoinResult, JoinStats, Query, Record, RuleSet};
use serde::Serialize;

use crate::render::render_records;
use crate::CliError;

struct Job {
    config: ReidentConfig,
    rules: RuleSet,
    result: JoinResult,
}

fn load_config(path: &Path) -> Result<ReidentConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    ReidentConfig::from_toml(&text).map_err(CliError::linkage)
}

fn run_job(config_path: &Path) -> Result<Job, CliError> {
    let config = load_config(config_path)?;
    let normalizer = config.normalize.to_normalizer().map_err(CliError::linkage)?;
    log::debug!("job '{}' from {}", config.name, config_path.display());

    // Source paths are relative to the config file
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let mut total = load_source(&config.total, base_dir, "total").map_err(CliError::load)?;
    let mut additional = load_source(&config.additional, base_dir, "additional").map_err(CliError::load)?;

    normalizer.apply_all(&mut total);
    normalizer.apply_all(&mut additional);

    let rules = config.rules.to_rule_set();
    let result = join(&total, &additional, &rules).map_err(CliError::linkage)?;
    Ok(Job { config, rules, result })
}

#[derive(Serialize)]
struct JoinReport<'a> {
    name: &'a str,
    dataset: &'a str,
    stats: &'a JoinStats,
    records: &'a [Record],
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::io(format!("JSON serialization error: {e}")))
}

pub fn cmd_join(config_path: PathBuf, json_output: bool, output_file: Option<PathBuf>) -> Result<(), CliError> {
    let job = run_job(&config_path)?;
    let dataset = &job.result.dataset;
    let stats = &job.result.stats;

    if json_output || output_file.is_some() {
        let json_str = to_json(&JoinReport {
            name: &job.config.name,
            dataset: &dataset.name,
            stats,
            records: &dataset.records,
        })?;

        if let Some(ref path) = output_file {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::io(format!("cannot write output {}: {e}", path.display())))?;
            eprintln!("wrote {}", path.display());
        }
        if json_output {
            println!("{json_str}");
        }
    }

    if !json_output {
        print!("{}", render_records(&dataset.records, &job.config.display));
    }

    eprintln!(
        "join '{}': {} records ({} merged, {} unmatched additional, {} unmatched total)",
        job.config.name, stats.total_records, stats.merged, stats.unmatched_additional, stats.unmatched_total,
    );
    Ok(())
}

/// Split `ATTR=VALUE` at the first `=`. The value may itself contain `=`.
fn parse_term(term: &str) -> Result<(String, String), CliError> {
    match term.split_once('=') {
        Some((attr, value)) if !attr.trim().is_empty() => Ok((attr.trim().to_string(), value.to_string())),
        _ => Err(CliError::usage(format!("invalid --where term: \"{term}\"")).with_hint("expected ATTR=VALUE")),
    }
}

pub fn cmd_find(
    config_path: PathBuf,
    terms: Vec<String>,
    json_output: bool,
    limit: Option<usize>,
) -> Result<(), CliError> {
    let query = terms
        .iter()
        .map(|t| parse_term(t))
        .collect::<Result<Query, CliError>>()?;

    let job = run_job(&config_path)?;
    let records = &job.result.dataset.records;
    let mut hits = find(records, &query, &job.rules).map_err(CliError::linkage)?;
    let matched = hits.len();
    if let Some(limit) = limit {
        hits.truncate(limit);
    }

    emit(&hits, json_output, &job)?;
    eprintln!("find: {matched} of {} records match", records.len());
    Ok(())
}

pub fn cmd_unique(config_path: PathBuf, by: Vec<String>, json_output: bool) -> Result<(), CliError> {
    if let Some(empty) = by.iter().find(|a| a.trim().is_empty()) {
        return Err(CliError::usage(format!("invalid --by attribute: \"{empty}\"")));
    }

    let job = run_job(&config_path)?;
    let records = &job.result.dataset.records;
    let kept = unique(records, &by, &job.rules).map_err(CliError::linkage)?;

    emit(&kept, json_output, &job)?;
    eprintln!("unique: {} of {} records kept", kept.len(), records.len());
    Ok(())
}

fn emit(records: &[&Record], json_output: bool, job: &Job) -> Result<(), CliError> {
    if json_output {
        println!("{}", to_json(records)?);
    } else {
        print!("{}", render_records(records.iter().copied(), &job.config.display));
    }
    Ok(())
}

fn describe(source: &SourceConfig) -> String {
    match source {
        SourceConfig::Csv { path, .. } => format!("csv {path}"),
        SourceConfig::SqliteNarrow { path, table, .. } => format!("sqlite {path} (table {table})"),
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let normalizer = config.normalize.to_normalizer().map_err(CliError::linkage)?;
    eprintln!(
        "valid: '{}' total={} additional={}, {} attribute rule(s), normalize {}",
        config.name,
        describe(&config.total),
        describe(&config.additional),
        config.rules.attributes.len(),
        if normalizer.is_empty() { "off" } else { "on" },
    );
    Ok(())
}
