use serde::Serialize;

use crate::equivalence::mergeable;
use crate::error::LinkageError;
use crate::merge::merge;
use crate::record::{Dataset, JoinedFrom, Origin, Record};
use crate::rule::RuleSet;

/// Output of [`join`]: the joined dataset plus counts for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct JoinResult {
    pub dataset: Dataset,
    pub stats: JoinStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    /// Records produced by merging a compatible (total, additional) pair.
    pub merged: usize,
    pub unmatched_total: usize,
    pub unmatched_additional: usize,
    /// Length of the output dataset.
    pub total_records: usize,
}

/// Full outer join of `total` and `additional`.
///
/// Every additional record is checked against every total record. A pair is
/// compatible when each attribute present on both sides is mergeable under
/// that attribute's rule; attributes present on one side only impose no
/// constraint. Each compatible pair yields a merged copy of the total record
/// (fan-out, not deduplication). Records that never matched are appended
/// unmodified: unmatched additional records first, then unmatched total
/// records.
///
/// The sources are never mutated. The first unsupported value pair aborts
/// the join.
pub fn join(total: &Dataset, additional: &Dataset, rules: &RuleSet) -> Result<JoinResult, LinkageError> {
    // Matched markers live here, out of band, never on the records themselves.
    let mut total_matched = vec![false; total.len()];
    let mut additional_matched = vec![false; additional.len()];
    let mut records = Vec::new();

    for (ai, add) in additional.iter().enumerate() {
        for (ti, tot) in total.iter().enumerate() {
            if !compatible(tot, add, rules)? {
                continue;
            }
            let record = merge_pair(tot, add, rules, origins(total, ti, additional, ai))?;
            log::debug!(
                "merged {}[{ti}] with {}[{ai}] on {:?}",
                total.name,
                additional.name,
                record.joined_common_attributes
            );
            records.push(record);
            total_matched[ti] = true;
            additional_matched[ai] = true;
        }
    }

    let merged = records.len();

    let unmatched_additional = unmatched(additional, &additional_matched);
    let unmatched_total = unmatched(total, &total_matched);
    let stats = JoinStats {
        merged,
        unmatched_total: unmatched_total.len(),
        unmatched_additional: unmatched_additional.len(),
        total_records: merged + unmatched_total.len() + unmatched_additional.len(),
    };
    records.extend(unmatched_additional);
    records.extend(unmatched_total);

    log::info!(
        "joined '{}' ({}) with '{}' ({}): {} merged, {} unmatched total, {} unmatched additional",
        total.name,
        total.len(),
        additional.name,
        additional.len(),
        stats.merged,
        stats.unmatched_total,
        stats.unmatched_additional,
    );

    Ok(JoinResult {
        dataset: Dataset::new(format!("{}+{}", total.name, additional.name), records),
        stats,
    })
}

/// Whether every attribute of `add` that also exists on `tot` is mergeable.
pub fn compatible(tot: &Record, add: &Record, rules: &RuleSet) -> Result<bool, LinkageError> {
    for (name, add_value) in add.iter() {
        if let Some(tot_value) = tot.get(name) {
            if !mergeable(tot_value, add_value, rules.rule_for(name))? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Copy `tot`, then overwrite shared attributes with their merge and append
/// attributes only `add` has.
fn merge_pair(
    tot: &Record,
    add: &Record,
    rules: &RuleSet,
    joined_from: JoinedFrom,
) -> Result<Record, LinkageError> {
    let mut out = Record {
        attributes: tot.attributes.clone(),
        joined_common_attributes: Default::default(),
        joined_from: Some(joined_from),
    };
    for (name, add_value) in add.iter() {
        match tot.get(name) {
            Some(tot_value) => {
                let merged = merge(tot_value, add_value, rules.rule_for(name))?;
                out.attributes.insert(name.clone(), merged);
                out.joined_common_attributes.insert(name.clone());
            }
            None => {
                out.attributes.insert(name.clone(), add_value.clone());
            }
        }
    }
    Ok(out)
}

fn origins(total: &Dataset, ti: usize, additional: &Dataset, ai: usize) -> JoinedFrom {
    JoinedFrom {
        total: Origin {
            dataset: total.name.clone(),
            index: ti,
        },
        additional: Origin {
            dataset: additional.name.clone(),
            index: ai,
        },
    }
}

fn unmatched(dataset: &Dataset, matched: &[bool]) -> Vec<Record> {
    dataset
        .iter()
        .zip(matched)
        .filter(|(_, m)| !**m)
        .map(|(r, _)| r.clone())
        .collect()
}
