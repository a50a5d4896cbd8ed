use crate::equivalence::mergeable;
use crate::error::LinkageError;
use crate::record::Record;
use crate::rule::RuleSet;
use crate::value::Value;

/// Attribute constraints for [`find`]. Every term must hold, including
/// several terms on the same attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<(String, Value)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.push((attribute.into(), value.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.terms.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Records matching every query term, most corroborated first.
///
/// A term holds when the attribute is present and mergeable with the query
/// value; a missing attribute never matches. Results are ordered by the
/// number of joined common attributes, descending. Ties keep input order.
pub fn find<'a>(
    records: &'a [Record],
    query: &Query,
    rules: &RuleSet,
) -> Result<Vec<&'a Record>, LinkageError> {
    let mut hits = Vec::new();
    for record in records {
        if satisfies(record, query, rules)? {
            hits.push(record);
        }
    }
    hits.sort_by(|a, b| {
        b.joined_common_attributes
            .len()
            .cmp(&a.joined_common_attributes.len())
    });
    log::debug!("query with {} terms matched {} of {} records", query.len(), hits.len(), records.len());
    Ok(hits)
}

fn satisfies(record: &Record, query: &Query, rules: &RuleSet) -> Result<bool, LinkageError> {
    for (name, wanted) in query.iter() {
        let Some(value) = record.get(name) else {
            return Ok(false);
        };
        if !mergeable(value, wanted, rules.rule_for(name))? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// One representative per person, judged on `keys`.
///
/// Records are walked in order. A record is dropped when an already kept
/// record has every key attribute and each is mergeable with the record's
/// own. Records missing any key attribute are always kept. With no keys,
/// nothing is dropped.
pub fn unique<'a>(
    records: &'a [Record],
    keys: &[String],
    rules: &RuleSet,
) -> Result<Vec<&'a Record>, LinkageError> {
    if keys.is_empty() {
        return Ok(records.iter().collect());
    }

    let mut kept: Vec<&Record> = Vec::new();
    'records: for record in records {
        if keys.iter().all(|k| record.contains(k)) {
            for existing in &kept {
                if same_on_keys(existing, record, keys, rules)? {
                    continue 'records;
                }
            }
        }
        kept.push(record);
    }
    Ok(kept)
}

fn same_on_keys(a: &Record, b: &Record, keys: &[String], rules: &RuleSet) -> Result<bool, LinkageError> {
    for key in keys {
        match (a.get(key), b.get(key)) {
            (Some(x), Some(y)) => {
                if !mergeable(x, y, rules.rule_for(key))? {
                    return Ok(false);
                }
            }
            _ => return Ok(false),
        }
    }
    Ok(true)
}
