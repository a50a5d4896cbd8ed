//! Pre-join normalization: alias folding and placeholder masking.

use std::collections::BTreeMap;

use crate::record::{Dataset, Record};
use crate::value::{Masked, Value, ValueSet};

/// Turn placeholder characters in `attribute` into a masked value.
///
/// Plain text containing `placeholder` becomes [`Masked`]; plain text
/// without one stays plain. Multi items are masked one by one. Returns
/// whether the attribute was present.
pub fn mask_attribute(record: &mut Record, attribute: &str, placeholder: char) -> bool {
    match record.attributes.get_mut(attribute) {
        Some(value) => {
            let taken = std::mem::replace(value, Value::Multi(ValueSet::new()));
            *value = mask_value(taken, placeholder);
            true
        }
        None => false,
    }
}

fn mask_value(value: Value, placeholder: char) -> Value {
    match value {
        Value::Plain(text) if text.contains(placeholder) => {
            Value::Masked(Masked::from_placeholder(&text, placeholder))
        }
        Value::Multi(set) => Value::Multi(
            set.into_iter()
                .map(|item| mask_value(item, placeholder))
                .collect(),
        ),
        other => other,
    }
}

/// Move `alias` onto `canonical`. When both exist their values are unioned;
/// no rule is applied, so nothing is lost. Returns whether anything moved.
pub fn fold_alias(record: &mut Record, alias: &str, canonical: &str) -> bool {
    if alias == canonical {
        return false;
    }
    let Some((index, _, value)) = record.attributes.shift_remove_full(alias) else {
        return false;
    };
    match record.attributes.get_mut(canonical) {
        Some(existing) => {
            let mut set = ValueSet::new();
            set.insert(std::mem::replace(existing, Value::Multi(ValueSet::new())));
            set.insert(value);
            *existing = set.into_value();
        }
        None => {
            record.attributes.shift_insert(index, canonical.to_string(), value);
        }
    }
    true
}

/// Normalization steps applied to every record before joining.
/// Aliases are folded first, so masks are configured on canonical names.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    aliases: BTreeMap<String, String>,
    masked: BTreeMap<String, char>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), canonical.into());
        self
    }

    pub fn with_mask(mut self, attribute: impl Into<String>, placeholder: char) -> Self {
        self.masked.insert(attribute.into(), placeholder);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.masked.is_empty()
    }

    pub fn apply(&self, record: &mut Record) {
        for (alias, canonical) in &self.aliases {
            fold_alias(record, alias, canonical);
        }
        for (attribute, placeholder) in &self.masked {
            mask_attribute(record, attribute, *placeholder);
        }
    }

    pub fn apply_all(&self, dataset: &mut Dataset) {
        if self.is_empty() {
            return;
        }
        for record in &mut dataset.records {
            self.apply(record);
        }
        log::debug!(
            "normalized {} records of '{}' ({} aliases, {} masked attributes)",
            dataset.len(),
            dataset.name,
            self.aliases.len(),
            self.masked.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_only_when_placeholder_present() {
        let mut r = Record::from_pairs([("name", "이*"), ("city", "Seoul")]);
        assert!(mask_attribute(&mut r, "name", '*'));
        assert!(mask_attribute(&mut r, "city", '*'));
        assert!(!mask_attribute(&mut r, "email", '*'));
        assert_eq!(
            r.get("name"),
            Some(&Value::Masked(Masked::left("이*", vec![true, false])))
        );
        assert_eq!(r.get("city"), Some(&Value::plain("Seoul")));
    }

    #[test]
    fn mask_multi_items() {
        let mut r = Record::new();
        r.insert("phone", Value::multi([Value::plain("010-****"), Value::plain("02-1234")]));
        mask_attribute(&mut r, "phone", '*');
        let Some(Value::Multi(set)) = r.get("phone") else {
            panic!("expected multi");
        };
        assert_eq!(set.iter().filter(|v| v.is_masked()).count(), 1);
    }

    #[test]
    fn fold_alias_renames_in_place() {
        let mut r = Record::from_pairs([("이메일", "x@y.com"), ("name", "kim")]);
        assert!(fold_alias(&mut r, "이메일", "email"));
        let keys: Vec<_> = r.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["email", "name"]);
    }

    #[test]
    fn fold_alias_unions_existing() {
        let mut r = Record::from_pairs([("email", "a@x.com"), ("mail", "b@x.com")]);
        fold_alias(&mut r, "mail", "email");
        assert_eq!(r.len(), 1);
        assert_eq!(
            r.get("email"),
            Some(&Value::multi([Value::plain("a@x.com"), Value::plain("b@x.com")]))
        );

        let mut same = Record::from_pairs([("email", "a@x.com"), ("mail", "a@x.com")]);
        fold_alias(&mut same, "mail", "email");
        assert_eq!(same.get("email"), Some(&Value::plain("a@x.com")));
    }

    #[test]
    fn normalizer_folds_before_masking() {
        let normalizer = Normalizer::new().with_alias("성명", "name").with_mask("name", '*');
        let mut ds = Dataset::new("medical", vec![Record::from_pairs([("성명", "이*")])]);
        normalizer.apply_all(&mut ds);
        assert!(ds.records[0].get("name").is_some_and(Value::is_masked));
    }
}
