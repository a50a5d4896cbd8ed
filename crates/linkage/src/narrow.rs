use indexmap::IndexMap;

use crate::record::Record;
use crate::value::{Value, ValueSet};

/// One row of a narrow (entity, attribute, value) table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrowRow {
    pub entity: String,
    pub attribute: String,
    pub value: String,
}

impl NarrowRow {
    pub fn new(
        entity: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Pivot narrow rows into one record per entity.
///
/// Entities and attributes keep first-seen order. An attribute seen with a
/// single distinct value becomes a plain value; several distinct values
/// become a multi value. No value is dropped.
pub fn pivot_narrow<I>(rows: I) -> Vec<Record>
where
    I: IntoIterator<Item = NarrowRow>,
{
    let mut entities: IndexMap<String, IndexMap<String, ValueSet>> = IndexMap::new();
    for row in rows {
        entities
            .entry(row.entity)
            .or_default()
            .entry(row.attribute)
            .or_default()
            .insert(Value::Plain(row.value));
    }

    entities
        .into_values()
        .map(|attributes| {
            let attributes = attributes
                .into_iter()
                .map(|(name, set)| (name, set.into_value()))
                .collect();
            Record {
                attributes,
                ..Record::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_entity_and_accumulates_values() {
        let rows = vec![
            NarrowRow::new("u1", "name", "이수"),
            NarrowRow::new("u1", "phone", "010-1111"),
            NarrowRow::new("u2", "name", "kim"),
            NarrowRow::new("u1", "phone", "010-2222"),
            NarrowRow::new("u1", "phone", "010-1111"),
        ];
        let records = pivot_narrow(rows);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.get("name"), Some(&Value::plain("이수")));
        assert_eq!(
            first.get("phone"),
            Some(&Value::multi([Value::plain("010-1111"), Value::plain("010-2222")]))
        );
        assert_eq!(records[1].get("name"), Some(&Value::plain("kim")));
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(pivot_narrow(Vec::new()).is_empty());
    }
}
