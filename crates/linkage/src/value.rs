use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// Content of one attribute.
///
/// Serializes untagged: a plain value is a JSON string, a masked value is an
/// object `{text, revealed, alignment}`, and a multi value is an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Plain(String),
    Masked(Masked),
    Multi(ValueSet),
}

impl Value {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(text.into())
    }

    /// Build a multi value. Nested multi values are flattened and duplicates dropped.
    pub fn multi<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Self::Multi(items.into_iter().collect())
    }

    /// Short shape name used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain",
            Self::Masked(m) => m.shape(),
            Self::Multi(_) => "multi",
        }
    }

    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Self::Plain(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_masked(&self) -> bool {
        matches!(self, Self::Masked(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Plain(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Plain(s)
    }
}

impl From<Masked> for Value {
    fn from(m: Masked) -> Self {
        Self::Masked(m)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(s) => write!(f, "{s}"),
            Self::Masked(m) => write!(f, "{m}"),
            Self::Multi(set) => {
                write!(f, "{{")?;
                for (i, item) in set.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Masked
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    /// Reserved. Comparisons involving right-aligned masks are rejected.
    Right,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// A partially hidden string. `revealed[i]` says whether the i-th character
/// of `text` is the true character or a placeholder.
///
/// Indices count Unicode scalar values, not bytes. `revealed` may be shorter
/// or longer than `text`; positions outside either are unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Masked {
    pub text: String,
    pub revealed: Vec<bool>,
    #[serde(default)]
    pub alignment: Alignment,
}

impl Masked {
    pub fn left(text: impl Into<String>, revealed: Vec<bool>) -> Self {
        Self {
            text: text.into(),
            revealed,
            alignment: Alignment::Left,
        }
    }

    /// Mask derived from placeholder characters: every `placeholder` in
    /// `text` is hidden, everything else revealed.
    pub fn from_placeholder(text: &str, placeholder: char) -> Self {
        let revealed = text.chars().map(|c| c != placeholder).collect();
        Self::left(text, revealed)
    }

    pub(crate) fn shape(&self) -> &'static str {
        match self.alignment {
            Alignment::Left => "masked(left)",
            Alignment::Right => "masked(right)",
        }
    }

    /// Whether position `i` is revealed. Out-of-range positions are not.
    pub fn is_revealed(&self, i: usize) -> bool {
        self.revealed.get(i).copied().unwrap_or(false)
    }
}

impl fmt::Display for Masked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

// ---------------------------------------------------------------------------
// ValueSet
// ---------------------------------------------------------------------------

/// Duplicate-free collection backing [`Value::Multi`].
///
/// Never contains a multi value: inserting one flattens it. Insertion order
/// is kept so first-match-wins merging is deterministic; equality ignores it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Value>", into = "Vec<Value>")]
pub struct ValueSet {
    items: Vec<Value>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. Returns `true` if anything new was added.
    pub fn insert(&mut self, value: Value) -> bool {
        match value {
            Value::Multi(set) => {
                let mut added = false;
                for item in set.items {
                    added |= self.insert(item);
                }
                added
            }
            scalar => {
                if self.items.contains(&scalar) {
                    false
                } else {
                    self.items.push(scalar);
                    true
                }
            }
        }
    }

    /// Replace the item at `index`. If the replacement already exists
    /// elsewhere in the set the slot is dropped instead.
    pub(crate) fn replace_at(&mut self, index: usize, value: Value) {
        let duplicate = self
            .items
            .iter()
            .enumerate()
            .any(|(i, item)| i != index && *item == value);
        if duplicate {
            self.items.remove(index);
            return;
        }
        match value {
            Value::Multi(set) => {
                self.items.remove(index);
                for item in set.items {
                    self.insert(item);
                }
            }
            scalar => self.items[index] = scalar,
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Unwrap a one-item set into its item; anything else stays multi.
    pub fn into_value(self) -> Value {
        let mut items = self.items;
        match items.len() {
            1 => items.remove(0),
            _ => Value::Multi(Self { items }),
        }
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len() && self.items.iter().all(|v| other.contains(v))
    }
}

impl Eq for ValueSet {}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = ValueSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl From<Vec<Value>> for ValueSet {
    fn from(items: Vec<Value>) -> Self {
        items.into_iter().collect()
    }
}

impl From<ValueSet> for Vec<Value> {
    fn from(set: ValueSet) -> Self {
        set.items
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for ValueSet {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_dedups_and_flattens() {
        let mut set = ValueSet::new();
        assert!(set.insert(Value::plain("a")));
        assert!(!set.insert(Value::plain("a")));
        assert!(set.insert(Value::multi([Value::plain("b"), Value::plain("a")])));
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|v| !matches!(v, Value::Multi(_))));
    }

    #[test]
    fn set_equality_ignores_order() {
        let a = Value::multi([Value::plain("x"), Value::plain("y")]);
        let b = Value::multi([Value::plain("y"), Value::plain("x")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::multi([Value::plain("x")]));
    }

    #[test]
    fn replace_at_drops_duplicate_slot() {
        let mut set: ValueSet = vec![Value::plain("a"), Value::plain("b")].into();
        set.replace_at(1, Value::plain("a"));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&Value::plain("a")));
    }

    #[test]
    fn placeholder_mask_counts_chars_not_bytes() {
        let m = Masked::from_placeholder("이*수", '*');
        assert_eq!(m.revealed, vec![true, false, true]);
        assert!(m.is_revealed(0));
        assert!(!m.is_revealed(1));
        assert!(!m.is_revealed(7));
    }

    #[test]
    fn json_shapes() {
        let v = Value::multi([
            Value::plain("010-1111"),
            Masked::left("a**", vec![true, false, false]).into(),
        ]);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json[0], "010-1111");
        assert_eq!(json[1]["text"], "a**");
        assert_eq!(json[1]["alignment"], "left");

        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn json_nested_arrays_flatten() {
        let v: Value = serde_json::from_str(r#"["a", ["b", "a"]]"#).unwrap();
        assert_eq!(v, Value::multi([Value::plain("a"), Value::plain("b")]));
    }

    #[test]
    fn display_multi() {
        let v = Value::multi([Value::plain("x"), Value::plain("y")]);
        assert_eq!(v.to_string(), "{x, y}");
    }
}
