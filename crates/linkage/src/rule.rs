use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// String-equivalence predicate applied to two plain values of one attribute.
#[derive(Clone, Default)]
pub enum Rule {
    /// Byte-for-byte equality.
    #[default]
    Exact,
    /// Equality after Unicode lowercasing.
    IgnoreCase,
    /// Either string contains the other (free-text institution names).
    /// An empty string only matches another empty string.
    Contains,
    /// Equal, or both members of one synonym group (gender code vs word).
    Synonyms(Vec<Vec<String>>),
    /// Caller-supplied predicate.
    Custom(Arc<dyn Fn(&str, &str) -> bool + Send + Sync>),
}

impl Rule {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            Self::Exact => a == b,
            Self::IgnoreCase => a == b || a.to_lowercase() == b.to_lowercase(),
            Self::Contains => {
                if a.is_empty() || b.is_empty() {
                    a == b
                } else {
                    a.contains(b) || b.contains(a)
                }
            }
            Self::Synonyms(groups) => {
                a == b
                    || groups.iter().any(|group| {
                        group.iter().any(|s| s == a) && group.iter().any(|s| s == b)
                    })
            }
            Self::Custom(f) => f(a, b),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "Exact"),
            Self::IgnoreCase => write!(f, "IgnoreCase"),
            Self::Contains => write!(f, "Contains"),
            Self::Synonyms(groups) => f.debug_tuple("Synonyms").field(groups).finish(),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Per-attribute rules with a fallback for attributes that have none.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    default: Rule,
    attributes: HashMap<String, Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: Rule) -> Self {
        Self {
            default,
            attributes: HashMap::new(),
        }
    }

    /// Builder form of [`RuleSet::insert`].
    pub fn with(mut self, attribute: impl Into<String>, rule: Rule) -> Self {
        self.insert(attribute, rule);
        self
    }

    pub fn insert(&mut self, attribute: impl Into<String>, rule: Rule) {
        self.attributes.insert(attribute.into(), rule);
    }

    pub fn rule_for(&self, attribute: &str) -> &Rule {
        self.attributes.get(attribute).unwrap_or(&self.default)
    }
}
