use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::LinkageError;
use crate::normalize::Normalizer;
use crate::rule::{Rule, RuleSet};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A linkage job: two sources, the rules to compare them by, normalization
/// applied before the join, and how results are displayed.
#[derive(Debug, Clone, Deserialize)]
pub struct ReidentConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub total: SourceConfig,
    pub additional: SourceConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_name() -> String {
    "reident".into()
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Header-bearing comma-separated file, one record per row.
    Csv {
        path: String,
        /// Keep empty cells as empty plain values instead of dropping them.
        #[serde(default)]
        keep_empty: bool,
        #[serde(default)]
        name: Option<String>,
    },
    /// SQLite table of (entity, attribute, value) rows.
    SqliteNarrow {
        path: String,
        table: String,
        #[serde(default = "default_id_column")]
        id_column: String,
        #[serde(default = "default_key_column")]
        key_column: String,
        #[serde(default = "default_value_column")]
        value_column: String,
        #[serde(default)]
        name: Option<String>,
    },
}

fn default_id_column() -> String {
    "id".into()
}

fn default_key_column() -> String {
    "key".into()
}

fn default_value_column() -> String {
    "value".into()
}

impl SourceConfig {
    pub fn path(&self) -> &str {
        match self {
            Self::Csv { path, .. } | Self::SqliteNarrow { path, .. } => path,
        }
    }

    /// Dataset name for provenance, falling back to `fallback`.
    pub fn dataset_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Csv { name, .. } | Self::SqliteNarrow { name, .. } => {
                name.as_deref().unwrap_or(fallback)
            }
        }
    }

    fn validate(&self, side: &str) -> Result<(), LinkageError> {
        if self.path().trim().is_empty() {
            return Err(LinkageError::ConfigValidation(format!("{side}: path is empty")));
        }
        if let Self::SqliteNarrow {
            table,
            id_column,
            key_column,
            value_column,
            ..
        } = self
        {
            if table.trim().is_empty() {
                return Err(LinkageError::ConfigValidation(format!("{side}: table is empty")));
            }
            let columns = [id_column, key_column, value_column];
            if columns.iter().any(|c| c.trim().is_empty()) {
                return Err(LinkageError::ConfigValidation(format!(
                    "{side}: narrow column names must not be empty"
                )));
            }
            if id_column == key_column || id_column == value_column || key_column == value_column {
                return Err(LinkageError::ConfigValidation(format!(
                    "{side}: id, key and value columns must be distinct"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub default: RuleConfig,
    #[serde(default)]
    pub attributes: BTreeMap<String, RuleConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleConfig {
    #[default]
    Exact,
    IgnoreCase,
    Contains,
    Synonyms { groups: Vec<Vec<String>> },
}

impl RuleConfig {
    pub fn to_rule(&self) -> Rule {
        match self {
            Self::Exact => Rule::Exact,
            Self::IgnoreCase => Rule::IgnoreCase,
            Self::Contains => Rule::Contains,
            Self::Synonyms { groups } => Rule::Synonyms(groups.clone()),
        }
    }
}

impl RulesConfig {
    pub fn to_rule_set(&self) -> RuleSet {
        let mut rules = RuleSet::with_default(self.default.to_rule());
        for (attribute, rule) in &self.attributes {
            rules.insert(attribute.clone(), rule.to_rule());
        }
        rules
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NormalizeConfig {
    /// Alias attribute name -> canonical attribute name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Attribute name -> single placeholder character.
    #[serde(default)]
    pub masked: BTreeMap<String, String>,
}

impl NormalizeConfig {
    pub fn to_normalizer(&self) -> Result<Normalizer, LinkageError> {
        let mut normalizer = Normalizer::new();
        for (alias, canonical) in &self.aliases {
            normalizer = normalizer.with_alias(alias.clone(), canonical.clone());
        }
        for (attribute, placeholder) in &self.masked {
            normalizer = normalizer.with_mask(attribute.clone(), placeholder_char(attribute, placeholder)?);
        }
        Ok(normalizer)
    }
}

fn placeholder_char(attribute: &str, placeholder: &str) -> Result<char, LinkageError> {
    let mut chars = placeholder.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(LinkageError::ConfigValidation(format!(
            "normalize.masked.{attribute}: placeholder must be exactly one character, got {placeholder:?}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Values longer than `threshold` characters are shown as `head` characters,
/// an ellipsis, and `tail` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    #[serde(default = "default_head")]
    pub head: usize,
    #[serde(default = "default_tail")]
    pub tail: usize,
}

fn default_threshold() -> usize {
    40
}

fn default_head() -> usize {
    24
}

fn default_tail() -> usize {
    8
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            head: default_head(),
            tail: default_tail(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReidentConfig {
    pub fn from_toml(input: &str) -> Result<Self, LinkageError> {
        let config: ReidentConfig =
            toml::from_str(input).map_err(|e| LinkageError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LinkageError> {
        self.total.validate("total")?;
        self.additional.validate("additional")?;

        let rules = self
            .rules
            .attributes
            .iter()
            .map(|(a, r)| (a.as_str(), r))
            .chain([("default", &self.rules.default)]);
        for (attribute, rule) in rules {
            if let RuleConfig::Synonyms { groups } = rule {
                if groups.is_empty() || groups.iter().any(|g| g.is_empty()) {
                    return Err(LinkageError::ConfigValidation(format!(
                        "rules.{attribute}: synonym groups must not be empty"
                    )));
                }
            }
        }

        for (alias, canonical) in &self.normalize.aliases {
            if self.normalize.aliases.contains_key(canonical) {
                return Err(LinkageError::ConfigValidation(format!(
                    "normalize.aliases: '{alias}' folds into '{canonical}', which is itself an alias"
                )));
            }
        }

        for (attribute, placeholder) in &self.normalize.masked {
            placeholder_char(attribute, placeholder)?;
        }

        let d = &self.display;
        if d.head + d.tail >= d.threshold {
            return Err(LinkageError::ConfigValidation(format!(
                "display: head ({}) + tail ({}) must be less than threshold ({})",
                d.head, d.tail, d.threshold
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
