use crate::error::LinkageError;
use crate::rule::Rule;
use crate::value::{Alignment, Masked, Value, ValueSet};

/// Whether two values may describe the same real-world fact.
///
/// Plain values defer to `rule`. Masked values are compared character by
/// character on revealed positions only; `rule` does not apply to them.
/// A multi value matches when any of its items does.
///
/// The relation is symmetric in outcome but not transitive.
pub fn mergeable(a: &Value, b: &Value, rule: &Rule) -> Result<bool, LinkageError> {
    match (a, b) {
        (Value::Plain(x), Value::Plain(y)) => Ok(rule.matches(x, y)),
        (Value::Masked(m), Value::Plain(p)) | (Value::Plain(p), Value::Masked(m)) => {
            masked_matches_plain(m, p)
        }
        (Value::Masked(x), Value::Masked(y)) => masked_matches_masked(x, y),
        (Value::Multi(set), single @ (Value::Plain(_) | Value::Masked(_))) => {
            any_item(set, |item| mergeable(item, single, rule))
        }
        (single @ (Value::Plain(_) | Value::Masked(_)), Value::Multi(set)) => {
            any_item(set, |item| mergeable(single, item, rule))
        }
        (Value::Multi(xs), Value::Multi(ys)) => {
            any_item(xs, |x| any_item(ys, |y| mergeable(x, y, rule)))
        }
    }
}

fn any_item<F>(set: &ValueSet, mut pred: F) -> Result<bool, LinkageError>
where
    F: FnMut(&Value) -> Result<bool, LinkageError>,
{
    for item in set {
        if pred(item)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn masked_matches_plain(masked: &Masked, plain: &str) -> Result<bool, LinkageError> {
    if masked.alignment != Alignment::Left {
        return Err(LinkageError::NotSupported("right-aligned masked comparison"));
    }
    // zip stops at the shorter text; unrevealed positions never constrain
    Ok(masked
        .text
        .chars()
        .zip(plain.chars())
        .enumerate()
        .all(|(i, (mc, pc))| !masked.is_revealed(i) || mc == pc))
}

fn masked_matches_masked(x: &Masked, y: &Masked) -> Result<bool, LinkageError> {
    match (x.alignment, y.alignment) {
        (Alignment::Left, Alignment::Left) => Ok(x
            .text
            .chars()
            .zip(y.text.chars())
            .enumerate()
            .all(|(i, (xc, yc))| !(x.is_revealed(i) && y.is_revealed(i)) || xc == yc)),
        (Alignment::Right, Alignment::Right) => {
            Err(LinkageError::NotSupported("right-aligned masked comparison"))
        }
        _ => Err(LinkageError::UnsupportedComparison {
            left: x.shape(),
            right: y.shape(),
        }),
    }
}
