use crate::equivalence::mergeable;
use crate::error::LinkageError;
use crate::rule::Rule;
use crate::value::{Value, ValueSet};

/// Combine two values of one attribute, keeping information from both.
///
/// A plain value always wins over a masked value it is mergeable with: the
/// merged record carries the revealed plaintext. Values that are not
/// mergeable are kept side by side in a multi value.
pub fn merge(a: &Value, b: &Value, rule: &Rule) -> Result<Value, LinkageError> {
    match (a, b) {
        (Value::Plain(x), Value::Plain(y)) => {
            if rule.matches(x, y) {
                Ok(a.clone())
            } else {
                Ok(Value::multi([a.clone(), b.clone()]))
            }
        }
        (Value::Masked(_), Value::Plain(_)) => {
            if mergeable(a, b, rule)? {
                Ok(b.clone())
            } else {
                Ok(Value::multi([a.clone(), b.clone()]))
            }
        }
        (Value::Plain(_), Value::Masked(_)) => {
            if mergeable(a, b, rule)? {
                Ok(a.clone())
            } else {
                Ok(Value::multi([a.clone(), b.clone()]))
            }
        }
        (Value::Masked(x), Value::Masked(y)) => Err(LinkageError::UnsupportedMerge {
            left: x.shape(),
            right: y.shape(),
        }),
        (Value::Multi(set), single @ (Value::Plain(_) | Value::Masked(_))) => {
            fold_into(set, single, rule, Side::SetFirst).map(Value::Multi)
        }
        (single @ (Value::Plain(_) | Value::Masked(_)), Value::Multi(set)) => {
            fold_into(set, single, rule, Side::SingleFirst).map(Value::Multi)
        }
        (Value::Multi(xs), Value::Multi(ys)) => {
            let mut acc = xs.clone();
            for y in ys {
                acc = fold_into(&acc, y, rule, Side::SetFirst)?;
            }
            Ok(Value::Multi(acc))
        }
    }
}

/// Which operand was on the left of the caller's `merge`. Rules may be
/// asymmetric, so that argument order is kept for every item.
#[derive(Clone, Copy)]
enum Side {
    SetFirst,
    SingleFirst,
}

/// Fold `single` into a copy of `set`: the first mergeable item absorbs it,
/// otherwise it is appended.
fn fold_into(
    set: &ValueSet,
    single: &Value,
    rule: &Rule,
    side: Side,
) -> Result<ValueSet, LinkageError> {
    let mut out = set.clone();
    for (i, item) in set.iter().enumerate() {
        let (a, b) = match side {
            Side::SetFirst => (item, single),
            Side::SingleFirst => (single, item),
        };
        if mergeable(a, b, rule)? {
            out.replace_at(i, merge(a, b, rule)?);
            return Ok(out);
        }
    }
    out.insert(single.clone());
    Ok(out)
}
