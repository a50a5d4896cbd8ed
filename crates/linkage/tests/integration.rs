// End-to-end linkage tests: normalize -> join -> find, plus join properties.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use reident_linkage::normalize::Normalizer;
use reident_linkage::query::Query;
use reident_linkage::{find, join, mergeable, unique, Dataset, Masked, Record, Rule, RuleSet, Value};

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

fn medical() -> Dataset {
    Dataset::new(
        "medical",
        vec![
            Record::from_pairs([("name", "이*"), ("phone", "010-1111"), ("illness", "flu")]),
            Record::from_pairs([("name", "김**"), ("phone", "010-2222"), ("illness", "asthma")]),
            Record::from_pairs([("name", "박*"), ("phone", "010-3333"), ("illness", "gout")]),
        ],
    )
}

fn social() -> Dataset {
    let mut lee = Record::from_pairs([("name", "이수"), ("이메일", "lee@naver.com")]);
    lee.insert(
        "phone",
        Value::multi([Value::plain("010-1111"), Value::plain("010-9999")]),
    );
    Dataset::new(
        "social",
        vec![
            lee,
            Record::from_pairs([("name", "김철수"), ("이메일", "kim@daum.net"), ("school", "Korea University")]),
            Record::from_pairs([("name", "최민"), ("이메일", "choi@naver.com")]),
        ],
    )
}

fn normalized() -> (Dataset, Dataset) {
    let normalizer = Normalizer::new().with_alias("이메일", "email").with_mask("name", '*');
    let mut total = medical();
    let mut additional = social();
    normalizer.apply_all(&mut total);
    normalizer.apply_all(&mut additional);
    (total, additional)
}

#[test]
fn reidentifies_masked_medical_records() {
    let (total, additional) = normalized();
    let result = join(&total, &additional, &RuleSet::new()).unwrap();

    // 이수 and 김철수 merge; 최민 and 박* stay unmatched
    assert_eq!(result.stats.merged, 2);
    assert_eq!(result.stats.unmatched_additional, 1);
    assert_eq!(result.stats.unmatched_total, 1);
    assert_eq!(result.dataset.len(), 4);

    let lee = &result.dataset.records[0];
    assert_eq!(lee.get("name"), Some(&Value::plain("이수")));
    assert_eq!(lee.get("illness"), Some(&Value::plain("flu")));
    assert_eq!(lee.get("email"), Some(&Value::plain("lee@naver.com")));
    // phone was shared: the single total value is folded into the multi
    assert_eq!(
        lee.get("phone"),
        Some(&Value::multi([Value::plain("010-1111"), Value::plain("010-9999")]))
    );
    let common: Vec<_> = lee.joined_common_attributes.iter().map(String::as_str).collect();
    assert_eq!(common, ["name", "phone"]);

    let kim = &result.dataset.records[1];
    assert_eq!(kim.get("name"), Some(&Value::plain("김철수")));
    assert_eq!(kim.get("illness"), Some(&Value::plain("asthma")));
}

#[test]
fn find_ranks_joined_records_first() {
    let (total, additional) = normalized();
    let result = join(&total, &additional, &RuleSet::new()).unwrap();

    let rules = RuleSet::new().with("email", Rule::Contains);
    let hits = find(&result.dataset.records, &Query::new().with("email", "naver.com"), &rules).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].get("name"), Some(&Value::plain("이수")));
    assert!(hits[0].joined_common_attributes.len() > hits[1].joined_common_attributes.len());
    assert_eq!(hits[1].get("name"), Some(&Value::plain("최민")));
}

#[test]
fn unique_collapses_fan_out() {
    let total = Dataset::new(
        "t",
        vec![
            Record::from_pairs([("city", "Seoul"), ("name", "kim")]),
            Record::from_pairs([("city", "Seoul"), ("name", "kim")]),
        ],
    );
    let additional = Dataset::new("a", vec![Record::from_pairs([("city", "Seoul"), ("job", "dev")])]);
    let result = join(&total, &additional, &RuleSet::new()).unwrap();
    assert_eq!(result.stats.merged, 2);

    let keys = vec!["name".to_string(), "city".to_string()];
    let kept = unique(&result.dataset.records, &keys, &RuleSet::new()).unwrap();
    assert_eq!(kept.len(), 1);
}

#[test]
fn joined_output_can_be_joined_again() {
    let (total, additional) = normalized();
    let first = join(&total, &additional, &RuleSet::new()).unwrap();
    let extra = Dataset::new("school", vec![Record::from_pairs([("school", "Korea"), ("club", "chess")])]);
    let rules = RuleSet::new().with("school", Rule::Contains);
    let second = join(&first.dataset, &extra, &rules).unwrap();

    let kim = second
        .dataset
        .iter()
        .find(|r| r.get("name") == Some(&Value::plain("김철수")) && r.get("club").is_some())
        .unwrap();
    assert_eq!(kim.get("school"), Some(&Value::plain("Korea University")));
    assert_eq!(kim.joined_from.as_ref().unwrap().total.dataset, "medical+social");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

const ATTRIBUTES: &[&str] = &["name", "city", "phone"];

fn arb_plain() -> impl Strategy<Value = Value> {
    prop::sample::select(vec!["ab", "ac", "bb", "b"]).prop_map(Value::plain)
}

/// Total side: plain, masked, or a small multi of plain values.
fn arb_total_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => arb_plain(),
        1 => prop::sample::select(vec!["a*", "*b", "**"])
            .prop_map(|s| Value::Masked(Masked::from_placeholder(s, '*'))),
        1 => prop::collection::vec(arb_plain(), 1..3).prop_map(Value::multi),
    ]
}

/// Each attribute independently present or absent; never an empty record.
fn arb_record<S>(values: S) -> impl Strategy<Value = Record>
where
    S: Strategy<Value = Value>,
{
    prop::collection::vec(prop::option::of(values), ATTRIBUTES.len())
        .prop_map(|slots| {
            Record::from_pairs(
                ATTRIBUTES
                    .iter()
                    .zip(slots)
                    .filter_map(|(name, v)| v.map(|v| (*name, v))),
            )
        })
        .prop_filter("record must not be empty", |r| !r.is_empty())
}

fn arb_datasets() -> impl Strategy<Value = (Dataset, Dataset)> {
    (
        prop::collection::vec(arb_record(arb_total_value()), 0..6),
        prop::collection::vec(arb_record(arb_plain()), 0..6),
    )
        .prop_map(|(t, a)| (Dataset::new("t", t), Dataset::new("a", a)))
}

proptest! {
    #![proptest_config(config_256())]

    /// Every source record is either merged at least once or copied exactly
    /// once, never both.
    #[test]
    fn outer_join_is_complete((total, additional) in arb_datasets()) {
        let result = join(&total, &additional, &RuleSet::new()).unwrap();
        let records = &result.dataset.records;
        prop_assert_eq!(records.len(), result.stats.total_records);

        let merged: Vec<_> = records.iter().filter_map(|r| r.joined_from.as_ref()).collect();
        prop_assert_eq!(merged.len(), result.stats.merged);

        let copies = &records[result.stats.merged..];
        prop_assert!(copies.iter().all(|r| r.joined_from.is_none()));
        let (add_copies, tot_copies) = copies.split_at(result.stats.unmatched_additional);

        for (i, rec) in total.iter().enumerate() {
            let in_merge = merged.iter().any(|j| j.total.index == i);
            let copied = tot_copies.iter().filter(|r| *r == rec).count();
            prop_assert!(in_merge || copied >= 1, "total[{}] lost", i);
        }
        prop_assert_eq!(
            tot_copies.len(),
            (0..total.len()).filter(|i| !merged.iter().any(|j| j.total.index == *i)).count()
        );

        for (i, rec) in additional.iter().enumerate() {
            let in_merge = merged.iter().any(|j| j.additional.index == i);
            let copied = add_copies.iter().filter(|r| *r == rec).count();
            prop_assert!(in_merge || copied >= 1, "additional[{}] lost", i);
        }
        prop_assert_eq!(
            add_copies.len(),
            (0..additional.len()).filter(|i| !merged.iter().any(|j| j.additional.index == *i)).count()
        );
    }

    /// Merged records carry every attribute from both sides.
    #[test]
    fn merged_records_cover_both_sides((total, additional) in arb_datasets()) {
        let result = join(&total, &additional, &RuleSet::new()).unwrap();
        for rec in result.dataset.iter().filter(|r| r.is_joined()) {
            let from = rec.joined_from.as_ref().unwrap();
            let tot = &total.records[from.total.index];
            let add = &additional.records[from.additional.index];
            for name in tot.attributes.keys().chain(add.attributes.keys()) {
                prop_assert!(rec.contains(name));
            }
            for name in &rec.joined_common_attributes {
                prop_assert!(tot.contains(name) && add.contains(name));
            }
        }
    }

    /// Plain equivalence is exactly the rule.
    #[test]
    fn plain_equivalence_is_rule(a in "[a-cA-C]{0,4}", b in "[a-cA-C]{0,4}") {
        let pa = Value::plain(a.clone());
        let pb = Value::plain(b.clone());
        prop_assert_eq!(mergeable(&pa, &pb, &Rule::Exact).unwrap(), a == b);
        prop_assert_eq!(
            mergeable(&pa, &pb, &Rule::IgnoreCase).unwrap(),
            Rule::IgnoreCase.matches(&a, &b)
        );
    }

    /// Mergeability never depends on argument order.
    #[test]
    fn equivalence_symmetric_in_outcome(a in arb_total_value(), b in arb_plain()) {
        prop_assert_eq!(
            mergeable(&a, &b, &Rule::Exact).unwrap(),
            mergeable(&b, &a, &Rule::Exact).unwrap()
        );
    }
}
