use super::common::*;
use crate::allocation::CategorySelector;
use crate::records::SPLIT_SUFFIX;

#[test]
fn boundary_record_is_split_at_the_cap() {
    let selection = CategorySelector::new(credit(10)).select(vec![
        record("a", "Major", 4, 4),
        record("b", "Major", 4, 3),
        record("c", "Major", 4, 2),
    ]);

    assert_eq!(keys(&selection.selected), ["a", "b", "c"]);
    assert_eq!(selection.selected_credits(), credit(10));
    assert_eq!(selection.selected_score(), credit(32));

    assert_eq!(selection.unselected.len(), 1);
    let remainder = &selection.unselected[0];
    assert_eq!(remainder.key, format!("c{SPLIT_SUFFIX}"));
    assert_eq!(remainder.credit, credit(2));
    assert_eq!(remainder.score, credit(4));
}

#[test]
fn exact_fit_stops_without_splitting() {
    let selection = CategorySelector::new(credit(8)).select(vec![
        record("a", "Major", 4, 4),
        record("b", "Major", 4, 3),
        record("c", "Major", 4, 2),
    ]);

    assert_eq!(keys(&selection.selected), ["a", "b"]);
    assert_eq!(keys(&selection.unselected), ["c"]);
    assert_eq!(selection.unselected[0].credit, credit(4));
}

#[test]
fn everything_fits_under_a_generous_cap() {
    let selection = CategorySelector::new(credit(20)).select(vec![
        record("a", "Major", 4, 4),
        record("b", "Major", 2, 1),
    ]);

    assert_eq!(keys(&selection.selected), ["a", "b"]);
    assert!(selection.unselected.is_empty());
    assert_eq!(selection.selected_credits(), credit(6));
}

#[test]
fn zero_cap_selects_nothing() {
    let selection = CategorySelector::new(credit(0)).select(vec![record("a", "Major", 2, 4)]);

    assert!(selection.selected.is_empty());
    assert_eq!(keys(&selection.unselected), ["a"]);
}

#[test]
fn selection_partitions_credit_and_score() {
    let candidates = vec![
        record("a", "Major", 3, 4),
        record("b", "Major", 5, 3),
        record("c", "Major", 2, 3),
        record("d", "Major", 4, 0),
    ];
    let credits: rust_decimal::Decimal = candidates.iter().map(|r| r.credit).sum();
    let score: rust_decimal::Decimal = candidates.iter().map(|r| r.score).sum();

    let selection = CategorySelector::new(credit(7)).select(candidates);

    assert_eq!(selection.selected_credits(), credit(7));
    assert_eq!(selection.selected_credits() + selection.unselected_credits(), credits);
    assert_eq!(selection.selected_score() + selection.unselected_score(), score);
}
