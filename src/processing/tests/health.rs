use super::{approx, text_frame};
use crate::processing::health::{duplicate_rows, health_score};
use crate::processing::HealthScore;
use polars::prelude::*;

#[test]
fn test_empty_table_scores_zero() {
    assert_eq!(health_score(&DataFrame::empty()), HealthScore::default());

    let no_rows = DataFrame::new(vec![Column::new("a".into(), Vec::<&str>::new())]).unwrap();
    assert_eq!(health_score(&no_rows), HealthScore::default());
}

#[test]
fn test_half_null_table_scores_65() {
    let df = text_frame(&[("a", &[Some("1"), Some("2")]), ("b", &[None, None])]);
    let health = health_score(&df);
    assert!(approx(health.score, 65.0));
    assert!(approx(health.null_pct, 50.0));
    assert!(approx(health.dup_pct, 0.0));
}

#[test]
fn test_duplicates_count_after_first_occurrence() {
    let df = text_frame(&[("a", &[Some("x"), Some("x"), Some("y"), Some("x")])]);
    assert_eq!(duplicate_rows(&df), 2);
    let health = health_score(&df);
    assert!(approx(health.dup_pct, 50.0));
    assert!(approx(health.score, 85.0));
}

#[test]
fn test_missing_cells_take_part_in_duplicate_detection() {
    let df = text_frame(&[
        ("a", &[None, None, Some("1")]),
        ("b", &[Some("k"), Some("k"), Some("k")]),
    ]);
    assert_eq!(duplicate_rows(&df), 1);
}

#[test]
fn test_score_stays_in_range() {
    let df = text_frame(&[("a", &[None, None, None])]);
    let health = health_score(&df);
    assert!((0.0..=100.0).contains(&health.score));
    assert!(approx(health.null_pct, 100.0));
    assert!(approx(health.dup_pct, 66.67));
}

#[test]
fn test_clean_table_scores_100() {
    let df = text_frame(&[("id", &[Some("1"), Some("2")]), ("v", &[Some("a"), Some("b")])]);
    assert!(approx(health_score(&df).score, 100.0));
}

#[test]
fn test_row_keys_keep_cells_apart() {
    // shifted text across columns and missing-vs-present are different rows
    let df = text_frame(&[
        ("a", &[Some("ab"), Some("a"), None, Some("")]),
        ("b", &[Some("c"), Some("bc"), Some("z"), Some("z")]),
    ]);
    assert_eq!(duplicate_rows(&df), 0);
}
