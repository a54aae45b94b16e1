use super::{approx, floats, text_frame, texts};
use crate::columns::*;
use crate::config::CleaningRules;
use crate::processing::{normalize_nps, normalize_nps_value, process_feedback, NpsCategory};
use anyhow::Result;
use polars::prelude::*;

fn messy_feedback() -> DataFrame {
    text_frame(&[
        (
            TRANSACTION_ID,
            &[Some("T1"), Some("T2"), Some("T3"), Some("T4")],
        ),
        (NPS_RAW, &[Some("95"), Some("-50"), Some("8"), Some("abc")]),
        (PRODUCT_RATING, &[Some("4"), Some("7"), Some("x"), Some("5")]),
        (CUSTOMER_AGE, &[Some("30"), Some("-2"), None, Some("40.6")]),
        (
            SUPPORT_TICKET_RAW,
            &[Some("Sí"), Some(" si "), Some("0"), Some("maybe")],
        ),
    ])
}

#[test]
fn test_normalize_nps_value() {
    assert!(approx(normalize_nps_value(95.0), 9.75));
    assert!(approx(normalize_nps_value(-50.0), 3.0));
    assert!(approx(normalize_nps_value(8.0), 8.0));
    assert!(approx(normalize_nps_value(10.0), 10.0));
    // clamped at both ends
    assert!(approx(normalize_nps_value(0.0), 1.0));
    assert!(approx(normalize_nps_value(500.0), 10.0));
    assert!(approx(normalize_nps_value(-500.0), 1.0));
}

#[test]
fn test_normalize_nps_unreadable_is_neutral() {
    let rules = CleaningRules::default();
    assert!(approx(normalize_nps(Some("abc"), &rules), 5.0));
    assert!(approx(normalize_nps(None, &rules), 5.0));
    assert!(approx(normalize_nps(Some(" 95 "), &rules), 9.75));
}

#[test]
fn test_nps_category_thresholds() {
    assert_eq!(NpsCategory::from_score(9.0), NpsCategory::Promoter);
    assert_eq!(NpsCategory::from_score(8.99), NpsCategory::Passive);
    assert_eq!(NpsCategory::from_score(7.0), NpsCategory::Passive);
    assert_eq!(NpsCategory::from_score(6.9), NpsCategory::Detractor);
    assert_eq!(NpsCategory::Promoter.to_string(), "Promoter");
}

#[test]
fn test_process_feedback() -> Result<()> {
    let (df, metrics) = process_feedback(messy_feedback(), &CleaningRules::default())?;

    assert_eq!(
        floats(&df, NPS_NORMALIZED),
        vec![Some(9.75), Some(3.0), Some(8.0), Some(5.0)]
    );
    assert_eq!(
        texts(&df, NPS_CATEGORY),
        vec![
            Some("Promoter".to_owned()),
            Some("Detractor".to_owned()),
            Some("Passive".to_owned()),
            Some("Detractor".to_owned()),
        ]
    );
    // 7 is off-scale and "x" unreadable; median of 4 and 5 fills both
    assert_eq!(
        floats(&df, PRODUCT_RATING),
        vec![Some(4.0), Some(4.5), Some(4.5), Some(5.0)]
    );

    let ages: Vec<Option<i64>> = df
        .column(CUSTOMER_AGE)?
        .as_materialized_series()
        .i64()?
        .into_iter()
        .collect();
    assert_eq!(ages, vec![Some(30), Some(35), Some(35), Some(41)]);

    let tickets: Vec<Option<i32>> = df
        .column(SUPPORT_TICKET_FLAG)?
        .as_materialized_series()
        .i32()?
        .into_iter()
        .collect();
    assert_eq!(tickets, vec![Some(1), Some(1), Some(0), Some(0)]);

    let counters = metrics.feedback().unwrap();
    assert_eq!(counters.corrected_ratings, 2);
    assert_eq!(counters.corrected_ages, 2);
    assert!(approx(counters.rating_fill, 4.5));
    assert!(approx(counters.mean_nps, 6.44));
    assert_eq!(
        (counters.promoters, counters.passives, counters.detractors),
        (1, 1, 2)
    );
    assert!(approx(metrics.score_after, 100.0));
    Ok(())
}

#[test]
fn test_ratings_fall_back_to_default_without_valid_values() -> Result<()> {
    let df = text_frame(&[
        (TRANSACTION_ID, &[Some("T1"), Some("T2")]),
        (PRODUCT_RATING, &[Some("9"), None]),
    ]);
    let (df, metrics) = process_feedback(df, &CleaningRules::default())?;
    assert_eq!(floats(&df, PRODUCT_RATING), vec![Some(3.0), Some(3.0)]);
    assert!(approx(metrics.feedback().unwrap().rating_fill, 3.0));
    assert!(!metrics.schema_drift.is_empty());
    Ok(())
}
