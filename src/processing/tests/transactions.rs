use super::{floats, text_frame, texts};
use crate::columns::*;
use crate::config::CleaningRules;
use crate::processing::process_transactions;
use crate::table::SchemaDrift;
use anyhow::Result;
use polars::prelude::*;

fn inventory() -> DataFrame {
    text_frame(&[(SKU_ID, &[Some("A"), Some("B")])])
}

fn feedback() -> DataFrame {
    text_frame(&[(TRANSACTION_ID, &[Some("T1"), Some("T2")])])
}

fn messy_transactions() -> DataFrame {
    text_frame(&[
        (
            TRANSACTION_ID,
            &[Some("T1"), Some("T2"), Some("T3"), Some("T4")],
        ),
        (SKU_ID, &[Some("A"), Some("B"), Some("Z"), None]),
        (
            SALE_DATE,
            &[
                Some("2024-03-01"),
                Some("03/02/2024"),
                Some("no date"),
                None,
            ],
        ),
        (QUANTITY, &[Some("2"), Some("-3"), Some("abc"), Some("1")]),
        (FINAL_PRICE, &[Some("100"), Some("abc"), Some("50"), None]),
        (SHIPPING_COST, &[Some("10"), Some("5"), Some("x"), Some("2")]),
        (
            DESTINATION_CITY,
            &[Some("bog"), Some("Medellin"), Some(" cali "), None],
        ),
        (
            SALES_CHANNEL,
            &[Some(" Online "), Some("TIENDA"), Some("online"), None],
        ),
        (
            "Tiempo_Entrega_Real",
            &[Some("5"), Some("999"), Some("-2"), Some("abc")],
        ),
    ])
}

#[test]
fn test_delivery_sentinels_and_negatives_are_removed() -> Result<()> {
    let rules = CleaningRules::default();
    let (df, metrics) = process_transactions(messy_transactions(), &inventory(), &feedback(), &rules)?;

    assert_eq!(
        floats(&df, DELIVERY_TIME),
        vec![Some(5.0), None, None, None]
    );
    let counters = metrics.transactions().unwrap();
    assert_eq!(counters.delivery_outliers, 1);
    assert_eq!(counters.negative_delivery_times, 1);
    assert_eq!(
        metrics.schema_drift,
        vec![SchemaDrift::Renamed {
            expected: DELIVERY_TIME.to_owned(),
            found: "Tiempo_Entrega_Real".to_owned(),
        }]
    );
    Ok(())
}

#[test]
fn test_amounts_are_coerced_and_counted() -> Result<()> {
    let rules = CleaningRules::default();
    let (df, metrics) = process_transactions(messy_transactions(), &inventory(), &feedback(), &rules)?;

    assert_eq!(
        floats(&df, FINAL_PRICE),
        vec![Some(100.0), Some(0.0), Some(50.0), Some(0.0)]
    );
    assert_eq!(
        floats(&df, QUANTITY),
        vec![Some(2.0), Some(3.0), Some(0.0), Some(1.0)]
    );
    let counters = metrics.transactions().unwrap();
    assert_eq!(counters.total, 4);
    assert_eq!(counters.coerced_prices, 2);
    assert_eq!(counters.coerced_shipping_costs, 1);
    assert_eq!(counters.coerced_quantities, 1, "unreadable quantity defaults to 0");
    assert_eq!(counters.negative_quantities, 1);
    Ok(())
}

#[test]
fn test_text_fields_are_canonicalized() -> Result<()> {
    let rules = CleaningRules::default();
    let (df, _) = process_transactions(messy_transactions(), &inventory(), &feedback(), &rules)?;

    assert_eq!(
        texts(&df, DESTINATION_CITY),
        vec![
            Some("BOGOTÁ".to_owned()),
            Some("MEDELLÍN".to_owned()),
            Some("CALI".to_owned()),
            None,
        ]
    );
    assert_eq!(
        texts(&df, SALES_CHANNEL),
        vec![
            Some("online".to_owned()),
            Some("tienda".to_owned()),
            Some("online".to_owned()),
            None,
        ]
    );
    let dates = texts(&df, SALE_DATE);
    assert_eq!(dates[0].as_deref(), Some("2024-03-01"));
    // month-first wins for ambiguous slash dates
    assert_eq!(dates[1].as_deref(), Some("2024-03-02"));
    assert_eq!(dates[2], None);
    Ok(())
}

#[test]
fn test_cross_checks_against_cleaned_tables() -> Result<()> {
    let rules = CleaningRules::default();
    let (df, metrics) = process_transactions(messy_transactions(), &inventory(), &feedback(), &rules)?;

    let counters = metrics.transactions().unwrap();
    // Z is unknown and a missing SKU counts as absent
    assert_eq!(counters.unknown_skus, 2);
    assert_eq!(counters.without_feedback, 2);
    assert_eq!(df.height(), 4, "mismatched transactions are kept");
    for derived in ["margin", "Fecha_Calculada", "Estado_Envio"] {
        assert!(df.column(derived).is_err());
    }
    Ok(())
}

#[test]
fn test_missing_delivery_column_is_created_empty() -> Result<()> {
    let df = text_frame(&[
        (TRANSACTION_ID, &[Some("T1")]),
        (SKU_ID, &[Some("A")]),
    ]);
    let (df, metrics) = process_transactions(df, &inventory(), &feedback(), &CleaningRules::default())?;
    assert_eq!(df.column(DELIVERY_TIME)?.null_count(), 1);
    assert!(metrics.schema_drift.contains(&SchemaDrift::Missing {
        expected: DELIVERY_TIME.to_owned()
    }));
    Ok(())
}
