//! Segment views of the consolidated table.

use crate::columns::{CATEGORY, DESTINATION_CITY, SALES_CHANNEL, WAREHOUSE};
use crate::config::CleaningRules;
use crate::error::Result;
use crate::processing::apply_loyalty_paradox;
use crate::table::frame::{has_column, string_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Allowed values per dimension. An empty list leaves that dimension
/// unfiltered; a missing cell never matches a non-empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentFilter {
    pub warehouses: Vec<String>,
    pub categories: Vec<String>,
    pub cities: Vec<String>,
    pub channels: Vec<String>,
}

impl SegmentFilter {
    pub fn is_empty(&self) -> bool {
        self.warehouses.is_empty()
            && self.categories.is_empty()
            && self.cities.is_empty()
            && self.channels.is_empty()
    }

    fn dimensions(&self) -> [(&'static str, &[String]); 4] {
        [
            (WAREHOUSE, self.warehouses.as_slice()),
            (CATEGORY, self.categories.as_slice()),
            (DESTINATION_CITY, self.cities.as_slice()),
            (SALES_CHANNEL, self.channels.as_slice()),
        ]
    }
}

/// Rows of the consolidated table inside the segment, with the loyalty
/// paradox recomputed over the segment itself.
///
/// # Errors
///
/// Fails only on internal table-engine errors.
pub fn filter_segment(
    df: &DataFrame,
    filter: &SegmentFilter,
    rules: &CleaningRules,
) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];
    for (column, allowed) in filter.dimensions() {
        if allowed.is_empty() {
            continue;
        }
        if !has_column(df, column) {
            tracing::warn!("Segment filter on absent column '{column}' matches nothing");
            keep.fill(false);
            continue;
        }
        for (kept, value) in keep.iter_mut().zip(string_values(df, column)?) {
            *kept &= value.is_some_and(|v| allowed.contains(&v));
        }
    }

    let mask = BooleanChunked::from_slice("segment".into(), &keep);
    let segment = df.filter(&mask)?;
    tracing::debug!("Segment keeps {} of {} rows", segment.height(), df.height());
    apply_loyalty_paradox(segment, rules)
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]
    use super::*;
    use crate::columns::{CURRENT_STOCK, LOYALTY_PARADOX_FLAG, NPS_NORMALIZED};
    use crate::table::frame::bool_values;

    fn consolidated() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                WAREHOUSE.into(),
                vec![Some("Norte"), Some("Sur"), Some("Norte"), None],
            ),
            Column::new(
                CATEGORY.into(),
                vec!["laptop", "laptop", "phone", "uncatalogued"],
            ),
            Column::new(
                DESTINATION_CITY.into(),
                vec!["BOGOTÁ", "CALI", "BOGOTÁ", "MEDELLÍN"],
            ),
            Column::new(
                SALES_CHANNEL.into(),
                vec!["online", "tienda", "tienda", "online"],
            ),
            Column::new(CURRENT_STOCK.into(), vec![10.0, 100.0, 20.0, 30.0]),
            Column::new(NPS_NORMALIZED.into(), vec![3.0, 3.0, 3.0, 3.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_filter_keeps_everything() -> Result<()> {
        let rules = CleaningRules::default();
        let filter = SegmentFilter::default();
        assert!(filter.is_empty());
        let segment = filter_segment(&consolidated(), &filter, &rules)?;
        assert_eq!(segment.height(), 4);
        // Q3 over the whole table is 47.5
        assert_eq!(
            bool_values(&segment, LOYALTY_PARADOX_FLAG)?,
            vec![Some(false), Some(true), Some(false), Some(false)]
        );
        Ok(())
    }

    #[test]
    fn test_loyalty_paradox_is_recomputed_for_segment() -> Result<()> {
        let rules = CleaningRules::default();
        let filter = SegmentFilter {
            warehouses: vec!["Norte".to_owned()],
            ..Default::default()
        };
        let segment = filter_segment(&consolidated(), &filter, &rules)?;
        assert_eq!(segment.height(), 2);
        // Q3 of stock 10 and 20 is 17.5
        assert_eq!(
            bool_values(&segment, LOYALTY_PARADOX_FLAG)?,
            vec![Some(false), Some(true)]
        );
        Ok(())
    }

    #[test]
    fn test_dimensions_combine() -> Result<()> {
        let rules = CleaningRules::default();
        let filter = SegmentFilter {
            cities: vec!["BOGOTÁ".to_owned(), "MEDELLÍN".to_owned()],
            channels: vec!["online".to_owned()],
            ..Default::default()
        };
        let segment = filter_segment(&consolidated(), &filter, &rules)?;
        let categories = string_values(&segment, CATEGORY)?;
        assert_eq!(
            categories,
            vec![Some("laptop".to_owned()), Some("uncatalogued".to_owned())]
        );
        Ok(())
    }

    #[test]
    fn test_missing_cells_never_match() -> Result<()> {
        let rules = CleaningRules::default();
        let filter = SegmentFilter {
            warehouses: vec!["Norte".to_owned(), "Sur".to_owned()],
            ..Default::default()
        };
        let segment = filter_segment(&consolidated(), &filter, &rules)?;
        assert_eq!(segment.height(), 3);
        Ok(())
    }
}
