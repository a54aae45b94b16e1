//! Headline figures over a consolidated table (or a segment of it).
//!
//! Dashboards, reports and the assistant all read these numbers, so they are
//! computed once here from the derived columns. Absent columns leave their
//! figures at zero or `None`.

use crate::columns::{
    CATEGORY, COST, DELIVERY_GAP, LOYALTY_PARADOX_FLAG, MARGIN, NO_INVENTORY_FLAG,
    NPS_NORMALIZED, REVENUE, SKU_ID, SUPPORT_TICKET_FLAG,
};
use crate::config::CleaningRules;
use crate::error::Result;
use crate::table::frame::{bool_values, has_column, numeric_values, string_values};
use crate::table::stats::{mean, median, present};
use crate::utils::{fmt_money, fmt_opt, round2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub records: usize,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_margin: f64,
    /// Margin over revenue, 0 when there is no revenue
    pub margin_pct: f64,
    pub loss_transactions: usize,
    /// Absolute sum of negative margins
    pub loss_amount: f64,
    pub invisible_sales: usize,
    pub invisible_sales_pct: f64,
    pub revenue_at_risk: f64,
    pub uncatalogued_skus: usize,
    pub loyalty_paradox_cases: usize,
    pub mean_nps: Option<f64>,
    /// Share of transactions with a support ticket, in percent
    pub support_ticket_rate: Option<f64>,
    pub mean_delivery_days: Option<f64>,
    pub median_delivery_days: Option<f64>,
    pub mean_delivery_gap: Option<f64>,
    pub top_categories: Vec<CategoryRevenue>,
}

fn floats_or_empty(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    if has_column(df, name) {
        numeric_values(df, name)
    } else {
        Ok(vec![None; df.height()])
    }
}

fn flags_or_empty(df: &DataFrame, name: &str) -> Result<Vec<bool>> {
    if !has_column(df, name) {
        return Ok(vec![false; df.height()]);
    }
    Ok(bool_values(df, name)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

fn texts_or_empty(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    if has_column(df, name) {
        string_values(df, name)
    } else {
        Ok(vec![None; df.height()])
    }
}

fn pct(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        round2(part / whole * 100.0)
    }
}

fn top_categories(categories: &[Option<String>], revenue: &[Option<f64>]) -> Vec<CategoryRevenue> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for (category, revenue) in categories.iter().zip(revenue) {
        if let (Some(category), Some(revenue)) = (category, revenue) {
            *totals.entry(category.as_str()).or_default() += revenue;
        }
    }
    let mut ranked: Vec<CategoryRevenue> = totals
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue {
            category: category.to_owned(),
            revenue: round2(revenue),
        })
        .collect();
    ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    ranked.truncate(TOP_CATEGORIES);
    ranked
}

impl ExecutiveSummary {
    /// # Errors
    ///
    /// Fails only on internal table-engine errors.
    pub fn from_table(df: &DataFrame, rules: &CleaningRules) -> Result<Self> {
        let revenue = floats_or_empty(df, REVENUE)?;
        let cost = floats_or_empty(df, COST)?;
        let margin = floats_or_empty(df, MARGIN)?;
        let invisible = flags_or_empty(df, NO_INVENTORY_FLAG)?;
        let paradox = flags_or_empty(df, LOYALTY_PARADOX_FLAG)?;
        let skus = texts_or_empty(df, SKU_ID)?;

        let total_revenue: f64 = present(&revenue).iter().sum();
        let total_margin: f64 = present(&margin).iter().sum();
        let losses: Vec<f64> = present(&margin).into_iter().filter(|m| *m < 0.0).collect();

        let invisible_sales = invisible.iter().filter(|f| **f).count();
        let revenue_at_risk: f64 = invisible
            .iter()
            .zip(&revenue)
            .filter_map(|(flag, r)| if *flag { *r } else { None })
            .sum();
        let uncatalogued_skus = invisible
            .iter()
            .zip(&skus)
            .filter_map(|(flag, sku)| if *flag { sku.as_deref() } else { None })
            .collect::<HashSet<_>>()
            .len();

        let delivery = present(&floats_or_empty(df, rules.delivery_column())?);
        let tickets = present(&floats_or_empty(df, SUPPORT_TICKET_FLAG)?);

        Ok(Self {
            records: df.height(),
            total_revenue: round2(total_revenue),
            total_cost: round2(present(&cost).iter().sum()),
            total_margin: round2(total_margin),
            margin_pct: pct(total_margin, total_revenue),
            loss_transactions: losses.len(),
            loss_amount: round2(losses.iter().sum::<f64>().abs()),
            invisible_sales,
            invisible_sales_pct: pct(invisible_sales as f64, df.height() as f64),
            revenue_at_risk: round2(revenue_at_risk),
            uncatalogued_skus,
            loyalty_paradox_cases: paradox.iter().filter(|f| **f).count(),
            mean_nps: mean(&present(&floats_or_empty(df, NPS_NORMALIZED)?)).map(round2),
            support_ticket_rate: mean(&tickets).map(|m| round2(m * 100.0)),
            mean_delivery_days: mean(&delivery).map(round2),
            median_delivery_days: median(&delivery).map(round2),
            mean_delivery_gap: mean(&present(&floats_or_empty(df, DELIVERY_GAP)?)).map(round2),
            top_categories: top_categories(&texts_or_empty(df, CATEGORY)?, &revenue),
        })
    }
}

impl fmt::Display for ExecutiveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Records: {}", self.records)?;
        writeln!(f, "Total revenue: {}", fmt_money(self.total_revenue))?;
        writeln!(
            f,
            "Net margin: {} ({:.1}%)",
            fmt_money(self.total_margin),
            self.margin_pct
        )?;
        writeln!(
            f,
            "Loss-making transactions: {} (leak {})",
            self.loss_transactions,
            fmt_money(self.loss_amount)
        )?;
        writeln!(
            f,
            "Sales without inventory: {} ({:.1}%), revenue at risk {} across {} SKUs",
            self.invisible_sales,
            self.invisible_sales_pct,
            fmt_money(self.revenue_at_risk),
            self.uncatalogued_skus
        )?;
        writeln!(f, "Mean NPS: {}", fmt_opt(self.mean_nps, ""))?;
        writeln!(
            f,
            "Support ticket rate: {}",
            fmt_opt(self.support_ticket_rate, "%")
        )?;
        writeln!(
            f,
            "Delivery days (mean/median): {} / {}",
            fmt_opt(self.mean_delivery_days, ""),
            fmt_opt(self.median_delivery_days, "")
        )?;
        writeln!(
            f,
            "Mean delivery gap: {}",
            fmt_opt(self.mean_delivery_gap, " days")
        )?;
        writeln!(f, "Loyalty paradox cases: {}", self.loyalty_paradox_cases)?;
        if !self.top_categories.is_empty() {
            writeln!(f, "Top categories by revenue:")?;
            for entry in &self.top_categories {
                writeln!(f, "  - {}: {}", entry.category, fmt_money(entry.revenue))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]
    use super::*;
    use crate::columns::DELIVERY_TIME;

    fn consolidated() -> DataFrame {
        DataFrame::new(vec![
            Column::new(SKU_ID.into(), vec!["A", "Z", "Z", "B"]),
            Column::new(CATEGORY.into(), vec!["laptop", "uncatalogued", "uncatalogued", "phone"]),
            Column::new(REVENUE.into(), vec![200.0, 50.0, 30.0, 60.0]),
            Column::new(COST.into(), vec![70.0, 5.0, 40.0, 30.0]),
            Column::new(MARGIN.into(), vec![130.0, 45.0, -10.0, 30.0]),
            Column::new(NO_INVENTORY_FLAG.into(), vec![false, true, true, false]),
            Column::new(LOYALTY_PARADOX_FLAG.into(), vec![true, false, false, false]),
            Column::new(NPS_NORMALIZED.into(), vec![9.0, 5.0, 4.0, 6.0]),
            Column::new(SUPPORT_TICKET_FLAG.into(), vec![1i32, 0, 0, 1]),
            Column::new(DELIVERY_TIME.into(), vec![5.0, 4.0, 0.0, 3.0]),
            Column::new(DELIVERY_GAP.into(), vec![2.0, 4.0, 0.0, -2.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_financial_totals() -> Result<()> {
        let summary = ExecutiveSummary::from_table(&consolidated(), &CleaningRules::default())?;
        assert_eq!(summary.records, 4);
        assert!((summary.total_revenue - 340.0).abs() < 1e-9);
        assert!((summary.total_cost - 145.0).abs() < 1e-9);
        assert!((summary.total_margin - 195.0).abs() < 1e-9);
        assert!((summary.margin_pct - 57.35).abs() < 1e-9);
        assert_eq!(summary.loss_transactions, 1);
        assert!((summary.loss_amount - 10.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_invisible_sales_and_flags() -> Result<()> {
        let summary = ExecutiveSummary::from_table(&consolidated(), &CleaningRules::default())?;
        assert_eq!(summary.invisible_sales, 2);
        assert!((summary.invisible_sales_pct - 50.0).abs() < 1e-9);
        assert!((summary.revenue_at_risk - 80.0).abs() < 1e-9);
        assert_eq!(summary.uncatalogued_skus, 1);
        assert_eq!(summary.loyalty_paradox_cases, 1);
        assert_eq!(summary.mean_nps, Some(6.0));
        assert_eq!(summary.support_ticket_rate, Some(50.0));
        assert_eq!(summary.median_delivery_days, Some(3.5));
        assert_eq!(summary.mean_delivery_gap, Some(1.0));
        assert_eq!(
            summary.top_categories.first().map(|c| c.category.as_str()),
            Some("laptop")
        );
        Ok(())
    }

    #[test]
    fn test_empty_table() -> Result<()> {
        let summary = ExecutiveSummary::from_table(&DataFrame::empty(), &CleaningRules::default())?;
        assert_eq!(summary.records, 0);
        assert!((summary.margin_pct).abs() < f64::EPSILON);
        assert_eq!(summary.mean_nps, None);
        assert!(summary.top_categories.is_empty());
        assert!(summary.to_string().contains("Mean NPS: n/a"));
        Ok(())
    }

    #[test]
    fn test_display_uses_money_format() {
        let summary =
            ExecutiveSummary::from_table(&consolidated(), &CleaningRules::default()).unwrap();
        let text = summary.to_string();
        assert!(text.contains("Total revenue: $340.00"));
        assert!(text.contains("  - laptop: $200.00"));
    }
}
