//! Quality metrics emitted per dataset.
//!
//! These records are the contract with the reporting layer: serialized keys
//! stay in the operator's vocabulary (`health_score_antes`,
//! `health_score_despues`, ...) while the Rust fields read naturally.

use crate::table::SchemaDrift;
use crate::utils::{fmt_money, round2};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dataset {
    #[serde(rename = "inventario")]
    Inventory,
    #[serde(rename = "transacciones")]
    Transactions,
    #[serde(rename = "feedback")]
    Feedback,
}

impl Dataset {
    pub const ALL: [Self; 3] = [Self::Inventory, Self::Transactions, Self::Feedback];

    /// Key the reporting layer looks metrics up by.
    pub fn key(self) -> &'static str {
        match self {
            Self::Inventory => "inventario",
            Self::Transactions => "transacciones",
            Self::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Output of the health scorer. Percentages are on the 0-100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: f64,
    #[serde(rename = "pct_nulos")]
    pub null_pct: f64,
    #[serde(rename = "pct_duplicados")]
    pub dup_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for CostRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", fmt_money(self.min), fmt_money(self.max))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryCounters {
    #[serde(rename = "costos_outliers_detectados")]
    pub cost_outliers: usize,
    #[serde(rename = "stock_negativos_corregidos")]
    pub negative_stock: usize,
    #[serde(rename = "costos_imputados")]
    pub imputed_costs: usize,
    #[serde(rename = "lead_times_imputados")]
    pub imputed_lead_times: usize,
    #[serde(rename = "duplicados_sku_id")]
    pub duplicate_skus: usize,
    #[serde(rename = "valor_inventario_total")]
    pub inventory_value: f64,
    #[serde(rename = "rango_costos_final")]
    pub cost_range: Option<CostRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackCounters {
    #[serde(rename = "nps_promedio")]
    pub mean_nps: f64,
    #[serde(rename = "rating_mediana")]
    pub rating_fill: f64,
    #[serde(rename = "edades_corregidas")]
    pub corrected_ages: usize,
    #[serde(rename = "ratings_corregidos")]
    pub corrected_ratings: usize,
    #[serde(rename = "promotores")]
    pub promoters: usize,
    #[serde(rename = "pasivos")]
    pub passives: usize,
    #[serde(rename = "detractores")]
    pub detractors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCounters {
    #[serde(rename = "total_transacciones")]
    pub total: usize,
    #[serde(rename = "tiempos_outliers")]
    pub delivery_outliers: usize,
    #[serde(rename = "tiempos_negativos")]
    pub negative_delivery_times: usize,
    #[serde(rename = "precios_corregidos")]
    pub coerced_prices: usize,
    #[serde(rename = "costos_envio_corregidos")]
    pub coerced_shipping_costs: usize,
    #[serde(rename = "cantidades_corregidas", default)]
    pub coerced_quantities: usize,
    #[serde(rename = "cantidades_negativas")]
    pub negative_quantities: usize,
    #[serde(rename = "skus_sin_inventario")]
    pub unknown_skus: usize,
    #[serde(rename = "transacciones_sin_feedback")]
    pub without_feedback: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasetCounters {
    Inventory(InventoryCounters),
    Feedback(FeedbackCounters),
    Transactions(TransactionCounters),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub dataset: Dataset,
    #[serde(rename = "health_score_antes")]
    pub score_before: f64,
    #[serde(rename = "health_score_despues")]
    pub score_after: f64,
    #[serde(rename = "detalle_antes")]
    pub before: HealthScore,
    #[serde(rename = "detalle_despues")]
    pub after: HealthScore,
    #[serde(rename = "mejora_health_score")]
    pub improvement: f64,
    #[serde(rename = "indicadores")]
    pub counters: DatasetCounters,
    #[serde(rename = "desviaciones_esquema", default)]
    pub schema_drift: Vec<SchemaDrift>,
}

impl QualityMetrics {
    pub fn new(
        dataset: Dataset,
        before: HealthScore,
        after: HealthScore,
        counters: DatasetCounters,
        schema_drift: Vec<SchemaDrift>,
    ) -> Self {
        Self {
            dataset,
            score_before: before.score,
            score_after: after.score,
            before,
            after,
            improvement: round2(after.score - before.score),
            counters,
            schema_drift,
        }
    }

    pub fn improved(&self) -> bool {
        self.improvement > 0.0
    }

    /// Relative improvement over the raw score, for "quality improved by X%"
    /// statements. `None` when the raw score was zero.
    pub fn improvement_pct(&self) -> Option<f64> {
        (self.score_before > 0.0).then(|| round2(self.improvement / self.score_before * 100.0))
    }

    pub fn inventory(&self) -> Option<&InventoryCounters> {
        match &self.counters {
            DatasetCounters::Inventory(c) => Some(c),
            _ => None,
        }
    }

    pub fn feedback(&self) -> Option<&FeedbackCounters> {
        match &self.counters {
            DatasetCounters::Feedback(c) => Some(c),
            _ => None,
        }
    }

    pub fn transactions(&self) -> Option<&TransactionCounters> {
        match &self.counters {
            DatasetCounters::Transactions(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]
    use super::*;

    fn score(score: f64) -> HealthScore {
        HealthScore {
            score,
            null_pct: 0.0,
            dup_pct: 0.0,
        }
    }

    fn sample() -> QualityMetrics {
        QualityMetrics::new(
            Dataset::Feedback,
            score(80.0),
            score(96.5),
            DatasetCounters::Feedback(FeedbackCounters {
                mean_nps: 6.4,
                rating_fill: 4.0,
                corrected_ages: 2,
                corrected_ratings: 3,
                promoters: 1,
                passives: 1,
                detractors: 2,
            }),
            Vec::new(),
        )
    }

    #[test]
    fn test_serialized_keys_follow_reporting_contract() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["dataset"], "feedback");
        assert_eq!(json["health_score_antes"], 80.0);
        assert_eq!(json["health_score_despues"], 96.5);
        assert_eq!(json["mejora_health_score"], 16.5);
        assert_eq!(json["indicadores"]["ratings_corregidos"], 3);
    }

    #[test]
    fn test_improvement_helpers() {
        let metrics = sample();
        assert!(metrics.improved());
        assert_eq!(metrics.improvement_pct(), Some(20.63));
        assert!(metrics.feedback().is_some());
        assert!(metrics.inventory().is_none());
    }

    #[test]
    fn test_round_trip_keeps_counter_variant() {
        let metrics = sample();
        let json = serde_json::to_string(&metrics).unwrap();
        let parsed: QualityMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metrics);
    }

    #[test]
    fn test_cost_range_display() {
        let range = CostRange {
            min: 4.5,
            max: 1250.0,
        };
        assert_eq!(range.to_string(), "$4.50 - $1,250.00");
    }
}
