//! Cleaning rules shared by every processor.
//!
//! All lookup tables and thresholds live in one immutable [`CleaningRules`]
//! value that callers pass into each component explicitly. The defaults are the
//! rules the operator audits against; a JSON rule file may override any subset
//! of them (missing keys keep their defaults).

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningRules {
    /// Uppercased warehouse code -> canonical warehouse name
    pub warehouse_names: BTreeMap<String, String>,
    /// Lowercased category synonym -> canonical category
    pub category_synonyms: BTreeMap<String, String>,
    /// Lowercased category tokens that mean "no category"
    pub category_unknown_tokens: Vec<String>,
    /// Lowercased lead-time tokens that mean "no lead time"
    pub lead_time_missing_tokens: Vec<String>,
    /// Substring marking an immediate lead time
    pub lead_time_immediate_token: String,
    pub lead_time_immediate_days: f64,
    /// Multiplier applied to the IQR when bounding unit costs
    pub iqr_multiplier: f64,

    /// Value used when an NPS cell cannot be read
    pub default_nps: f64,
    /// Ratings above this are treated as entry errors
    pub rating_max: f64,
    /// Fill value when no valid rating exists to take a median from
    pub default_rating: f64,
    pub default_customer_age: i64,
    /// Uppercased ticket tokens meaning "ticket opened"
    pub ticket_true_tokens: Vec<String>,
    /// Uppercased ticket tokens meaning "no ticket"
    pub ticket_false_tokens: Vec<String>,

    /// Accepted headers for the delivery-time column, canonical name first
    pub delivery_time_aliases: Vec<String>,
    /// Delivery times strictly above this are sentinel values (e.g. 999)
    pub delivery_sentinel_threshold: f64,
    /// Uppercased city alias -> canonical city
    pub city_aliases: BTreeMap<String, String>,

    /// Category assigned to sales whose SKU is not in the inventory master
    pub uncatalogued_label: String,
    pub loyalty_stock_quantile: f64,
    pub loyalty_nps_threshold: f64,
}

fn string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn string_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            warehouse_names: string_map(&[
                ("NORTE", "Norte"),
                ("SUR", "Sur"),
                ("CENTRO", "Centro"),
            ]),
            category_synonyms: string_map(&[
                ("laptops", "laptop"),
                ("smart-phone", "smartphone"),
                ("smartphones", "smartphone"),
            ]),
            category_unknown_tokens: string_list(&["???", "unknown", "sin categoria"]),
            lead_time_missing_tokens: string_list(&["", "nan", "none", "null"]),
            lead_time_immediate_token: "inmediato".to_owned(),
            lead_time_immediate_days: 1.0,
            iqr_multiplier: 1.5,

            default_nps: 5.0,
            rating_max: 5.0,
            default_rating: 3.0,
            default_customer_age: 35,
            ticket_true_tokens: string_list(&["SÍ", "SI", "1", "1.0", "TRUE"]),
            ticket_false_tokens: string_list(&["NO", "0", "0.0", "FALSE", "NAN"]),

            delivery_time_aliases: string_list(&["Tiempo_Entrega", "Tiempo_Entrega_Real"]),
            delivery_sentinel_threshold: 100.0,
            city_aliases: string_map(&[
                ("BOG", "BOGOTÁ"),
                ("BOGOTA", "BOGOTÁ"),
                ("MED", "MEDELLÍN"),
                ("MEDELLIN", "MEDELLÍN"),
                ("BAQ", "BARRANQUILLA"),
                ("BARRANQUILLA", "BARRANQUILLA"),
                ("VENTAS_WEB", "CANAL DIGITAL"),
            ]),

            uncatalogued_label: "uncatalogued".to_owned(),
            loyalty_stock_quantile: 0.75,
            loyalty_nps_threshold: 7.0,
        }
    }
}

impl CleaningRules {
    /// Load rules from a JSON file
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read rules file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse rules from a JSON string
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] on malformed JSON or invalid thresholds.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Serialize rules to a pretty JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.loyalty_stock_quantile) {
            return Err(PipelineError::Config(format!(
                "loyalty_stock_quantile must be within [0, 1], got {}",
                self.loyalty_stock_quantile
            )));
        }
        if self.iqr_multiplier < 0.0 {
            return Err(PipelineError::Config(format!(
                "iqr_multiplier must be non-negative, got {}",
                self.iqr_multiplier
            )));
        }
        if self
            .delivery_time_aliases
            .first()
            .is_none_or(|name| name.trim().is_empty())
        {
            return Err(PipelineError::Config(
                "delivery_time_aliases needs at least the canonical column name".to_owned(),
            ));
        }
        if self.uncatalogued_label.trim().is_empty() {
            return Err(PipelineError::Config(
                "uncatalogued_label must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Canonical warehouse for an uppercased, trimmed code.
    pub fn warehouse(&self, code: &str) -> String {
        self.warehouse_names
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_owned())
    }

    /// Canonical category for a lowercased, trimmed value; `None` for sentinel tokens.
    pub fn category(&self, value: &str) -> Option<String> {
        if value.is_empty() || self.category_unknown_tokens.iter().any(|t| t == value) {
            return None;
        }
        Some(
            self.category_synonyms
                .get(value)
                .cloned()
                .unwrap_or_else(|| value.to_owned()),
        )
    }

    /// Canonical city for an uppercased, trimmed value.
    pub fn city(&self, value: &str) -> String {
        self.city_aliases
            .get(value)
            .cloned()
            .unwrap_or_else(|| value.to_owned())
    }

    /// Support-ticket flag for an uppercased, trimmed token; unknown tokens are 0.
    pub fn ticket_flag(&self, token: &str) -> i32 {
        if self.ticket_true_tokens.iter().any(|t| t == token) {
            1
        } else {
            0
        }
    }

    /// Whether a ticket token appears in either table.
    pub fn is_known_ticket_token(&self, token: &str) -> bool {
        self.ticket_true_tokens.iter().any(|t| t == token)
            || self.ticket_false_tokens.iter().any(|t| t == token)
    }

    /// The canonical delivery-time column name.
    pub fn delivery_column(&self) -> &str {
        self.delivery_time_aliases
            .first()
            .map(String::as_str)
            .unwrap_or(crate::columns::DELIVERY_TIME)
    }
}
