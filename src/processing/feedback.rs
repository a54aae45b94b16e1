//! Customer feedback cleaning: NPS rescaling, rating and age repair, and the
//! support-ticket flag.

use super::health::health_score;
use super::metrics::{Dataset, DatasetCounters, FeedbackCounters, QualityMetrics};
use crate::columns::{
    CUSTOMER_AGE, FEEDBACK_COLUMNS, NPS_CATEGORY, NPS_NORMALIZED, NPS_RAW, PRODUCT_RATING,
    SUPPORT_TICKET_FLAG, SUPPORT_TICKET_RAW,
};
use crate::config::CleaningRules;
use crate::error::Result;
use crate::table::frame::{
    numeric_values, parse_number, set_f64, set_i32, set_i64, set_str, string_values,
};
use crate::table::naming::trim_column_names;
use crate::table::schema::ensure_columns;
use crate::table::stats::{mean, median, present};
use crate::utils::round2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NPS_MIN: f64 = 1.0;
pub const NPS_MAX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpsCategory {
    Promoter,
    Passive,
    Detractor,
}

impl NpsCategory {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Promoter
        } else if score >= 7.0 {
            Self::Passive
        } else {
            Self::Detractor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Promoter => "Promoter",
            Self::Passive => "Passive",
            Self::Detractor => "Detractor",
        }
    }
}

impl fmt::Display for NpsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bring an NPS reading from whatever scale it was captured on into `[1, 10]`.
///
/// Percent-style readings above 10 are compressed with `5 + n/20`, negative
/// readings with `5 + n/25`; the result is always clamped.
pub fn normalize_nps_value(n: f64) -> f64 {
    let scaled = if n > 10.0 {
        5.0 + n / 20.0
    } else if n < 0.0 {
        5.0 + n / 25.0
    } else {
        n
    };
    scaled.clamp(NPS_MIN, NPS_MAX)
}

/// Normalized NPS for a raw cell; unreadable cells get the neutral default.
pub fn normalize_nps(raw: Option<&str>, rules: &CleaningRules) -> f64 {
    normalize_nps_value(raw.and_then(parse_number).unwrap_or(rules.default_nps))
}

/// Valid ratings are kept; missing or above-scale ratings take `fill`.
fn repair_ratings(raw: &[Option<f64>], rules: &CleaningRules) -> (Vec<Option<f64>>, f64, usize) {
    let valid: Vec<Option<f64>> = raw
        .iter()
        .map(|r| r.filter(|v| *v <= rules.rating_max))
        .collect();
    let corrected = valid.iter().filter(|r| r.is_none()).count();
    let fill = median(&present(&valid)).unwrap_or(rules.default_rating);
    let ratings = valid.into_iter().map(|r| Some(r.unwrap_or(fill))).collect();
    (ratings, fill, corrected)
}

fn repair_ages(raw: &[Option<f64>], rules: &CleaningRules) -> (Vec<i64>, usize) {
    let mut corrected = 0;
    let ages = raw
        .iter()
        .map(|age| match age {
            Some(v) if *v > 0.0 => v.round() as i64,
            _ => {
                corrected += 1;
                rules.default_customer_age
            }
        })
        .collect();
    (ages, corrected)
}

/// Clean the feedback extract and report its quality metrics.
///
/// # Errors
///
/// Fails only on internal table-engine errors; malformed cells are repaired.
pub fn process_feedback(
    mut df: DataFrame,
    rules: &CleaningRules,
) -> Result<(DataFrame, QualityMetrics)> {
    tracing::info!("Cleaning feedback: {} rows", df.height());
    let mut drift = Vec::new();
    trim_column_names(&mut df)?;
    let before = health_score(&df);
    ensure_columns(&mut df, &FEEDBACK_COLUMNS, &mut drift)?;

    let nps: Vec<f64> = string_values(&df, NPS_RAW)?
        .iter()
        .map(|v| normalize_nps(v.as_deref(), rules))
        .collect();
    let categories: Vec<NpsCategory> = nps.iter().map(|n| NpsCategory::from_score(*n)).collect();

    let (ratings, rating_fill, corrected_ratings) =
        repair_ratings(&numeric_values(&df, PRODUCT_RATING)?, rules);
    let (ages, corrected_ages) = repair_ages(&numeric_values(&df, CUSTOMER_AGE)?, rules);

    let tickets: Vec<i32> = string_values(&df, SUPPORT_TICKET_RAW)?
        .iter()
        .map(|v| {
            let token = v.as_deref().unwrap_or_default().trim().to_uppercase();
            if !token.is_empty() && !rules.is_known_ticket_token(&token) {
                tracing::debug!("Unmapped support-ticket token '{token}' read as no ticket");
            }
            rules.ticket_flag(&token)
        })
        .collect();

    let count = |wanted: NpsCategory| categories.iter().filter(|c| **c == wanted).count();
    let counters = FeedbackCounters {
        mean_nps: mean(&nps).map(round2).unwrap_or_default(),
        rating_fill,
        corrected_ages,
        corrected_ratings,
        promoters: count(NpsCategory::Promoter),
        passives: count(NpsCategory::Passive),
        detractors: count(NpsCategory::Detractor),
    };

    set_f64(&mut df, NPS_NORMALIZED, nps.into_iter().map(Some).collect())?;
    set_str(
        &mut df,
        NPS_CATEGORY,
        categories
            .iter()
            .map(|c| Some(c.as_str().to_owned()))
            .collect(),
    )?;
    set_f64(&mut df, PRODUCT_RATING, ratings)?;
    set_i64(&mut df, CUSTOMER_AGE, ages)?;
    set_i32(&mut df, SUPPORT_TICKET_FLAG, tickets)?;

    let after = health_score(&df);
    tracing::debug!("Feedback counters: {counters:?}");
    tracing::info!(
        "Feedback health {:.2} -> {:.2} ({} ratings, {} ages corrected)",
        before.score,
        after.score,
        counters.corrected_ratings,
        counters.corrected_ages
    );

    let metrics = QualityMetrics::new(
        Dataset::Feedback,
        before,
        after,
        DatasetCounters::Feedback(counters),
        drift,
    );
    Ok((df, metrics))
}
