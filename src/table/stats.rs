//! Order statistics used for imputation and outlier bounds.
//!
//! Quantiles use linear interpolation between closest ranks, the same
//! definition the profiling reports use, so medians and IQR bounds agree with
//! what analysts see elsewhere.

use polars::prelude::*;
use std::collections::BTreeMap;

fn chunked(values: &[f64]) -> Float64Chunked {
    Float64Chunked::from_slice("values".into(), values)
}

/// Non-missing values in their original order.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    chunked(values).median()
}

pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    chunked(values)
        .quantile(q, QuantileMethod::Linear)
        .unwrap_or(None)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn distinct_count(values: &[f64]) -> usize {
    let mut bits: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
    bits.sort_unstable();
    bits.dedup();
    bits.len()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// `Q1 - k*IQR` to `Q3 + k*IQR`. `None` when fewer than two distinct values
/// exist, in which case nothing is an outlier.
pub fn iqr_bounds(values: &[f64], multiplier: f64) -> Option<IqrBounds> {
    if distinct_count(values) < 2 {
        return None;
    }
    let q1 = quantile(values, 0.25)?;
    let q3 = quantile(values, 0.75)?;
    let iqr = q3 - q1;
    Some(IqrBounds {
        q1,
        q3,
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
    })
}

/// Median of `values` per key. Rows with a missing key or value are ignored,
/// and a key whose values are all missing has no entry.
pub fn group_medians(keys: &[Option<String>], values: &[Option<f64>]) -> BTreeMap<String, f64> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (key, value) in keys.iter().zip(values) {
        if let (Some(key), Some(value)) = (key, value) {
            groups.entry(key.clone()).or_default().push(*value);
        }
    }
    groups
        .into_iter()
        .filter_map(|(key, vals)| median(&vals).map(|m| (key, m)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_and_quantiles() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
        // linear interpolation: (n-1)*q = 2.25 over [10,20,30,40]
        assert_eq!(quantile(&[10.0, 20.0, 30.0, 40.0], 0.75), Some(32.5));
        assert_eq!(quantile(&[10.0, 20.0, 30.0, 40.0], 0.25), Some(17.5));
    }

    #[test]
    fn test_iqr_bounds() {
        let costs = [10.0, 12.0, 11.0, 13.0, 500.0];
        let bounds = iqr_bounds(&costs, 1.5).unwrap_or(IqrBounds {
            q1: 0.0,
            q3: 0.0,
            lower: 0.0,
            upper: 0.0,
        });
        assert!((bounds.q1 - 11.0).abs() < 1e-9);
        assert!((bounds.q3 - 13.0).abs() < 1e-9);
        assert!(bounds.is_outlier(500.0));
        assert!(!bounds.is_outlier(12.0));
    }

    #[test]
    fn test_iqr_bounds_degenerate() {
        assert_eq!(iqr_bounds(&[], 1.5), None);
        assert_eq!(iqr_bounds(&[7.0], 1.5), None);
        assert_eq!(iqr_bounds(&[7.0, 7.0, 7.0], 1.5), None);
    }

    #[test]
    fn test_group_medians_skip_missing() {
        let keys = vec![
            Some("laptop".to_owned()),
            Some("laptop".to_owned()),
            None,
            Some("tablet".to_owned()),
        ];
        let values = vec![Some(100.0), Some(200.0), Some(5.0), None];
        let medians = group_medians(&keys, &values);
        assert_eq!(medians.get("laptop"), Some(&150.0));
        assert!(!medians.contains_key("tablet"));
        assert_eq!(medians.len(), 1);
    }
}
