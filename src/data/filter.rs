use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{FigureDataset, FigureRecord};

// ---------------------------------------------------------------------------
// Filter parameters: one closed interval per metric
// ---------------------------------------------------------------------------

/// One query's range predicates. Constructed fresh per interaction and
/// never mutated; a range with `min > max` is a degenerate interval that
/// matches nothing (not an error).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub year_range: (i32, i32),
    pub price_range: (f64, f64),
    pub volume_range: (i64, i64),
    /// When true, records with no release year pass the year predicate.
    pub include_unknown_years: bool,
}

impl Default for FilterParams {
    fn default() -> Self {
        FilterParams {
            year_range: (i32::MIN, i32::MAX),
            price_range: (f64::MIN, f64::MAX),
            volume_range: (i64::MIN, i64::MAX),
            include_unknown_years: false,
        }
    }
}

impl FilterParams {
    /// Full-range parameters for a dataset: each interval spans the
    /// non-null min/max of its field. Dimensions with no non-null values
    /// fall back to an all-pass interval so they impose no constraint.
    pub fn covering(dataset: &FigureDataset) -> Self {
        FilterParams {
            year_range: dataset.year_bounds().unwrap_or((i32::MIN, i32::MAX)),
            price_range: dataset.price_bounds().unwrap_or((f64::MIN, f64::MAX)),
            volume_range: dataset.volume_bounds().unwrap_or((i64::MIN, i64::MAX)),
            include_unknown_years: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Membership predicate
// ---------------------------------------------------------------------------

/// All three range predicates must hold (logical AND):
/// * year – a null year passes only when `include_unknown_years` is set;
///   otherwise inclusive membership in `year_range`
/// * price – null is always excluded; otherwise inclusive membership
/// * volume – null is always excluded; otherwise inclusive membership
fn record_passes(record: &FigureRecord, params: &FilterParams) -> bool {
    let year_ok = match record.release_year {
        Some(y) => y >= params.year_range.0 && y <= params.year_range.1,
        None => params.include_unknown_years,
    };
    let price_ok = record
        .price
        .map_or(false, |p| p >= params.price_range.0 && p <= params.price_range.1);
    let volume_ok = record
        .volume
        .map_or(false, |v| v >= params.volume_range.0 && v <= params.volume_range.1);

    year_ok && price_ok && volume_ok
}

/// Return indices of records that pass all active range filters,
/// preserving original relative order.
pub fn filtered_indices(dataset: &FigureDataset, params: &FilterParams) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| record_passes(rec, params))
        .map(|(i, _)| i)
        .collect()
}

/// Count filtered records per category.
pub fn category_counts(
    dataset: &FigureDataset,
    indices: &[usize],
) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for &idx in indices {
        *counts
            .entry(dataset.records[idx].category.clone())
            .or_default() += 1;
    }
    counts
}
