use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FigureRecord – one normalized sale record
// ---------------------------------------------------------------------------

/// A single collectible-figure sale record after field renaming, type
/// coercion and derived-metric computation.
///
/// `release_year` and `market_cap` are derived in [`FigureRecord::new`] and
/// are never taken from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureRecord {
    /// Figure category (source column `console-name`).
    pub category: String,
    /// Figure name (source column `product-name`). Not unique.
    pub name: String,
    /// Average sell price (source column `new-price`).
    pub price: Option<f64>,
    /// Number of recorded sales (source column `sales-volume`).
    pub volume: Option<i64>,
    /// Release date (source column `release-date`).
    pub release_date: Option<NaiveDate>,
    /// Calendar year of `release_date`; `None` iff the date is `None`.
    pub release_year: Option<i32>,
    /// `volume * price`; `None` if either factor is `None`.
    pub market_cap: Option<f64>,
}

impl FigureRecord {
    /// Build a record from the coerced input fields, deriving
    /// `release_year` and `market_cap`.
    pub fn new(
        category: String,
        name: String,
        price: Option<f64>,
        volume: Option<i64>,
        release_date: Option<NaiveDate>,
    ) -> Self {
        let release_year = release_date.map(|d| d.year());
        let market_cap = match (volume, price) {
            (Some(v), Some(p)) => Some(v as f64 * p),
            _ => None,
        };
        FigureRecord {
            category,
            name,
            price,
            volume,
            release_date,
            release_year,
            market_cap,
        }
    }
}

// ---------------------------------------------------------------------------
// FigureDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full normalized record set with a pre-computed category index.
#[derive(Debug, Clone)]
pub struct FigureDataset {
    /// All records, in input order.
    pub records: Vec<FigureRecord>,
    /// Sorted distinct `category` values.
    pub categories: Vec<String>,
}

impl FigureDataset {
    /// Build the category index from the loaded records.
    pub fn from_records(records: Vec<FigureRecord>) -> Self {
        let categories: BTreeSet<String> =
            records.iter().map(|r| r.category.clone()).collect();
        FigureDataset {
            records,
            categories: categories.into_iter().collect(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Min/max of the non-null release years, `None` when every year is
    /// null (the dimension cannot be queried).
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let mut years = self.records.iter().filter_map(|r| r.release_year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }

    /// Min/max of the non-null prices.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        let mut prices = self.records.iter().filter_map(|r| r.price);
        let first = prices.next()?;
        Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Min/max of the non-null sales volumes.
    pub fn volume_bounds(&self) -> Option<(i64, i64)> {
        let mut volumes = self.records.iter().filter_map(|r| r.volume);
        let first = volumes.next()?;
        Some(volumes.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

// ---------------------------------------------------------------------------
// Diagnostics – load-time data-quality report
// ---------------------------------------------------------------------------

/// Aggregate data-quality counters produced by the loader.
///
/// Value-level malformation never fails a load; it degrades to null on the
/// affected record and is tallied here. An entirely-null price or volume
/// column is the one condition callers must treat as fatal: no meaningful
/// range can be computed for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Rows parsed from the input before baseline exclusion.
    pub total_rows: usize,
    /// Rows dropped by the low-volume baseline exclusion.
    pub dropped_low_volume: usize,
    /// Retained records with null `price`.
    pub null_price: usize,
    /// Retained records with null `volume`.
    pub null_volume: usize,
    /// Retained records with null `release_date` (and thus null year).
    pub null_release_date: usize,
}

impl Diagnostics {
    /// Retained record count.
    pub fn retained(&self) -> usize {
        self.total_rows - self.dropped_low_volume
    }

    /// Every retained record has a null price.
    pub fn all_prices_missing(&self) -> bool {
        self.retained() > 0 && self.null_price == self.retained()
    }

    /// Every retained record has a null volume.
    pub fn all_volumes_missing(&self) -> bool {
        self.retained() > 0 && self.null_volume == self.retained()
    }

    /// Non-blocking advisory lines for display, one per partially-null
    /// field. Fatal conditions are not listed here.
    pub fn advisories(&self) -> Vec<String> {
        let mut out = Vec::new();
        let retained = self.retained();
        let mut advise = |count: usize, what: &str| {
            if count > 0 && count < retained {
                out.push(format!("{count} of {retained} records have no {what}"));
            }
        };
        advise(self.null_price, "price");
        advise(self.null_volume, "sales volume");
        advise(self.null_release_date, "release date");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn derives_year_and_market_cap() {
        let rec = FigureRecord::new(
            "Animation".into(),
            "Kitsune".into(),
            Some(12.5),
            Some(4),
            Some(date(2020, 6, 1)),
        );
        assert_eq!(rec.release_year, Some(2020));
        assert_eq!(rec.market_cap, Some(50.0));
    }

    #[test]
    fn derived_fields_propagate_nulls() {
        let no_price = FigureRecord::new("A".into(), "x".into(), None, Some(3), None);
        assert_eq!(no_price.market_cap, None);
        assert_eq!(no_price.release_year, None);

        let no_volume = FigureRecord::new(
            "A".into(),
            "y".into(),
            Some(9.0),
            None,
            Some(date(1999, 12, 31)),
        );
        assert_eq!(no_volume.market_cap, None);
        assert_eq!(no_volume.release_year, Some(1999));
    }

    #[test]
    fn bounds_skip_nulls() {
        let ds = FigureDataset::from_records(vec![
            FigureRecord::new("A".into(), "a".into(), Some(5.0), None, None),
            FigureRecord::new(
                "B".into(),
                "b".into(),
                None,
                Some(10),
                Some(date(2018, 3, 3)),
            ),
            FigureRecord::new(
                "A".into(),
                "c".into(),
                Some(40.0),
                Some(2),
                Some(date(2021, 1, 1)),
            ),
        ]);
        assert_eq!(ds.price_bounds(), Some((5.0, 40.0)));
        assert_eq!(ds.volume_bounds(), Some((2, 10)));
        assert_eq!(ds.year_bounds(), Some((2018, 2021)));
        assert_eq!(ds.categories, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn bounds_are_none_when_all_null() {
        let ds = FigureDataset::from_records(vec![FigureRecord::new(
            "A".into(),
            "a".into(),
            None,
            None,
            None,
        )]);
        assert_eq!(ds.price_bounds(), None);
        assert_eq!(ds.volume_bounds(), None);
        assert_eq!(ds.year_bounds(), None);
    }

    #[test]
    fn all_missing_requires_records() {
        let empty = Diagnostics::default();
        assert!(!empty.all_prices_missing());

        let degraded = Diagnostics {
            total_rows: 4,
            dropped_low_volume: 1,
            null_price: 3,
            null_volume: 0,
            null_release_date: 1,
        };
        assert!(degraded.all_prices_missing());
        assert!(!degraded.all_volumes_missing());
        assert_eq!(degraded.advisories().len(), 1);
    }
}
