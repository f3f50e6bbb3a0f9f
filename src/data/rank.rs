use super::model::{FigureDataset, FigureRecord};

// ---------------------------------------------------------------------------
// Ranking metrics
// ---------------------------------------------------------------------------

/// Metrics the dashboard ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    MarketCap,
    Volume,
    Price,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::MarketCap, Metric::Volume, Metric::Price];

    /// Display heading for the metric.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::MarketCap => "Market Capitalization",
            Metric::Volume => "Sales Volume",
            Metric::Price => "Avg. Sell Price",
        }
    }

    /// The record's value for this metric, if known.
    pub fn value_of(&self, record: &FigureRecord) -> Option<f64> {
        match self {
            Metric::MarketCap => record.market_cap,
            Metric::Volume => record.volume.map(|v| v as f64),
            Metric::Price => record.price,
        }
    }

    /// Format a metric value for display.
    pub fn format(&self, value: f64) -> String {
        match self {
            Metric::MarketCap | Metric::Price => format!("${value:.2}"),
            Metric::Volume => format!("{}", value as i64),
        }
    }
}

/// Number of entries in each ranking view.
pub const TOP_N: usize = 10;

/// Rank the filtered records by a metric, descending.
///
/// Records with a null metric value are excluded, so the result holds
/// `min(n, non-null count)` indices. The sort is stable: ties keep their
/// original relative order.
pub fn top_by_metric(
    dataset: &FigureDataset,
    indices: &[usize],
    metric: Metric,
    n: usize,
) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = indices
        .iter()
        .filter_map(|&idx| {
            metric
                .value_of(&dataset.records[idx])
                .map(|value| (idx, value))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked.into_iter().map(|(idx, _)| idx).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FigureRecord;

    fn record(name: &str, price: Option<f64>, volume: Option<i64>) -> FigureRecord {
        FigureRecord::new("Games".to_string(), name.to_string(), price, volume, None)
    }

    fn dataset() -> FigureDataset {
        FigureDataset::from_records(vec![
            record("a", Some(10.0), Some(5)),  // cap 50
            record("b", Some(50.0), None),     // cap null
            record("c", Some(2.0), Some(20)),  // cap 40
            record("d", None, Some(100)),      // cap null
            record("e", Some(30.0), Some(2)),  // cap 60
        ])
    }

    #[test]
    fn ranks_descending_and_skips_nulls() {
        let ds = dataset();
        let all: Vec<usize> = (0..ds.len()).collect();

        let by_cap = top_by_metric(&ds, &all, Metric::MarketCap, TOP_N);
        assert_eq!(by_cap, vec![4, 0, 2]);

        let by_price = top_by_metric(&ds, &all, Metric::Price, TOP_N);
        assert_eq!(by_price, vec![1, 4, 0, 2]);

        let by_volume = top_by_metric(&ds, &all, Metric::Volume, TOP_N);
        assert_eq!(by_volume, vec![3, 2, 0, 4]);
    }

    #[test]
    fn length_is_min_of_n_and_non_null_count() {
        let ds = dataset();
        let all: Vec<usize> = (0..ds.len()).collect();
        assert_eq!(top_by_metric(&ds, &all, Metric::MarketCap, 2).len(), 2);
        assert_eq!(top_by_metric(&ds, &all, Metric::MarketCap, TOP_N).len(), 3);
        assert!(top_by_metric(&ds, &[], Metric::MarketCap, TOP_N).is_empty());
    }

    #[test]
    fn no_excluded_candidate_beats_a_ranked_one() {
        let ds = dataset();
        let all: Vec<usize> = (0..ds.len()).collect();
        let top = top_by_metric(&ds, &all, Metric::Price, 2);
        let cutoff = Metric::Price.value_of(&ds.records[top[1]]).unwrap();
        for idx in all {
            if top.contains(&idx) {
                continue;
            }
            if let Some(v) = Metric::Price.value_of(&ds.records[idx]) {
                assert!(v <= cutoff);
            }
        }
    }

    #[test]
    fn ties_keep_original_order() {
        let ds = FigureDataset::from_records(vec![
            record("first", Some(10.0), Some(1)),
            record("second", Some(10.0), Some(1)),
            record("third", Some(10.0), Some(1)),
        ]);
        let all: Vec<usize> = (0..ds.len()).collect();
        assert_eq!(top_by_metric(&ds, &all, Metric::Price, TOP_N), vec![0, 1, 2]);
    }

    #[test]
    fn only_passed_indices_are_considered() {
        let ds = dataset();
        let top = top_by_metric(&ds, &[0, 2], Metric::MarketCap, TOP_N);
        assert_eq!(top, vec![0, 2]);
    }
}
