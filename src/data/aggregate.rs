//! Reductions over a date-filtered slice of observations.
//!
//! Every function here takes the same `&[&Observation]` selection so the
//! dashboard panels always describe one subset. Empty input gives empty output.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::category::{try_categorize, Category};
use super::model::{Measure, Observation};
use super::stats::{pearson_pairwise, MeanAccumulator};

// ---------------------------------------------------------------------------
// Temporal mean
// ---------------------------------------------------------------------------

/// Resampling bucket size for the PM2.5 time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    /// First day of the bucket containing `date`.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        let (y, m, d) = match self {
            Granularity::Day => return date,
            Granularity::Month => (date.year(), date.month(), 1),
            Granularity::Year => (date.year(), 1, 1),
        };
        // Day 1 of an existing month/year always exists.
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(date)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Day => "Daily",
            Granularity::Month => "Monthly",
            Granularity::Year => "Yearly",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub bucket: NaiveDate,
    pub mean_pm25: f64,
}

/// Mean PM2.5 per bucket, ascending by bucket start.
///
/// Buckets without a single PM2.5 reading are left out rather than zero-filled.
pub fn temporal_mean(rows: &[&Observation], granularity: Granularity) -> Vec<TimePoint> {
    let mut buckets: BTreeMap<NaiveDate, MeanAccumulator> = BTreeMap::new();
    for obs in rows {
        if let Some(v) = obs.pm25() {
            buckets
                .entry(granularity.bucket_start(obs.date()))
                .or_default()
                .push(v);
        }
    }
    buckets
        .into_iter()
        .filter_map(|(bucket, acc)| {
            acc.mean().map(|mean_pm25| TimePoint { bucket, mean_pm25 })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// By-station mean
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMean {
    pub station: String,
    /// `None` when the station has no PM2.5 reading in the selection.
    pub mean_pm25: Option<f64>,
    /// Number of PM2.5 readings behind the mean.
    pub samples: usize,
}

/// Mean PM2.5 per station, in station-name order.
pub fn by_station_mean(rows: &[&Observation]) -> Vec<StationMean> {
    let mut per_station: BTreeMap<&str, MeanAccumulator> = BTreeMap::new();
    for obs in rows {
        per_station
            .entry(obs.station.as_str())
            .or_default()
            .push_opt(obs.pm25());
    }
    per_station
        .into_iter()
        .map(|(station, acc)| StationMean {
            station: station.to_string(),
            mean_pm25: acc.mean(),
            samples: acc.count(),
        })
        .collect()
}

/// Sort station means from most to least polluted; undefined means go last.
pub fn rank_descending(mut means: Vec<StationMean>) -> Vec<StationMean> {
    means.sort_by(|a, b| match (a.mean_pm25, b.mean_pm25) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.station.cmp(&b.station)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.station.cmp(&b.station),
    });
    means
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Symmetric Pearson matrix over [`Measure::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub measures: Vec<Measure>,
    /// Row-major, `values[i][j]` pairs `measures[i]` with `measures[j]`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// Pairwise-complete Pearson correlation of every measure against every other.
///
/// The diagonal is fixed at 1.0; off-diagonal pairs without enough complete
/// data are NaN.
pub fn correlation_matrix(rows: &[&Observation]) -> CorrelationMatrix {
    if rows.is_empty() {
        return CorrelationMatrix {
            measures: Vec::new(),
            values: Vec::new(),
        };
    }

    let columns: Vec<Vec<Option<f64>>> = Measure::ALL
        .iter()
        .map(|&m| rows.iter().map(|obs| obs.value(m)).collect())
        .collect();

    let n = Measure::COUNT;
    let mut values = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let r = pearson_pairwise(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        measures: Measure::ALL.to_vec(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Per-station category summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationCategory {
    pub station: String,
    pub mean_pm25: Option<f64>,
    /// `None` when the mean is undefined.
    pub category: Option<Category>,
}

/// Categorise each station by its mean PM2.5 (not by individual readings).
pub fn station_categories(rows: &[&Observation]) -> Vec<StationCategory> {
    by_station_mean(rows)
        .into_iter()
        .map(|s| StationCategory {
            category: s.mean_pm25.and_then(try_categorize),
            mean_pm25: s.mean_pm25,
            station: s.station,
        })
        .collect()
}
