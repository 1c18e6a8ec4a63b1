use std::fmt;

use log::debug;
use serde::Serialize;

use crate::data::aggregate::{
    by_station_mean, correlation_matrix, rank_descending, station_categories, temporal_mean,
    CorrelationMatrix, Granularity, StationCategory, StationMean, TimePoint,
};
use crate::data::filter::{filter_by_date, DateRange};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// DashboardReport – every derived view for one date range
// ---------------------------------------------------------------------------

/// All aggregates shown on the dashboard, computed from one filtered subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardReport {
    pub range: Option<DateRange>,
    /// Distinct stations in the whole dataset, independent of the range.
    pub total_stations: usize,
    pub rows_in_range: usize,
    pub daily: Vec<TimePoint>,
    pub monthly: Vec<TimePoint>,
    pub yearly: Vec<TimePoint>,
    /// Sorted from highest to lowest mean.
    pub by_station: Vec<StationMean>,
    pub correlation: Option<CorrelationMatrix>,
    pub categories: Vec<StationCategory>,
}

impl DashboardReport {
    /// Recompute every view for `range` from scratch.
    pub fn build(dataset: &Dataset, range: DateRange) -> Self {
        let rows = filter_by_date(dataset, &range);
        debug!(
            "Recomputing report for {}..={} ({} rows)",
            range.start,
            range.end,
            rows.len()
        );

        let correlation = correlation_matrix(&rows);
        DashboardReport {
            range: Some(range),
            total_stations: dataset.station_count(),
            rows_in_range: rows.len(),
            daily: temporal_mean(&rows, Granularity::Day),
            monthly: temporal_mean(&rows, Granularity::Month),
            yearly: temporal_mean(&rows, Granularity::Year),
            by_station: rank_descending(by_station_mean(&rows)),
            correlation: (!correlation.is_empty()).then_some(correlation),
            categories: station_categories(&rows),
        }
    }

    pub fn has_data(&self) -> bool {
        self.rows_in_range > 0
    }

    pub fn series(&self, granularity: Granularity) -> &[TimePoint] {
        match granularity {
            Granularity::Day => &self.daily,
            Granularity::Month => &self.monthly,
            Granularity::Year => &self.yearly,
        }
    }

    /// Plain-text rendering for terminal output.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Air Quality Dashboard")?;
        if let Some(r) = &self.range {
            writeln!(f, "Range: {} .. {}", r.start, r.end)?;
        }
        writeln!(f, "Total stations: {}", self.total_stations)?;
        writeln!(f, "Observations in range: {}", self.rows_in_range)?;

        if !self.has_data() {
            return writeln!(f, "\nNo data in the selected range.");
        }

        for granularity in [Granularity::Day, Granularity::Month, Granularity::Year] {
            writeln!(f, "\n{granularity} average PM2.5")?;
            for p in self.series(granularity) {
                writeln!(f, "  {}  {:>8.2}", p.bucket, p.mean_pm25)?;
            }
        }

        writeln!(f, "\nAverage PM2.5 by station")?;
        for s in &self.by_station {
            writeln!(f, "  {:<20} {:>8}", s.station, fmt_mean(s.mean_pm25))?;
        }

        if let Some(corr) = &self.correlation {
            writeln!(f, "\nCorrelation")?;
            write!(f, "{:>6}", "")?;
            for m in &corr.measures {
                write!(f, " {:>6}", m.column_name())?;
            }
            writeln!(f)?;
            for (i, m) in corr.measures.iter().enumerate() {
                write!(f, "{:>6}", m.column_name())?;
                for j in 0..corr.measures.len() {
                    write!(f, " {:>6.2}", corr.get(i, j))?;
                }
                writeln!(f)?;
            }
        }

        writeln!(f, "\nAir Quality Index")?;
        for c in &self.categories {
            let label = c.category.map(|c| c.label()).unwrap_or("Unknown");
            writeln!(f, "  {:<20} {:>8}  {label}", c.station, fmt_mean(c.mean_pm25))?;
        }
        Ok(())
    }
}

pub fn fmt_mean(mean: Option<f64>) -> String {
    mean.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".to_string())
}
