use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Measure – one numeric column of the merged dataset
// ---------------------------------------------------------------------------

/// The numeric columns carried by every observation, in source column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Measure {
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
    O3,
    Temp,
    Pres,
    Dewp,
    Rain,
    Wspm,
}

impl Measure {
    pub const COUNT: usize = 11;

    pub const ALL: [Measure; Measure::COUNT] = [
        Measure::Pm25,
        Measure::Pm10,
        Measure::So2,
        Measure::No2,
        Measure::Co,
        Measure::O3,
        Measure::Temp,
        Measure::Pres,
        Measure::Dewp,
        Measure::Rain,
        Measure::Wspm,
    ];

    /// Column header used in the input files.
    pub fn column_name(self) -> &'static str {
        match self {
            Measure::Pm25 => "PM2.5",
            Measure::Pm10 => "PM10",
            Measure::So2 => "SO2",
            Measure::No2 => "NO2",
            Measure::Co => "CO",
            Measure::O3 => "O3",
            Measure::Temp => "TEMP",
            Measure::Pres => "PRES",
            Measure::Dewp => "DEWP",
            Measure::Rain => "RAIN",
            Measure::Wspm => "WSPM",
        }
    }

    /// Position inside [`Observation::values`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Columns that must be present in every input file.
pub const STATION_COLUMN: &str = "station";
pub const TIME_COLUMNS: [&str; 4] = ["year", "month", "day", "hour"];

// ---------------------------------------------------------------------------
// Observation – one row of the merged table
// ---------------------------------------------------------------------------

/// One hourly reading at one station.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub station: String,
    /// Built from the year/month/day/hour columns at load time.
    pub timestamp: NaiveDateTime,
    /// Measure values indexed by [`Measure::index`]; `None` when the cell was missing.
    pub values: [Option<f64>; Measure::COUNT],
}

impl Observation {
    /// Build an observation from raw timestamp components.
    ///
    /// `row` is only used to report which input row was malformed.
    pub fn from_components(
        row: usize,
        station: String,
        (year, month, day, hour): (i64, i64, i64, i64),
        values: [Option<f64>; Measure::COUNT],
    ) -> Result<Self> {
        let invalid = || DataError::InvalidTimestamp {
            row,
            year,
            month,
            day,
            hour,
        };
        let date = match (i32::try_from(year), u32::try_from(month), u32::try_from(day)) {
            (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };
        let timestamp = u32::try_from(hour)
            .ok()
            .and_then(|h| date.and_hms_opt(h, 0, 0))
            .ok_or_else(invalid)?;

        Ok(Observation {
            station,
            timestamp,
            values,
        })
    }

    pub fn value(&self, measure: Measure) -> Option<f64> {
        self.values[measure.index()]
    }

    pub fn pm25(&self) -> Option<f64> {
        self.value(Measure::Pm25)
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed station index and time span.
///
/// Immutable after construction; aggregations borrow it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub observations: Vec<Observation>,
    /// Sorted distinct station identifiers.
    pub stations: BTreeSet<String>,
    /// Earliest and latest timestamp, `None` for an empty table.
    pub span: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl Dataset {
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let stations = observations.iter().map(|o| o.station.clone()).collect();
        let span = observations.iter().fold(None, |acc, o| match acc {
            None => Some((o.timestamp, o.timestamp)),
            Some((lo, hi)) => Some((lo.min(o.timestamp), hi.max(o.timestamp))),
        });
        Dataset {
            observations,
            stations,
            span,
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// First and last calendar day covered by the table.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.span.map(|(lo, hi)| (lo.date(), hi.date()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pm25: f64) -> [Option<f64>; Measure::COUNT] {
        let mut v = [None; Measure::COUNT];
        v[Measure::Pm25.index()] = Some(pm25);
        v
    }

    #[test]
    fn builds_timestamp_from_components() {
        let obs = Observation::from_components(0, "Aotizhongxin".into(), (2013, 3, 1, 5), values(4.0))
            .unwrap();
        assert_eq!(obs.timestamp.to_string(), "2013-03-01 05:00:00");
        assert_eq!(obs.pm25(), Some(4.0));
        assert_eq!(obs.value(Measure::Temp), None);
    }

    #[test]
    fn rejects_out_of_range_components() {
        for parts in [(2013, 13, 1, 0), (2013, 2, 30, 0), (2013, 3, 1, 24), (2013, -1, 1, 0)] {
            let err = Observation::from_components(7, "A".into(), parts, values(1.0)).unwrap_err();
            assert!(matches!(err, DataError::InvalidTimestamp { row: 7, .. }), "{err}");
        }
    }

    #[test]
    fn dataset_tracks_stations_and_span() {
        let rows = vec![
            Observation::from_components(0, "B".into(), (2014, 1, 2, 0), values(1.0)).unwrap(),
            Observation::from_components(1, "A".into(), (2013, 5, 1, 23), values(2.0)).unwrap(),
            Observation::from_components(2, "B".into(), (2013, 6, 1, 0), values(3.0)).unwrap(),
        ];
        let ds = Dataset::from_observations(rows);
        assert_eq!(ds.station_count(), 2);
        assert_eq!(
            ds.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2013, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2014, 1, 2).unwrap()
            ))
        );
        assert!(Dataset::default().date_bounds().is_none());
    }

    #[test]
    fn measure_order_matches_index() {
        for (i, m) in Measure::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
        assert_eq!(Measure::Wspm.to_string(), "WSPM");
    }
}
