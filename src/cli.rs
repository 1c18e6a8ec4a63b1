use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use crate::data::filter::DateRange;
use crate::data::model::Dataset;

/// Air quality dashboard for merged station observations.
#[derive(Parser, Debug)]
#[command(name = "air-quality-dashboard", version, about)]
pub struct Args {
    /// Merged observation file (.csv, .json or .parquet)
    #[arg(env = "AIR_QUALITY_DATA")]
    pub input: Option<PathBuf>,

    /// First day of the initial range (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the initial range, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Print the report for the selected range and exit instead of opening a window
    #[arg(long, value_enum, requires = "input")]
    pub report: Option<ReportFormat>,
}

impl Args {
    /// The dataset's full range with `--start` / `--end` substituted where given.
    /// A start after the end is kept as is and selects nothing.
    pub fn initial_range(&self, dataset: &Dataset) -> Option<DateRange> {
        DateRange::full(dataset).map(|full| {
            DateRange::new(self.start.unwrap_or(full.start), self.end.unwrap_or(full.end))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Measure, Observation};
    use crate::state::AppState;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 1, d).unwrap()
    }

    fn dataset() -> Dataset {
        let rows = (1..=4)
            .map(|d| {
                let mut values = [None; Measure::COUNT];
                values[Measure::Pm25.index()] = Some(d as f64);
                Observation::from_components(0, "Dongsi".into(), (2014, 1, d, 12), values).unwrap()
            })
            .collect();
        Dataset::from_observations(rows)
    }

    fn parse(extra: &[&str]) -> Args {
        let argv = ["air-quality-dashboard", "merged.csv"]
            .into_iter()
            .chain(extra.iter().copied());
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn parses_report_mode() {
        let args = Args::try_parse_from([
            "air-quality-dashboard",
            "merged.csv",
            "--start",
            "2014-01-01",
            "--end",
            "2014-12-31",
            "--report",
            "json",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("merged.csv")));
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2014, 1, 1));
        assert_eq!(args.report, Some(ReportFormat::Json));
    }

    #[test]
    fn rejects_bad_dates() {
        let res = Args::try_parse_from(["air-quality-dashboard", "x.csv", "--start", "2014-13-01"]);
        assert!(res.is_err());
    }

    #[test]
    fn initial_range_defaults_to_full_dataset() {
        let ds = dataset();
        assert_eq!(parse(&[]).initial_range(&ds), Some(DateRange::new(day(1), day(4))));
    }

    #[test]
    fn start_and_end_override_each_side() {
        let ds = dataset();
        let args = parse(&["--start", "2014-01-02"]);
        assert_eq!(args.initial_range(&ds), Some(DateRange::new(day(2), day(4))));

        let args = parse(&["--end", "2014-01-03"]);
        assert_eq!(args.initial_range(&ds), Some(DateRange::new(day(1), day(3))));

        let args = parse(&["--start", "2014-01-02", "--end", "2014-01-03"]);
        let state = AppState::with_dataset(ds.clone(), args.initial_range(&ds));
        assert_eq!(state.report.rows_in_range, 2);
    }

    #[test]
    fn start_after_end_gives_empty_report() {
        let ds = dataset();
        let args = parse(&["--start", "2014-01-04", "--end", "2014-01-02"]);
        let range = args.initial_range(&ds);
        assert!(range.unwrap().is_empty());

        let state = AppState::with_dataset(ds, range);
        assert!(!state.report.has_data());
        assert!(state.report.render_text().contains("No data in the selected range."));
    }

    #[test]
    fn empty_dataset_has_no_initial_range() {
        let ds = Dataset::from_observations(Vec::new());
        assert_eq!(parse(&["--start", "2014-01-02"]).initial_range(&ds), None);
    }
}
