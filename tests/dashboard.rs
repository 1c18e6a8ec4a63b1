use std::io::Write;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use air_quality_dashboard::data::category::Category;
use air_quality_dashboard::data::filter::DateRange;
use air_quality_dashboard::data::loader::load_file;
use air_quality_dashboard::report::DashboardReport;
use air_quality_dashboard::state::AppState;

const HEADER: &str = "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

fn write_dataset(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("merged_dataset.csv");
    let mut f = std::fs::File::create(&path).expect("create csv");
    writeln!(f, "{HEADER}").unwrap();
    writeln!(f, "1,2013,3,1,0,10,20,5,30,400,60,1.5,1020,-10,0,N,2.0,A").unwrap();
    writeln!(f, "2,2013,3,1,5,14,25,6,35,500,55,2.5,1019,-9,0,NE,1.5,A").unwrap();
    writeln!(f, "3,2013,3,1,9,60,80,9,50,900,40,3.0,1018,-8,0,E,0.8,B").unwrap();
    writeln!(f, "4,2014,6,15,12,300,350,2,70,2500,20,28.0,1001,20,1.2,S,0.5,B").unwrap();
    path
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn two_stations_on_one_day() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let dataset = load_file(&write_dataset(&dir)).unwrap();

    let report = DashboardReport::build(&dataset, DateRange::new(day(2013, 3, 1), day(2013, 3, 1)));

    assert_eq!(report.total_stations, 2);
    assert_eq!(report.rows_in_range, 3);
    let summary: Vec<(String, Option<f64>, Option<Category>)> = report
        .categories
        .iter()
        .map(|c| (c.station.clone(), c.mean_pm25, c.category))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("A".to_string(), Some(12.0), Some(Category::Low)),
            ("B".to_string(), Some(60.0), Some(Category::Unhealthy)),
        ]
    );

    assert_eq!(report.daily.len(), 1);
    assert!((report.daily[0].mean_pm25 - 28.0).abs() < 1e-9);

    let corr = report.correlation.expect("correlation for non-empty range");
    for i in 0..corr.measures.len() {
        assert_eq!(corr.get(i, i), 1.0);
    }
}

#[test]
fn full_range_spans_years() {
    let dir = TempDir::new().unwrap();
    let dataset = load_file(&write_dataset(&dir)).unwrap();
    let state = AppState::with_dataset(dataset, None);

    let report = &state.report;
    assert_eq!(report.rows_in_range, 4);
    let years: Vec<NaiveDate> = report.yearly.iter().map(|p| p.bucket).collect();
    assert_eq!(years, vec![day(2013, 1, 1), day(2014, 1, 1)]);
    assert_eq!(report.monthly.len(), 2);
    assert_eq!(report.by_station[0].station, "B");
    assert_eq!(report.categories[1].category, Some(Category::VeryUnhealthy));
}

#[test]
fn selection_outside_data_degrades_to_empty() {
    let dir = TempDir::new().unwrap();
    let dataset = load_file(&write_dataset(&dir)).unwrap();
    let mut state = AppState::with_dataset(dataset, None);

    state.set_range(DateRange::new(day(2013, 5, 1), day(2013, 6, 1)));
    assert!(!state.report.has_data());
    assert!(state.report.daily.is_empty());
    assert!(state.report.categories.is_empty());
    assert_eq!(state.report.correlation, None);
    assert_eq!(state.report.total_stations, 2);
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(load_file(&dir.path().join("nope.csv")).is_err());
}
