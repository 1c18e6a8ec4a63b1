use chrono::NaiveDate;
use serde::Serialize;

use super::model::{Dataset, Observation};

// ---------------------------------------------------------------------------
// Filter predicate: inclusive calendar-date range
// ---------------------------------------------------------------------------

/// Inclusive date range selected in the side panel.
///
/// Both ends are whole days: an observation at 23:00 on `end` is inside.
/// `start > end` is allowed and selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// The range covering the whole dataset (the default selection).
    pub fn full(dataset: &Dataset) -> Option<Self> {
        dataset
            .date_bounds()
            .map(|(start, end)| DateRange { start, end })
    }

    /// Pull both ends inside the dataset's first and last day.
    pub fn clamp_to(self, dataset: &Dataset) -> Self {
        match dataset.date_bounds() {
            Some((lo, hi)) => DateRange {
                start: self.start.clamp(lo, hi),
                end: self.end.clamp(lo, hi),
            },
            None => self,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Return the observations whose calendar date falls inside `range`,
/// preserving dataset order.
pub fn filter_by_date<'a>(dataset: &'a Dataset, range: &DateRange) -> Vec<&'a Observation> {
    if range.is_empty() {
        return Vec::new();
    }
    dataset
        .observations
        .iter()
        .filter(|obs| range.contains(obs.date()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Measure;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        let rows = [(2013, 3, 1, 0), (2013, 3, 1, 23), (2013, 3, 2, 12), (2013, 3, 5, 6)]
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                Observation::from_components(i, "A".into(), t, [None; Measure::COUNT]).unwrap()
            })
            .collect();
        Dataset::from_observations(rows)
    }

    #[test]
    fn end_day_is_inclusive() {
        let ds = dataset();
        let rows = filter_by_date(&ds, &DateRange::new(day(2013, 3, 1), day(2013, 3, 1)));
        assert_eq!(rows.len(), 2);
        let rows = filter_by_date(&ds, &DateRange::new(day(2013, 3, 2), day(2013, 3, 5)));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn inverted_or_disjoint_range_is_empty() {
        let ds = dataset();
        assert!(filter_by_date(&ds, &DateRange::new(day(2013, 3, 5), day(2013, 3, 1))).is_empty());
        assert!(filter_by_date(&ds, &DateRange::new(day(2013, 3, 3), day(2013, 3, 4))).is_empty());
    }

    #[test]
    fn clamps_to_dataset_bounds() {
        let ds = dataset();
        let wide = DateRange::new(day(2000, 1, 1), day(2030, 1, 1)).clamp_to(&ds);
        assert_eq!(wide, DateRange::full(&ds).unwrap());
        assert_eq!(wide, DateRange::new(day(2013, 3, 1), day(2013, 3, 5)));
        assert_eq!(filter_by_date(&ds, &wide).len(), ds.len());
    }
}
