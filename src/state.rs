use std::path::Path;

use chrono::NaiveDate;

use crate::data::filter::DateRange;
use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::report::DashboardReport;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Current date-range selection, always clamped to the dataset.
    pub range: Option<DateRange>,

    /// Aggregates for `range`; replaced whenever the range changes.
    pub report: DashboardReport,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn with_dataset(dataset: Dataset, range: Option<DateRange>) -> Self {
        let mut state = AppState::default();
        state.set_dataset(dataset);
        if let Some(r) = range {
            state.set_range(r);
        }
        state
    }

    /// Ingest a newly loaded dataset and select its full range.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.range = DateRange::full(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    /// Load `path` and switch to it. On failure the current dataset stays
    /// and the error becomes the status message.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} observations from {} stations ({})",
                    dataset.len(),
                    dataset.station_count(),
                    path.display()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Change the selection; both ends are clamped to the dataset bounds.
    pub fn set_range(&mut self, range: DateRange) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let clamped = range.clamp_to(ds);
        if self.range != Some(clamped) {
            self.range = Some(clamped);
            self.recompute();
        }
    }

    pub fn set_start(&mut self, start: NaiveDate) {
        if let Some(r) = self.range {
            self.set_range(DateRange::new(start, r.end));
        }
    }

    pub fn set_end(&mut self, end: NaiveDate) {
        if let Some(r) = self.range {
            self.set_range(DateRange::new(r.start, end));
        }
    }

    /// Back to the whole dataset.
    pub fn reset_range(&mut self) {
        if let Some(full) = self.dataset.as_ref().and_then(DateRange::full) {
            self.set_range(full);
        }
    }

    /// Rebuild the report from the dataset and current range.
    fn recompute(&mut self) {
        self.report = match (&self.dataset, self.range) {
            (Some(ds), Some(range)) => DashboardReport::build(ds, range),
            _ => DashboardReport::default(),
        };
    }
}
