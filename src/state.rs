use crate::color::CategoryColors;
use crate::data::filter::{filtered_indices, FilterParams};
use crate::data::loader::LoadOptions;
use crate::data::model::{Diagnostics, FigureDataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<FigureDataset>,

    /// Load-time data-quality report for the current dataset.
    pub diagnostics: Option<Diagnostics>,

    /// Current range filters.
    pub params: FilterParams,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Category → colour for the bar chart.
    pub colors: Option<CategoryColors>,

    /// Coercion/exclusion policy used for loads.
    pub load_options: LoadOptions,

    /// Whether the filtered-data table is shown.
    pub show_filtered_table: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            diagnostics: None,
            params: FilterParams::default(),
            visible_indices: Vec::new(),
            colors: None,
            load_options: LoadOptions::default(),
            show_filtered_table: false,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: seed full-range filters from the
    /// data bounds and cache the visible set.
    ///
    /// A dataset whose price or volume column is entirely null is refused:
    /// no meaningful range can be computed for it, so the load surfaces a
    /// blocking message instead of a dataset.
    pub fn set_dataset(&mut self, dataset: FigureDataset, diagnostics: Diagnostics) {
        let mut dead_fields = Vec::new();
        if diagnostics.all_prices_missing() {
            dead_fields.push("price");
        }
        if diagnostics.all_volumes_missing() {
            dead_fields.push("sales volume");
        }
        if !dead_fields.is_empty() {
            self.status_message = Some(format!(
                "Dataset rejected: no usable {} values",
                dead_fields.join(" or ")
            ));
            return;
        }

        self.params = FilterParams::covering(&dataset);
        self.colors = Some(CategoryColors::new(&dataset.categories));
        self.visible_indices = filtered_indices(&dataset, &self.params);
        self.diagnostics = Some(diagnostics);
        self.dataset = Some(dataset);
        self.show_filtered_table = false;
        self.status_message = None;
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.params);
        }
    }

    /// Restore the full-range filters for the current dataset.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.params = FilterParams::covering(ds);
            self.visible_indices = filtered_indices(ds, &self.params);
        }
    }
}
