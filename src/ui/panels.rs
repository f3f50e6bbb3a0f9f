use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – range filters
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Copy the bounds out so the dataset borrow does not outlive the
    // parameter edits below.
    let year_bounds = dataset.year_bounds();
    let price_bounds = dataset.price_bounds();
    let volume_bounds = dataset.volume_bounds();
    let advisories = state
        .diagnostics
        .as_ref()
        .map(|d| d.advisories())
        .unwrap_or_default();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // A dimension whose values are all null gets no control: no
            // meaningful range can be derived for it.
            if let Some((lo, hi)) = year_bounds {
                ui.strong("Release year");
                range_row(ui, |ui: &mut Ui| {
                    ui.add(DragValue::new(&mut state.params.year_range.0).range(lo..=hi));
                    ui.label("to");
                    ui.add(DragValue::new(&mut state.params.year_range.1).range(lo..=hi));
                });
                ui.checkbox(
                    &mut state.params.include_unknown_years,
                    "Include unknown release years",
                );
                ui.separator();
            }

            if let Some((lo, hi)) = price_bounds {
                ui.strong("Avg. sell price");
                range_row(ui, |ui: &mut Ui| {
                    ui.add(
                        DragValue::new(&mut state.params.price_range.0)
                            .range(lo..=hi)
                            .speed(0.1)
                            .prefix("$"),
                    );
                    ui.label("to");
                    ui.add(
                        DragValue::new(&mut state.params.price_range.1)
                            .range(lo..=hi)
                            .speed(0.1)
                            .prefix("$"),
                    );
                });
                ui.separator();
            }

            if let Some((lo, hi)) = volume_bounds {
                ui.strong("Sales volume");
                range_row(ui, |ui: &mut Ui| {
                    ui.add(DragValue::new(&mut state.params.volume_range.0).range(lo..=hi));
                    ui.label("to");
                    ui.add(DragValue::new(&mut state.params.volume_range.1).range(lo..=hi));
                });
                ui.separator();
            }

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }

            if !advisories.is_empty() {
                ui.add_space(8.0);
                ui.strong("Data quality");
                for line in &advisories {
                    ui.label(RichText::new(line).color(Color32::YELLOW).small());
                }
            }
        });

    // Recompute visible indices after any control changes.
    state.refilter();
}

fn range_row(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui)) {
    ui.horizontal(|ui: &mut Ui| add_contents(ui));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            ui.checkbox(
                &mut state.load_options.strict_numeric_coercion,
                "Strict numeric parsing",
            )
            .on_hover_text("Reject currency symbols and thousands separators");

            let mut drop_low = state.load_options.exclude_low_volume_threshold.is_some();
            if ui
                .checkbox(&mut drop_low, "Drop single-sale records")
                .on_hover_text("Applies on the next load")
                .changed()
            {
                state.load_options.exclude_low_volume_threshold =
                    drop_low.then_some(1);
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} figures loaded, {} match filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open figure sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path, &state.load_options) {
            Ok((dataset, diagnostics)) => {
                log::info!(
                    "Loaded {} records ({} dropped by baseline exclusion) from {}",
                    dataset.len(),
                    diagnostics.dropped_low_volume,
                    path.display()
                );
                state.set_dataset(dataset, diagnostics);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
