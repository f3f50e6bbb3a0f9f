use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::data::filter::category_counts;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Category bar chart (top of the central panel)
// ---------------------------------------------------------------------------

/// Render the figures-per-category bar chart for the filtered set.
pub fn category_chart(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view figure sales  (File → Open…)");
            });
            return;
        }
    };

    ui.heading("Figures by Category");

    if state.visible_indices.is_empty() {
        // A normal outcome, not an error.
        ui.label("No figures match the current filters.");
        return;
    }

    let counts = category_counts(dataset, &state.visible_indices);
    let mut ordered: Vec<(String, usize)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Plot::new("category_chart")
        .legend(Legend::default())
        .y_axis_label("Figures")
        .show_x(false)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .height(260.0)
        .show(ui, |plot_ui| {
            for (i, (category, count)) in ordered.iter().enumerate() {
                let color = state
                    .colors
                    .as_ref()
                    .map(|c| c.color_for(category))
                    .unwrap_or(eframe::egui::Color32::LIGHT_BLUE);

                let bar = Bar::new(i as f64, *count as f64)
                    .width(0.7)
                    .name(category);
                plot_ui.bar_chart(BarChart::new(vec![bar]).color(color).name(category));
            }
        });
}
