use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::FigureRecord;
use crate::data::rank::{top_by_metric, Metric, TOP_N};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top-10 ranking tables
// ---------------------------------------------------------------------------

/// Render one "Top 10 by …" table per ranking metric.
pub fn top_tables(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    if state.visible_indices.is_empty() {
        return;
    }

    for metric in Metric::ALL {
        let top = top_by_metric(dataset, &state.visible_indices, metric, TOP_N);
        if top.is_empty() {
            continue;
        }

        ui.add_space(12.0);
        ui.heading(format!("Top {} Figures by {}", TOP_N, metric.label()));

        ui.push_id(metric.label(), |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::remainder().at_least(160.0))
                .column(Column::auto().at_least(120.0))
                .column(Column::auto().at_least(100.0))
                .header(18.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Figure");
                    });
                    header.col(|ui| {
                        ui.strong("Category");
                    });
                    header.col(|ui| {
                        ui.strong(metric.label());
                    });
                })
                .body(|mut body| {
                    for &idx in &top {
                        let rec = &dataset.records[idx];
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(&rec.name);
                            });
                            row.col(|ui| {
                                ui.label(&rec.category);
                            });
                            row.col(|ui| {
                                let text = metric
                                    .value_of(rec)
                                    .map(|v| metric.format(v))
                                    .unwrap_or_else(|| "n/a".to_string());
                                ui.label(text);
                            });
                        });
                    }
                });
        });
    }
}

// ---------------------------------------------------------------------------
// Full filtered-data table (opt-in)
// ---------------------------------------------------------------------------

/// Checkbox plus the complete filtered record table.
pub fn filtered_table(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() || state.visible_indices.is_empty() {
        return;
    }

    ui.add_space(12.0);
    ui.checkbox(&mut state.show_filtered_table, "Show filtered data");
    if !state.show_filtered_table {
        return;
    }

    let Some(dataset) = &state.dataset else {
        return;
    };

    ui.push_id("filtered_data", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::remainder().at_least(160.0))
            .column(Column::auto().at_least(110.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::auto().at_least(90.0))
            .column(Column::auto().at_least(110.0))
            .header(18.0, |mut header| {
                for title in [
                    "Figure",
                    "Category",
                    "Price",
                    "Volume",
                    "Release Date",
                    "Market Cap",
                ] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for &idx in &state.visible_indices {
                    let rec = &dataset.records[idx];
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&rec.name);
                        });
                        row.col(|ui| {
                            ui.label(&rec.category);
                        });
                        row.col(|ui| {
                            ui.label(format_price(rec));
                        });
                        row.col(|ui| {
                            ui.label(format_volume(rec));
                        });
                        row.col(|ui| {
                            ui.label(format_date(rec));
                        });
                        row.col(|ui| {
                            ui.label(format_market_cap(rec));
                        });
                    });
                }
            });
    });
}

fn format_price(rec: &FigureRecord) -> String {
    rec.price
        .map(|p| format!("${p:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn format_volume(rec: &FigureRecord) -> String {
    rec.volume
        .map(|v| v.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn format_date(rec: &FigureRecord) -> String {
    rec.release_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn format_market_cap(rec: &FigureRecord) -> String {
    rec.market_cap
        .map(|m| format!("${m:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}
