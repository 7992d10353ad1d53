use std::fmt::Display;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use superstore_dashboard::data::filter::{Choice, Selection, ALL};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let options = match &state.table {
        Some(table) => table.options.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Year");
            changed |= choice_combo(ui, "year_filter", &mut state.filters.year, &options.years);
            ui.add_space(4.0);

            ui.strong("Month");
            changed |= choice_combo(ui, "month_filter", &mut state.filters.month, &options.months);
            ui.separator();

            changed |= multiselect(ui, "Region", &mut state.filters.regions, &options.regions);
            changed |= multiselect(
                ui,
                "Category",
                &mut state.filters.categories,
                &options.categories,
            );
            changed |= multiselect(ui, "Segment", &mut state.filters.segments, &options.segments);
            ui.separator();

            if ui
                .add_enabled(!state.filters.is_unfiltered(), egui::Button::new("Reset filters"))
                .clicked()
            {
                state.reset_filters();
            }
        });

    if changed {
        state.refilter();
    }
}

/// Single-select combo box with a leading "All" entry. Returns true on change.
fn choice_combo<T>(ui: &mut Ui, id: &str, current: &mut Choice<T>, options: &[T]) -> bool
where
    T: Copy + PartialEq + Display,
{
    let selected_text = match current {
        Choice::All => ALL.to_string(),
        Choice::Only(v) => v.to_string(),
    };
    let before = current.clone();

    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(current, Choice::All, ALL);
            for v in options {
                ui.selectable_value(current, Choice::Only(*v), v.to_string());
            }
        });

    *current != before
}

/// Checklist with an "All" entry; ticking "All" overrides everything else.
/// Returns true on change.
fn multiselect<T>(ui: &mut Ui, title: &str, selection: &mut Selection<T>, options: &[T]) -> bool
where
    T: Ord + Clone + Display,
{
    let n_selected = match selection {
        Selection::All => options.len(),
        Selection::AnyOf(set) => set.len(),
    };
    let header_text = format!("{title}  ({n_selected}/{})", options.len());
    let mut changed = false;

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            let mut all = selection.is_all();
            if ui.checkbox(&mut all, ALL).changed() {
                if all {
                    selection.select_all();
                } else {
                    selection.clear();
                }
                changed = true;
            }

            for val in options {
                let mut checked = !selection.is_all() && selection.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    if selection.is_all() {
                        // Leaving "All" starts a fresh selection from this value.
                        selection.clear();
                    }
                    selection.toggle(val, options);
                    changed = true;
                }
            }
        });

    changed
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
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} records loaded, {} visible",
                table.len(),
                state.visible_rows()
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
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "parquet", "pq", "json"])
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match state.load(&path) {
            Ok(table) => state.set_table(table),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
