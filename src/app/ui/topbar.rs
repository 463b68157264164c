// src/app/ui/topbar.rs
use std::time::Instant;

use eframe::egui as eg;

use crate::app::types::{ListType, SortOrder};

impl crate::app::NevifyApp {
    // ---------- TOP BAR ----------
    pub(crate) fn ui_render_topbar(&mut self, ui: &mut eg::Ui) {
        let current = self.view.current_type();
        let title = self.view.page_title();

        ui.horizontal_centered(|ui| {
            ui.heading(title);

            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                if current == ListType::Favorites {
                    let mut pick = self.view.sort();
                    eg::ComboBox::from_id_source("favorites_sort_combo")
                        .selected_text(pick.label())
                        .show_ui(ui, |ui| {
                            for s in [SortOrder::Recent, SortOrder::Rated] {
                                ui.selectable_value(&mut pick, s, s.label());
                            }
                        });
                    if pick != self.view.sort() {
                        self.change_sort(pick);
                    }
                    ui.separator();
                }

                // search is hidden on the settings page
                if current.is_list() {
                    let resp = ui.add(
                        eg::TextEdit::singleline(&mut self.search_text)
                            .hint_text("Buscar filmes…")
                            .desired_width(240.0),
                    );
                    if resp.changed() {
                        self.on_search_edited(Instant::now());
                    }
                }
            });
        });
    }
}
