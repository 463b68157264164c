// src/app/ui/mod.rs
pub mod grid;
pub mod topbar;

use eframe::egui as eg;

use crate::app::types::ListType;

pub const WELCOME_SUBTITLE: &str = "Milhões de Filmes novos para Descobrir. Explore já.";

impl crate::app::NevifyApp {
    pub(crate) fn ui_render_dashboard(&mut self, ctx: &eg::Context) {
        self.ui_render_sidebar(ctx);

        eg::TopBottomPanel::top("topbar")
            .exact_height(52.0)
            .show(ctx, |ui| self.ui_render_topbar(ui));

        eg::CentralPanel::default().show(ctx, |ui| {
            let current = self.view.current_type();
            if current == ListType::Settings {
                self.ui_render_settings(ui, ctx);
            } else if self.view.shows_welcome() {
                ui_render_welcome(ui);
            } else {
                self.ui_render_grid(ui, ctx);
            }
        });
    }

    fn ui_render_sidebar(&mut self, ctx: &eg::Context) {
        let mut picked: Option<ListType> = None;
        let mut logout = false;

        eg::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(200.0)
            .show(ctx, |ui| {
                ui.add_space(16.0);
                ui.heading(eg::RichText::new("Nevify").strong());
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.label(eg::RichText::new("Olá,").weak());
                    ui.label(eg::RichText::new(&self.display_name).strong());
                });
                ui.separator();

                let current = self.view.current_type();
                for ty in ListType::NAV {
                    let resp = ui.add_sized(
                        [ui.available_width(), 28.0],
                        eg::SelectableLabel::new(current == ty, ty.nav_label()),
                    );
                    if resp.clicked() {
                        picked = Some(ty);
                    }
                }

                ui.with_layout(eg::Layout::bottom_up(eg::Align::Min), |ui| {
                    ui.add_space(12.0);
                    if ui.button("Sair").clicked() {
                        logout = true;
                    }
                });
            });

        if logout {
            self.logout();
        } else if let Some(ty) = picked {
            self.go_to(ty);
        }
    }
}

fn ui_render_welcome(ui: &mut eg::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.3);
        ui.heading(
            eg::RichText::new(ListType::Home.page_title(""))
                .size(40.0)
                .strong(),
        );
        ui.add_space(8.0);
        ui.label(eg::RichText::new(WELCOME_SUBTITLE).size(18.0));
    });
}
