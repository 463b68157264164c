// src/app/ui/grid.rs
use eframe::egui as eg;

use crate::app::posters::MAX_UPLOADS_PER_FRAME;
use crate::app::types::{MovieCard, PosterSlot, PosterState};
use crate::app::view_state::near_bottom;

pub const CARD_W: f32 = 180.0;
pub const TEXT_H: f32 = 150.0;
pub const H_SPACING: f32 = 14.0;
pub const V_SPACING: f32 = 18.0;

const NO_IMAGE: &str = "Sem imagem";
const OVERVIEW_MAX_CHARS: usize = 140;

fn clip_overview(text: &str) -> String {
    if text.chars().count() <= OVERVIEW_MAX_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(OVERVIEW_MAX_CHARS).collect();
    out.push('…');
    out
}

fn favorite_label(is_favorite: bool) -> &'static str {
    if is_favorite {
        "♥ Favorito"
    } else {
        "♡ Favoritar"
    }
}

fn draw_poster(ui: &eg::Ui, rect: eg::Rect, slot: Option<&PosterSlot>) {
    let painter = ui.painter();
    match slot.and_then(|s| s.tex.as_ref()) {
        Some(tex) => {
            painter.image(
                tex.id(),
                rect,
                eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
                eg::Color32::WHITE,
            );
        }
        None => {
            painter.rect_filled(rect, 6.0, eg::Color32::from_gray(40));
            let loading = slot.is_some_and(|s| {
                matches!(s.state, PosterState::Pending | PosterState::Cached)
            });
            let label = if loading { "…" } else { NO_IMAGE };
            painter.text(
                rect.center(),
                eg::Align2::CENTER_CENTER,
                label,
                eg::FontId::proportional(14.0),
                eg::Color32::from_gray(160),
            );
        }
    }
}

/// Paint one card; returns true when its favorite button was clicked.
fn draw_card(ui: &mut eg::Ui, card: &MovieCard, slot: Option<&PosterSlot>) -> bool {
    let poster_h = CARD_W * 1.5;
    let mut clicked = false;

    ui.allocate_ui_with_layout(
        eg::vec2(CARD_W, poster_h + TEXT_H),
        eg::Layout::top_down(eg::Align::Min),
        |ui| {
            ui.set_min_size(eg::vec2(CARD_W, poster_h + TEXT_H));
            ui.set_max_width(CARD_W);

            let (poster_rect, _) =
                ui.allocate_exact_size(eg::vec2(CARD_W, poster_h), eg::Sense::hover());
            draw_poster(ui, poster_rect, slot);

            let m = &card.movie;
            ui.add(eg::Label::new(eg::RichText::new(m.title_line()).strong()).wrap());
            ui.horizontal(|ui| {
                ui.label(
                    eg::RichText::new(format!("★ {}", m.rating_label()))
                        .color(eg::Color32::from_rgb(240, 190, 60)),
                );
                let fav = eg::Button::new(favorite_label(m.is_favorite)).small();
                clicked = ui.add_enabled(!card.fav_pending, fav).clicked();
            });
            ui.add(
                eg::Label::new(
                    eg::RichText::new(clip_overview(m.overview_or_placeholder()))
                        .size(12.0)
                        .weak(),
                )
                .wrap(),
            );
        },
    );
    clicked
}

impl crate::app::NevifyApp {
    /// Upload a few cached posters per frame so big pages never stall a frame.
    fn upload_some_posters(&mut self, ctx: &eg::Context) {
        let keys: Vec<String> = self
            .list
            .cards()
            .iter()
            .filter_map(|c| c.poster_key.as_ref())
            .filter(|k| {
                self.posters
                    .get(*k)
                    .is_some_and(|s| s.state == PosterState::Cached && s.tex.is_none())
            })
            .take(MAX_UPLOADS_PER_FRAME)
            .cloned()
            .collect();
        for key in keys {
            self.try_lazy_upload(ctx, &key);
        }
    }

    pub(crate) fn ui_render_grid(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        self.upload_some_posters(ctx);

        if self.list.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                if self.view.is_loading() {
                    ui.add(eg::Spinner::new().size(20.0));
                } else {
                    ui.label(
                        eg::RichText::new(self.view.empty_message()).size(16.0),
                    );
                }
            });
            return;
        }

        let mut toggled: Option<i64> = None;
        let mut area = eg::ScrollArea::vertical()
            .id_source("movie_grid")
            .auto_shrink([false; 2]);
        if std::mem::take(&mut self.scroll_to_top) {
            area = area.vertical_scroll_offset(0.0);
        }

        let out = area.show(ui, |ui| {
            let avail = ui.available_width();
            let cols = ((avail + H_SPACING) / (CARD_W + H_SPACING))
                .floor()
                .max(1.0) as usize;

            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing = eg::vec2(H_SPACING, V_SPACING);
                for (i, card) in self.list.cards().iter().enumerate() {
                    if i > 0 && i % cols == 0 {
                        ui.end_row();
                    }
                    let slot = card.poster_key.as_ref().and_then(|k| self.posters.get(k));
                    if draw_card(ui, card, slot) {
                        toggled = Some(card.movie.id);
                    }
                }
            });

            if self.view.is_loading() {
                ui.add_space(12.0);
                ui.vertical_centered(|ui| ui.add(eg::Spinner::new().size(16.0)));
            }
            ui.add_space(24.0);
        });

        if let Some(id) = toggled {
            self.toggle_favorite(id);
        }

        let viewport_h = out.inner_rect.height();
        if near_bottom(out.state.offset.y, viewport_h, out.content_size.y) {
            self.load_more();
        }
    }
}
