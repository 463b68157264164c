// src/app/toast.rs
use std::time::{Duration, Instant};

use eframe::egui as eg;

pub const TOAST_TTL: Duration = Duration::from_secs(3);
const MAX_VISIBLE: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    expires: Instant,
}

#[derive(Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn push(&mut self, kind: ToastKind, text: impl Into<String>, now: Instant) {
        self.items.push(Toast {
            text: text.into(),
            kind,
            expires: now + TOAST_TTL,
        });
        if self.items.len() > MAX_VISIBLE {
            let extra = self.items.len() - MAX_VISIBLE;
            self.items.drain(..extra);
        }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Success, text, Instant::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Error, text, Instant::now());
    }

    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|t| t.expires > now);
    }

    /// Earliest expiry, so the frame loop can schedule a repaint for it.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.items.iter().map(|t| t.expires).min()
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn show(&self, ctx: &eg::Context) {
        if self.items.is_empty() {
            return;
        }
        eg::Area::new(eg::Id::new("toasts"))
            .anchor(eg::Align2::RIGHT_BOTTOM, eg::vec2(-16.0, -16.0))
            .order(eg::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                for t in &self.items {
                    let fill = match t.kind {
                        ToastKind::Success => eg::Color32::from_rgb(34, 120, 60),
                        ToastKind::Error => eg::Color32::from_rgb(160, 40, 40),
                    };
                    eg::Frame::none()
                        .fill(fill)
                        .rounding(eg::Rounding::same(6.0))
                        .inner_margin(eg::Margin::symmetric(12.0, 8.0))
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.label(eg::RichText::new(&t.text).color(eg::Color32::WHITE));
                        });
                    ui.add_space(6.0);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_ttl() {
        let t0 = Instant::now();
        let mut toasts = Toasts::default();
        toasts.push(ToastKind::Success, "Login bem-sucedido!", t0);
        toasts.push(ToastKind::Error, "falhou", t0 + Duration::from_secs(1));
        assert_eq!(toasts.next_deadline(), Some(t0 + TOAST_TTL));

        toasts.prune(t0 + Duration::from_millis(2999));
        assert_eq!(toasts.items().len(), 2);
        toasts.prune(t0 + TOAST_TTL);
        assert_eq!(toasts.items().len(), 1);
        assert_eq!(toasts.items()[0].kind, ToastKind::Error);
        toasts.prune(t0 + Duration::from_secs(4));
        assert!(toasts.is_empty());
        assert_eq!(toasts.next_deadline(), None);
    }

    #[test]
    fn oldest_toasts_drop_past_the_cap() {
        let t0 = Instant::now();
        let mut toasts = Toasts::default();
        for i in 0..6 {
            toasts.push(ToastKind::Success, format!("t{i}"), t0);
        }
        assert_eq!(toasts.items().len(), MAX_VISIBLE);
        assert_eq!(toasts.items()[0].text, "t2");
    }
}
