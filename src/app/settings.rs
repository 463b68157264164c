// src/app/settings.rs
//! Account settings panel.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use eframe::egui as eg;
use tracing::{info, warn};

use crate::app::api::{ApiClient, ApiError, CONNECTION_ERROR};
use crate::app::types::{AccountAction, AccountMsg};
use crate::app::validation::{validate_new_username, validate_password};

pub const ACCOUNT_DELETED: &str = "Conta excluída com sucesso!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountRequest {
    ChangeUsername(String),
    ChangePassword(String),
    ClearFavorites,
    DeleteAccount,
}

impl AccountRequest {
    pub const fn action(&self) -> AccountAction {
        match self {
            Self::ChangeUsername(_) => AccountAction::ChangeUsername,
            Self::ChangePassword(_) => AccountAction::ChangePassword,
            Self::ClearFavorites => AccountAction::ClearFavorites,
            Self::DeleteAccount => AccountAction::DeleteAccount,
        }
    }

    fn run(&self, api: &ApiClient) -> Result<(), ApiError> {
        match self {
            Self::ChangeUsername(name) => api.change_username(name),
            Self::ChangePassword(pw) => api.change_password(pw),
            Self::ClearFavorites => api.clear_favorites(),
            Self::DeleteAccount => api.delete_account(),
        }
    }
}

impl AccountAction {
    pub const fn success_message(self) -> &'static str {
        match self {
            Self::ChangeUsername => "Username alterado com sucesso! Relogue para atualizar",
            Self::ChangePassword => "Senha alterada com sucesso!",
            Self::ClearFavorites => "Favoritos limpos com sucesso!",
            Self::DeleteAccount => ACCOUNT_DELETED,
        }
    }

    const fn fallback_error(self) -> &'static str {
        match self {
            Self::ChangeUsername => "Erro ao alterar username.",
            Self::ChangePassword => "Erro ao alterar senha",
            Self::ClearFavorites => "Erro ao limpar favoritos.",
            Self::DeleteAccount => "Erro ao excluir conta.",
        }
    }

    /// Destructive actions ask before running.
    pub const fn confirmation(self) -> Option<&'static str> {
        match self {
            Self::ClearFavorites => Some("Deseja realmente limpar todos os favoritos?"),
            Self::DeleteAccount => {
                Some("Tem certeza que deseja excluir sua conta? Esta ação é irreversível!")
            }
            _ => None,
        }
    }
}

/// Text shown for a failed account action. Password failures land on the
/// password field itself; everything else goes to the shared message line.
pub fn failure_message(action: AccountAction, err: &ApiError) -> String {
    match (action, err.backend_message()) {
        (AccountAction::ChangePassword, _) if err.is_transport() => CONNECTION_ERROR.to_string(),
        (AccountAction::ChangePassword, _) => err.user_message(action.fallback_error()),
        (_, Some(m)) => format!("Erro: {m}"),
        (_, None) => action.fallback_error().to_string(),
    }
}

fn spawn_account_action(api: Arc<ApiClient>, req: AccountRequest, tx: Sender<AccountMsg>) {
    std::thread::spawn(move || {
        let action = req.action();
        let result = req.run(&api).map_err(|e| {
            warn!("account action {action:?} failed: {e}");
            failure_message(action, &e)
        });
        let _ = tx.send(AccountMsg { action, result });
    });
}

#[derive(Default)]
pub struct SettingsState {
    pub new_username: String,
    pub new_password: String,
    pub show_password: bool,
    pub password_error: Option<String>,
    /// Shared result line: (text, ok).
    pub message: Option<(String, bool)>,
    pub confirm: Option<AccountAction>,
    pub busy: Option<AccountAction>,
}

impl SettingsState {
    /// Validate the form for `action`. Destructive actions only open the
    /// confirmation prompt here; `confirm_accepted` releases them.
    pub fn begin(&mut self, action: AccountAction) -> Option<AccountRequest> {
        if self.busy.is_some() {
            return None;
        }
        match action {
            AccountAction::ChangeUsername => {
                let name = self.new_username.trim().to_string();
                if let Err(msg) = validate_new_username(&name) {
                    self.message = Some((msg, false));
                    return None;
                }
                self.start(AccountRequest::ChangeUsername(name))
            }
            AccountAction::ChangePassword => {
                self.password_error = None;
                let pw = self.new_password.trim().to_string();
                if let Err(msg) = validate_password(&pw) {
                    self.password_error = Some(msg);
                    return None;
                }
                self.start(AccountRequest::ChangePassword(pw))
            }
            AccountAction::ClearFavorites | AccountAction::DeleteAccount => {
                self.confirm = Some(action);
                None
            }
        }
    }

    pub fn confirm_accepted(&mut self) -> Option<AccountRequest> {
        match self.confirm.take()? {
            AccountAction::ClearFavorites => self.start(AccountRequest::ClearFavorites),
            AccountAction::DeleteAccount => self.start(AccountRequest::DeleteAccount),
            _ => None,
        }
    }

    fn start(&mut self, req: AccountRequest) -> Option<AccountRequest> {
        self.busy = Some(req.action());
        Some(req)
    }

    /// Apply a finished action. Returns true when the account is gone.
    pub fn apply(&mut self, msg: AccountMsg) -> bool {
        self.busy = None;
        match (msg.action, msg.result) {
            (AccountAction::DeleteAccount, Ok(())) => return true,
            (AccountAction::ChangePassword, Ok(())) => {
                self.new_password.clear();
                self.message = Some((msg.action.success_message().to_string(), true));
            }
            (AccountAction::ChangePassword, Err(e)) => self.password_error = Some(e),
            (action, Ok(())) => {
                self.message = Some((action.success_message().to_string(), true));
            }
            (_, Err(e)) => self.message = Some((e, false)),
        }
        false
    }
}

impl crate::app::NevifyApp {
    fn dispatch_account(&mut self, req: Option<AccountRequest>) {
        let Some(req) = req else {
            return;
        };
        let Some(api) = self.api.clone() else {
            self.settings.busy = None;
            self.settings.message = Some((CONNECTION_ERROR.to_string(), false));
            return;
        };
        info!("account action {:?}", req.action());
        spawn_account_action(api, req, self.account_tx.clone());
    }

    pub(crate) fn poll_account(&mut self) {
        while let Ok(msg) = self.account_rx.try_recv() {
            if self.settings.apply(msg) {
                self.toasts.success(ACCOUNT_DELETED);
                self.logout();
                return;
            }
        }
    }

    pub(crate) fn ui_render_settings(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        let busy = self.settings.busy.is_some();
        let mut clicked: Option<AccountAction> = None;

        ui.add_space(8.0);
        eg::Grid::new("settings_grid")
            .num_columns(2)
            .spacing([12.0, 14.0])
            .show(ui, |ui| {
                ui.label("Novo username");
                ui.horizontal(|ui| {
                    ui.add(
                        eg::TextEdit::singleline(&mut self.settings.new_username)
                            .desired_width(220.0),
                    );
                    if ui.add_enabled(!busy, eg::Button::new("Salvar")).clicked() {
                        clicked = Some(AccountAction::ChangeUsername);
                    }
                });
                ui.end_row();

                ui.label("Nova senha");
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        let resp = ui.add(
                            eg::TextEdit::singleline(&mut self.settings.new_password)
                                .password(!self.settings.show_password)
                                .desired_width(220.0),
                        );
                        if resp.changed() {
                            self.settings.password_error = None;
                        }
                        let icon = if self.settings.show_password { "🙈" } else { "👁" };
                        if ui.small_button(icon).clicked() {
                            self.settings.show_password = !self.settings.show_password;
                        }
                        if ui.add_enabled(!busy, eg::Button::new("Salvar")).clicked() {
                            clicked = Some(AccountAction::ChangePassword);
                        }
                    });
                    if let Some(err) = &self.settings.password_error {
                        ui.colored_label(eg::Color32::from_rgb(220, 80, 80), err.as_str());
                    }
                });
                ui.end_row();
            });

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if ui.add_enabled(!busy, eg::Button::new("Limpar favoritos")).clicked() {
                clicked = Some(AccountAction::ClearFavorites);
            }
            let danger = eg::Button::new(
                eg::RichText::new("Excluir conta").color(eg::Color32::WHITE),
            )
            .fill(eg::Color32::from_rgb(170, 40, 40));
            if ui.add_enabled(!busy, danger).clicked() {
                clicked = Some(AccountAction::DeleteAccount);
            }
            if busy {
                ui.add(eg::Spinner::new().size(14.0));
            }
        });

        if let Some((text, ok)) = &self.settings.message {
            ui.add_space(10.0);
            let color = if *ok {
                eg::Color32::from_rgb(60, 170, 90)
            } else {
                eg::Color32::from_rgb(220, 80, 80)
            };
            ui.colored_label(color, text.as_str());
        }

        if let Some(action) = clicked {
            let req = self.settings.begin(action);
            self.dispatch_account(req);
        }

        self.ui_render_confirm_window(ctx);
    }

    fn ui_render_confirm_window(&mut self, ctx: &eg::Context) {
        let Some(prompt) = self.settings.confirm.and_then(AccountAction::confirmation) else {
            return;
        };
        let mut accepted = false;
        let mut cancelled = false;
        eg::Window::new("Confirmação")
            .collapsible(false)
            .resizable(false)
            .anchor(eg::Align2::CENTER_CENTER, eg::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(prompt);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    accepted = ui.button("Confirmar").clicked();
                    cancelled = ui.button("Cancelar").clicked();
                });
            });
        if accepted {
            let req = self.settings.confirm_accepted();
            self.dispatch_account(req);
        } else if cancelled {
            self.settings.confirm = None;
        }
    }
}
