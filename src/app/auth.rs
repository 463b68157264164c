// src/app/auth.rs
//! Entry screen: login form and the registration window.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui as eg;
use tracing::{info, warn};

use crate::app::api::{ApiClient, ApiError, Registration, CONNECTION_ERROR};
use crate::app::types::AuthMsg;
use crate::app::validation::{
    validate_login, validate_registration, RegisterErrors, RegisterInput,
};

pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_secs(1);

pub const LOGIN_OK: &str = "Login bem-sucedido!";
pub const REGISTER_OK: &str = "Usuário registrado com sucesso! Faça login.";
const LOGIN_REJECTED: &str = "Usuário ou senha incorretos!";
const REGISTER_REJECTED: &str = "Erro ao registrar usuário";

#[derive(Default)]
pub struct EntryState {
    pub username: String,
    pub password: String,
    pub show_password: bool,
    pub register_open: bool,
    pub register: RegisterInput,
    pub register_errors: RegisterErrors,
    pub show_register_password: bool,
    pub busy: bool,
    redirect: Option<(String, Instant)>,
}

impl EntryState {
    /// Hold the fresh token until the redirect delay has passed.
    pub fn schedule_redirect(&mut self, token: String, now: Instant) {
        self.redirect = Some((token, now + LOGIN_REDIRECT_DELAY));
    }

    pub fn redirect_deadline(&self) -> Option<Instant> {
        self.redirect.as_ref().map(|(_, due)| *due)
    }

    pub fn take_due_redirect(&mut self, now: Instant) -> Option<String> {
        match &self.redirect {
            Some((_, due)) if now >= *due => self.redirect.take().map(|(t, _)| t),
            _ => None,
        }
    }

    pub fn registration_finished(&mut self) {
        self.register = RegisterInput::default();
        self.register_errors = RegisterErrors::default();
        self.register_open = false;
        self.show_register_password = false;
    }
}

pub fn login_failure_message(err: &ApiError) -> String {
    if err.is_transport() {
        CONNECTION_ERROR.to_string()
    } else {
        err.user_message(LOGIN_REJECTED)
    }
}

pub fn register_failure_message(err: &ApiError) -> String {
    if err.is_transport() {
        CONNECTION_ERROR.to_string()
    } else {
        err.user_message(REGISTER_REJECTED)
    }
}

pub fn registration_from(input: &RegisterInput) -> Registration {
    Registration {
        full_name: input.full_name.trim().to_string(),
        username: input.username.trim().to_string(),
        birth: input.birth.trim().to_string(),
        email: input.email.trim().to_string(),
        password: input.password.trim().to_string(),
    }
}

fn spawn_login(api: Arc<ApiClient>, username: String, password: String, tx: Sender<AuthMsg>) {
    std::thread::spawn(move || {
        let msg = match api.login(&username, &password) {
            Ok(token) => AuthMsg::LoggedIn(token),
            Err(e) => {
                warn!("login failed: {e}");
                AuthMsg::LoginFailed(login_failure_message(&e))
            }
        };
        let _ = tx.send(msg);
    });
}

fn spawn_register(api: Arc<ApiClient>, reg: Registration, tx: Sender<AuthMsg>) {
    std::thread::spawn(move || {
        let msg = match api.register(&reg) {
            Ok(()) => AuthMsg::Registered,
            Err(e) => {
                warn!("registration failed: {e}");
                AuthMsg::RegisterFailed(register_failure_message(&e))
            }
        };
        let _ = tx.send(msg);
    });
}

/// Labeled text field whose inline error clears as soon as it is edited.
fn form_field(
    ui: &mut eg::Ui,
    label: &str,
    value: &mut String,
    secret: Option<&mut bool>,
    error: &mut Option<String>,
) {
    ui.label(label);
    ui.horizontal(|ui| {
        let hidden = secret.as_ref().map(|s| !**s).unwrap_or(false);
        let resp = ui.add(
            eg::TextEdit::singleline(value)
                .password(hidden)
                .desired_width(260.0),
        );
        if resp.changed() {
            *error = None;
        }
        if let Some(show) = secret {
            let icon = if *show { "🙈" } else { "👁" };
            if ui.small_button(icon).on_hover_text("Mostrar/ocultar senha").clicked() {
                *show = !*show;
            }
        }
    });
    if let Some(msg) = error {
        ui.colored_label(eg::Color32::from_rgb(220, 80, 80), msg.as_str());
    }
    ui.add_space(4.0);
}

impl crate::app::NevifyApp {
    pub(crate) fn submit_login(&mut self) {
        if self.entry.busy {
            return;
        }
        let user = self.entry.username.trim().to_string();
        let pass = self.entry.password.trim().to_string();
        if let Err(msg) = validate_login(&user, &pass) {
            self.toasts.error(msg);
            return;
        }
        let Some(api) = self.api.clone() else {
            self.toasts.error(CONNECTION_ERROR);
            return;
        };
        self.entry.busy = true;
        spawn_login(api, user, pass, self.auth_tx.clone());
    }

    pub(crate) fn submit_register(&mut self) {
        if self.entry.busy {
            return;
        }
        if let Err(errs) = validate_registration(&self.entry.register) {
            self.entry.register_errors = errs;
            return;
        }
        let Some(api) = self.api.clone() else {
            self.toasts.error(CONNECTION_ERROR);
            return;
        };
        self.entry.busy = true;
        spawn_register(api, registration_from(&self.entry.register), self.auth_tx.clone());
    }

    pub(crate) fn poll_auth(&mut self, now: Instant) {
        while let Ok(msg) = self.auth_rx.try_recv() {
            self.entry.busy = false;
            match msg {
                AuthMsg::LoggedIn(token) => {
                    if let Err(e) = self.session.save(&token) {
                        warn!("could not persist session: {e}");
                    }
                    info!("login succeeded");
                    self.toasts.success(LOGIN_OK);
                    self.entry.password.clear();
                    self.entry.schedule_redirect(token, now);
                }
                AuthMsg::LoginFailed(msg) | AuthMsg::RegisterFailed(msg) => {
                    self.toasts.error(msg);
                }
                AuthMsg::Registered => {
                    self.toasts.success(REGISTER_OK);
                    self.entry.registration_finished();
                }
            }
        }
        if let Some(token) = self.entry.take_due_redirect(now) {
            self.enter_dashboard(token);
        }
    }

    pub(crate) fn ui_render_entry(&mut self, ctx: &eg::Context) {
        eg::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.heading(eg::RichText::new("Nevify").size(34.0).strong());
                ui.label("Milhões de Filmes novos para Descobrir. Explore já.");
                ui.add_space(24.0);
            });

            ui.vertical_centered(|ui| {
                ui.set_max_width(320.0);
                let mut no_err = None;
                form_field(ui, "Usuário", &mut self.entry.username, None, &mut no_err);
                form_field(
                    ui,
                    "Senha",
                    &mut self.entry.password,
                    Some(&mut self.entry.show_password),
                    &mut no_err,
                );
                let enter = ui.input(|i| i.key_pressed(eg::Key::Enter));

                ui.add_space(8.0);
                let login = ui.add_enabled(!self.entry.busy, eg::Button::new("Entrar"));
                if login.clicked() || (enter && !self.entry.register_open) {
                    self.submit_login();
                }
                if self.entry.busy {
                    ui.add(eg::Spinner::new().size(14.0));
                }
                ui.add_space(12.0);
                if ui.link("Não tem conta? Cadastre-se").clicked() {
                    self.entry.register_open = true;
                }
            });
        });

        self.ui_render_register_window(ctx);
    }

    fn ui_render_register_window(&mut self, ctx: &eg::Context) {
        if !self.entry.register_open {
            return;
        }
        let mut open = self.entry.register_open;
        let mut submit = false;
        eg::Window::new("Criar conta")
            .collapsible(false)
            .resizable(false)
            .anchor(eg::Align2::CENTER_CENTER, eg::vec2(0.0, 0.0))
            .open(&mut open)
            .show(ctx, |ui| {
                let e = &mut self.entry;
                let errs = &mut e.register_errors;
                form_field(ui, "Nome completo", &mut e.register.full_name, None, &mut errs.full_name);
                form_field(ui, "Nome de usuário", &mut e.register.username, None, &mut errs.username);
                form_field(ui, "Data de nascimento (AAAA-MM-DD)", &mut e.register.birth, None, &mut errs.birth);
                form_field(ui, "E-mail", &mut e.register.email, None, &mut errs.email);
                form_field(
                    ui,
                    "Senha",
                    &mut e.register.password,
                    Some(&mut e.show_register_password),
                    &mut errs.password,
                );
                let mut show_confirm = e.show_register_password;
                form_field(
                    ui,
                    "Confirmar senha",
                    &mut e.register.confirm_password,
                    Some(&mut show_confirm),
                    &mut errs.confirm_password,
                );
                e.show_register_password = show_confirm;

                ui.add_space(6.0);
                if ui.add_enabled(!e.busy, eg::Button::new("Cadastrar")).clicked() {
                    submit = true;
                }
            });
        // apply after .show; the closure holds self.entry
        self.entry.register_open = open;
        if submit {
            self.submit_register();
        }
    }
}
