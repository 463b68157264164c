// src/app/mod.rs — Nevify app shell: screens, channels, frame loop

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui as eg;
use tracing::{debug, error, info, warn};

pub mod api;
pub mod auth;
pub mod cache;
pub mod debounce;
pub mod favorites;
pub mod fetcher;
pub mod gfx;
pub mod list;
pub mod movie;
pub mod posters;
pub mod session;
pub mod settings;
pub mod toast;
pub mod types;
pub mod ui;
pub mod validation;
pub mod view_state;

use crate::app::api::ApiClient;
use crate::app::auth::EntryState;
use crate::app::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::app::favorites::{begin_toggle, finish_toggle, spawn_favorite_sync, FavoriteOutcome};
use crate::app::fetcher::spawn_list_fetch;
use crate::app::list::MovieList;
use crate::app::posters::PosterPool;
use crate::app::session::{display_name, SessionStore};
use crate::app::settings::SettingsState;
use crate::app::toast::Toasts;
use crate::app::types::{
    AccountMsg, AuthMsg, FavoriteMsg, ListMsg, ListType, PosterSlot, PosterState,
};
use crate::app::view_state::{Effect, ViewState};
use crate::config::AppConfig;

// ---- Tunables ----
const BUSY_REPAINT: Duration = Duration::from_millis(100);
const POSTER_FETCH_MIN_TIMEOUT_SECS: u64 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Entry,
    Dashboard,
}

pub struct NevifyApp {
    cfg: AppConfig,
    screen: Screen,
    api: Option<Arc<ApiClient>>,
    session: SessionStore,
    display_name: String,

    // dashboard
    view: ViewState,
    list: MovieList,
    search_text: String,
    search_debounce: Debouncer<String>,
    scroll_to_top: bool,

    // posters
    poster_pool: Option<PosterPool>,
    posters: HashMap<String, PosterSlot>,

    // background results
    list_tx: Sender<ListMsg>,
    list_rx: Receiver<ListMsg>,
    fav_tx: Sender<FavoriteMsg>,
    fav_rx: Receiver<FavoriteMsg>,
    auth_tx: Sender<AuthMsg>,
    auth_rx: Receiver<AuthMsg>,
    account_tx: Sender<AccountMsg>,
    account_rx: Receiver<AccountMsg>,

    toasts: Toasts,
    entry: EntryState,
    settings: SettingsState,
}

fn build_api(cfg: &AppConfig, token: Option<String>) -> Option<Arc<ApiClient>> {
    match ApiClient::new(cfg, token) {
        Ok(api) => Some(Arc::new(api)),
        Err(e) => {
            error!("http client build failed: {e}");
            None
        }
    }
}

impl NevifyApp {
    pub fn new(cfg: AppConfig) -> Self {
        cache::init_cache_dir(&cfg);
        let session = SessionStore::in_cache_dir();
        let stored_token = session.load();

        let poster_timeout =
            Duration::from_secs(cfg.request_timeout_secs.max(POSTER_FETCH_MIN_TIMEOUT_SECS));
        let poster_pool =
            match PosterPool::start(cfg.poster_workers, cache::poster_cache_dir(), poster_timeout) {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("posters disabled: {e}");
                    None
                }
            };

        let (list_tx, list_rx) = mpsc::channel();
        let (fav_tx, fav_rx) = mpsc::channel();
        let (auth_tx, auth_rx) = mpsc::channel();
        let (account_tx, account_rx) = mpsc::channel();

        let mut app = Self {
            api: build_api(&cfg, None),
            cfg,
            screen: Screen::Entry,
            session,
            display_name: display_name(None),
            view: ViewState::default(),
            list: MovieList::default(),
            search_text: String::new(),
            search_debounce: Debouncer::new(SEARCH_DEBOUNCE),
            scroll_to_top: false,
            poster_pool,
            posters: HashMap::new(),
            list_tx,
            list_rx,
            fav_tx,
            fav_rx,
            auth_tx,
            auth_rx,
            account_tx,
            account_rx,
            toasts: Toasts::default(),
            entry: EntryState::default(),
            settings: SettingsState::default(),
        };

        if let Some(token) = stored_token {
            info!("resuming stored session");
            app.enter_dashboard(token);
        }
        app
    }

    pub(crate) fn enter_dashboard(&mut self, token: String) {
        self.api = build_api(&self.cfg, Some(token.clone()));
        self.display_name = display_name(Some(&token));
        self.screen = Screen::Dashboard;
        self.settings = SettingsState::default();
        self.go_to(ListType::Home);
    }

    pub(crate) fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!("could not clear session: {e}");
        }
        self.api = build_api(&self.cfg, None);
        self.display_name = display_name(None);
        self.screen = Screen::Entry;
        self.entry = EntryState::default();
        self.settings = SettingsState::default();
        self.search_text.clear();
        self.search_debounce.cancel();
        // bumps the generation so answers from this session are dropped
        let _ = self.view.navigate(ListType::Home);
        self.list.clear();
        self.prune_poster_slots();
        info!("logged out");
    }

    // ---- view transitions ----

    pub(crate) fn go_to(&mut self, list: ListType) {
        self.search_text.clear();
        self.search_debounce.cancel();
        let effect = self.view.navigate(list);
        self.apply_effect(effect);
    }

    pub(crate) fn on_search_edited(&mut self, now: Instant) {
        self.search_debounce.push(self.search_text.clone(), now);
    }

    pub(crate) fn change_sort(&mut self, sort: types::SortOrder) {
        let effect = self.view.change_sort(sort);
        self.apply_effect(effect);
    }

    pub(crate) fn load_more(&mut self) {
        let effect = self.view.load_more();
        self.apply_effect(effect);
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Idle => {}
            Effect::ShowWelcome | Effect::ShowSettings => {
                self.list.clear();
                self.prune_poster_slots();
            }
            Effect::Fetch(req) => {
                if !req.append {
                    self.list.clear();
                    self.prune_poster_slots();
                    self.scroll_to_top = true;
                }
                match &self.api {
                    Some(api) => spawn_list_fetch(Arc::clone(api), req, self.list_tx.clone()),
                    None => {
                        self.view.load_failed(req.generation);
                    }
                }
            }
        }
    }

    // ---- channel polling ----

    fn poll_lists(&mut self) {
        while let Ok(msg) = self.list_rx.try_recv() {
            if msg.page.failed {
                self.view.load_failed(msg.generation);
                continue;
            }
            if !self
                .view
                .loaded(msg.generation, msg.page.page, msg.page.total_pages)
            {
                debug!("dropping stale list response (generation {})", msg.generation);
                continue;
            }
            if !msg.append {
                self.list.clear();
            }
            let added = self.list.append(msg.page.movies);
            debug!(
                "page {}/{}: {added} new cards ({} total)",
                self.view.page(),
                self.view.total_pages(),
                self.list.len()
            );
            self.queue_posters_for_cards();
        }
    }

    pub(crate) fn toggle_favorite(&mut self, movie_id: i64) {
        let from_favorites = self.view.current_type() == ListType::Favorites;
        let Some(op) = begin_toggle(&mut self.list, movie_id, from_favorites) else {
            return;
        };
        match &self.api {
            Some(api) => spawn_favorite_sync(Arc::clone(api), op, self.fav_tx.clone()),
            None => {
                let msg = op.message(Err(api::CONNECTION_ERROR.to_string()));
                self.apply_favorite(&msg);
            }
        }
    }

    fn apply_favorite(&mut self, msg: &FavoriteMsg) {
        match finish_toggle(&mut self.list, msg) {
            FavoriteOutcome::Reverted(e) => self.toasts.error(e),
            FavoriteOutcome::Orphaned => {
                debug!("favorite answer for {} outlived its list", msg.movie_id);
                if let Err(e) = &msg.result {
                    self.toasts.error(e.as_str());
                }
            }
            FavoriteOutcome::Removed => self.prune_poster_slots(),
            FavoriteOutcome::Confirmed => {}
        }
    }

    fn poll_favorites(&mut self) {
        while let Ok(msg) = self.fav_rx.try_recv() {
            self.apply_favorite(&msg);
        }
    }

    fn waiting_on_background(&self) -> bool {
        self.view.is_loading()
            || self.entry.busy
            || self.settings.busy.is_some()
            || self.list.cards().iter().any(|c| c.fav_pending)
            || self
                .posters
                .values()
                .any(|s| matches!(s.state, PosterState::Pending | PosterState::Cached))
    }

    /// Wake the frame loop for the nearest timer or while work is in flight.
    fn schedule_repaint(&self, ctx: &eg::Context, now: Instant) {
        let mut wake: Option<Duration> = self.search_debounce.remaining(now);
        let deadlines = [self.toasts.next_deadline(), self.entry.redirect_deadline()];
        for due in deadlines.into_iter().flatten() {
            let d = due.saturating_duration_since(now);
            wake = Some(wake.map_or(d, |w| w.min(d)));
        }
        if self.waiting_on_background() {
            wake = Some(wake.map_or(BUSY_REPAINT, |w| w.min(BUSY_REPAINT)));
        }
        if let Some(d) = wake {
            ctx.request_repaint_after(d);
        }
    }
}

impl eframe::App for NevifyApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.poll_auth(now);
        self.poll_lists();
        self.poll_favorites();
        self.poll_account();
        self.poll_poster_done(ctx);

        if let Some(query) = self.search_debounce.poll(now) {
            let effect = self.view.search(&query);
            self.apply_effect(effect);
        }
        self.toasts.prune(now);

        match self.screen {
            Screen::Entry => self.ui_render_entry(ctx),
            Screen::Dashboard => self.ui_render_dashboard(ctx),
        }
        self.toasts.show(ctx);

        self.schedule_repaint(ctx, now);
    }
}
