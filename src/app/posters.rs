// src/app/posters.rs
//! Poster worker pool: a fixed set of threads pulling jobs from one shared
//! channel, downloading through one pooled HTTP client.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui as eg;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::{debug, warn};

use crate::app::cache::{
    download_and_store_resized_with_client, find_cached_in, poster_url, url_to_cache_key,
};
use crate::app::types::{MovieCard, PosterDone, PosterSlot, PosterState};

pub const RESIZE_MAX_W: u32 = 320;
pub const RESIZE_QUALITY: u8 = 75;
pub const MAX_DONE_PER_FRAME: usize = 12;
pub const MAX_UPLOADS_PER_FRAME: usize = 4;

// (key, url)
type PosterJob = (String, String);

pub struct PosterPool {
    dir: PathBuf,
    work_tx: Sender<PosterJob>,
    done_rx: Receiver<PosterDone>,
}

impl PosterPool {
    pub fn start(workers: usize, dir: PathBuf, timeout: Duration) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent(concat!("nevify/", env!("CARGO_PKG_VERSION"), " posters"))
            .timeout(timeout)
            .pool_max_idle_per_host(16)
            .default_headers({
                let mut h = HeaderMap::new();
                h.insert(
                    ACCEPT,
                    HeaderValue::from_static("image/avif,image/webp,image/*;q=0.8,*/*;q=0.5"),
                );
                h
            })
            .build()
            .map_err(|e| format!("poster http client: {e}"))?;
        let client = Arc::new(client);

        let (work_tx, work_rx) = mpsc::channel::<PosterJob>();
        let (done_tx, done_rx) = mpsc::channel::<PosterDone>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        for _ in 0..workers.max(1) {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let client = Arc::clone(&client);
            let dir = dir.clone();

            std::thread::spawn(move || loop {
                let job = {
                    let Ok(rx) = work_rx.lock() else { break };
                    rx.recv()
                };
                let Ok((key, url)) = job else { break };

                let result = download_and_store_resized_with_client(
                    &client,
                    &dir,
                    &url,
                    &key,
                    RESIZE_MAX_W,
                    RESIZE_QUALITY,
                );
                if let Err(e) = &result {
                    warn!("poster download failed: {e}");
                }
                if done_tx.send(PosterDone { key, result }).is_err() {
                    break;
                }
            });
        }

        Ok(Self {
            dir,
            work_tx,
            done_rx,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn queue(&self, key: String, url: String) -> bool {
        self.work_tx.send((key, url)).is_ok()
    }

    pub fn try_done(&self) -> Option<PosterDone> {
        self.done_rx.try_recv().ok()
    }
}

/// Drop slots no card points at any more; returns how many went.
pub fn retain_live_slots<V>(slots: &mut HashMap<String, V>, cards: &[MovieCard]) -> usize {
    let live: HashSet<&str> = cards.iter().filter_map(|c| c.poster_key.as_deref()).collect();
    let before = slots.len();
    slots.retain(|k, _| live.contains(k.as_str()));
    before - slots.len()
}

impl crate::app::NevifyApp {
    /// Release textures of posters that left the grid.
    pub(crate) fn prune_poster_slots(&mut self) {
        let dropped = retain_live_slots(&mut self.posters, self.list.cards());
        if dropped > 0 {
            debug!("released {dropped} poster slots");
        }
    }

    /// Give every card without a poster slot one, queueing downloads for
    /// posters not on disk yet.
    pub(crate) fn queue_posters_for_cards(&mut self) {
        let image_base = self.cfg.image_base_url.clone();
        for card in self.list.cards_mut() {
            if card.poster_key.is_some() {
                continue;
            }
            let Some(url) = poster_url(&image_base, &card.movie.poster_path) else {
                continue;
            };
            let key = url_to_cache_key(&url);
            card.poster_key = Some(key.clone());
            if self.posters.contains_key(&key) {
                continue;
            }

            let Some(pool) = &self.poster_pool else {
                self.posters.insert(
                    key,
                    PosterSlot {
                        url,
                        path: None,
                        tex: None,
                        state: PosterState::Failed,
                    },
                );
                continue;
            };
            let cached = find_cached_in(pool.dir(), &key);
            let state = if cached.is_some() {
                PosterState::Cached
            } else if pool.queue(key.clone(), url.clone()) {
                PosterState::Pending
            } else {
                PosterState::Failed
            };
            self.posters.insert(
                key,
                PosterSlot {
                    url,
                    path: cached,
                    tex: None,
                    state,
                },
            );
        }
    }

    /// Drain finished downloads; textures are uploaded lazily while painting.
    pub(crate) fn poll_poster_done(&mut self, ctx: &eg::Context) {
        let Some(pool) = &self.poster_pool else {
            return;
        };
        let mut drained = 0usize;
        while drained < MAX_DONE_PER_FRAME {
            let Some(msg) = pool.try_done() else {
                break;
            };
            drained += 1;
            let Some(slot) = self.posters.get_mut(&msg.key) else {
                continue;
            };
            match msg.result {
                Ok(path) => {
                    slot.path = Some(path);
                    slot.state = PosterState::Cached;
                }
                Err(_) => slot.state = PosterState::Failed,
            }
        }
        if drained > 0 {
            ctx.request_repaint();
        }
    }

    /// Upload one cached poster to the GPU. Returns true when a texture was made.
    pub(crate) fn try_lazy_upload(&mut self, ctx: &eg::Context, key: &str) -> bool {
        let Some(slot) = self.posters.get_mut(key) else {
            return false;
        };
        if slot.state != PosterState::Cached || slot.tex.is_some() {
            return false;
        }
        let Some(path) = slot.path.clone() else {
            slot.state = PosterState::Failed;
            return false;
        };
        match crate::app::gfx::load_texture_from_path(ctx, &path, key) {
            Ok(tex) => {
                slot.tex = Some(tex);
                slot.state = PosterState::Ready;
                true
            }
            Err(e) => {
                debug!("poster {} unusable: {e}", slot.url);
                slot.state = PosterState::Failed;
                false
            }
        }
    }
}
