// src/app/view_state.rs
//! Dashboard view state with named transitions.
//!
//! Every transition that needs data returns an [`Effect::Fetch`] carrying a
//! fresh generation number. Only the response for the latest generation is
//! accepted, so a slow request that was superseded by a newer navigation,
//! search or sort change can never overwrite the list.

use crate::app::types::{ListType, SortOrder};

/// Distance from the bottom of the grid that triggers the next page.
pub const LOAD_MORE_THRESHOLD_PX: f32 = 200.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRequest {
    pub generation: u64,
    pub list: ListType,
    pub page: u32,
    pub query: String,
    pub sort: SortOrder,
    pub append: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Idle,
    ShowWelcome,
    ShowSettings,
    Fetch(ListRequest),
}

#[derive(Clone, Debug)]
pub struct ViewState {
    current_type: ListType,
    query: String,
    sort: SortOrder,
    page: u32,
    total_pages: u32,
    loading: bool,
    generation: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            current_type: ListType::Home,
            query: String::new(),
            sort: SortOrder::Recent,
            page: 1,
            total_pages: 1,
            loading: false,
            generation: 0,
        }
    }
}

impl ViewState {
    pub const fn current_type(&self) -> ListType {
        self.current_type
    }

    pub const fn sort(&self) -> SortOrder {
        self.sort
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// True while the welcome screen replaces the grid.
    pub fn shows_welcome(&self) -> bool {
        self.current_type == ListType::Home && self.query.is_empty()
    }

    pub fn page_title(&self) -> &'static str {
        self.current_type.page_title(&self.query)
    }

    pub fn empty_message(&self) -> &'static str {
        self.current_type.empty_message(&self.query)
    }

    // ---- transitions ----

    pub fn navigate(&mut self, list: ListType) -> Effect {
        self.current_type = list;
        self.query.clear();
        self.sort = SortOrder::Recent;
        self.reset_paging();
        self.reload()
    }

    pub fn search(&mut self, query: &str) -> Effect {
        if !self.current_type.is_list() {
            return Effect::Idle;
        }
        self.query = query.trim().to_string();
        self.reset_paging();
        self.reload()
    }

    /// Sorting only applies to favorites; elsewhere the key is just stored.
    pub fn change_sort(&mut self, sort: SortOrder) -> Effect {
        self.sort = sort;
        if self.current_type != ListType::Favorites {
            return Effect::Idle;
        }
        self.reset_paging();
        self.reload()
    }

    pub fn load_more(&mut self) -> Effect {
        if self.loading
            || !self.current_type.is_list()
            || self.shows_welcome()
            || self.page >= self.total_pages
        {
            return Effect::Idle;
        }
        self.page += 1;
        self.dispatch(true)
    }

    /// Apply a finished load. Returns false when the response is stale.
    pub fn loaded(&mut self, generation: u64, page: u32, total_pages: u32) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        self.page = page.max(1);
        self.total_pages = total_pages.max(1);
        true
    }

    /// A failed load ends pagination for this view until the next reload.
    pub fn load_failed(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        self.total_pages = self.page;
        true
    }

    fn reset_paging(&mut self) {
        self.page = 1;
        self.total_pages = 1;
    }

    fn reload(&mut self) -> Effect {
        if self.current_type == ListType::Settings {
            self.generation += 1;
            self.loading = false;
            return Effect::ShowSettings;
        }
        if self.shows_welcome() {
            self.generation += 1;
            self.loading = false;
            return Effect::ShowWelcome;
        }
        self.dispatch(false)
    }

    fn dispatch(&mut self, append: bool) -> Effect {
        self.generation += 1;
        self.loading = true;
        Effect::Fetch(ListRequest {
            generation: self.generation,
            list: self.current_type,
            page: self.page,
            query: self.query.clone(),
            sort: self.sort,
            append,
        })
    }
}

/// Scroll trigger: `offset_y + viewport_h` within the threshold of `content_h`.
pub fn near_bottom(offset_y: f32, viewport_h: f32, content_h: f32) -> bool {
    content_h > 0.0 && offset_y + viewport_h >= content_h - LOAD_MORE_THRESHOLD_PX
}
