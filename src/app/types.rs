// src/app/types.rs
use eframe::egui::TextureHandle;
use std::path::PathBuf;

use crate::app::movie::Movie;

// ---- list / navigation ----
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListType {
    Home,
    Popular,
    NowPlaying,
    Upcoming,
    Favorites,
    TopRated,
    Settings,
}

impl ListType {
    pub const NAV: [Self; 7] = [
        Self::Home,
        Self::Popular,
        Self::NowPlaying,
        Self::Upcoming,
        Self::Favorites,
        Self::TopRated,
        Self::Settings,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Popular => "popular",
            Self::NowPlaying => "nowplaying",
            Self::Upcoming => "upcoming",
            Self::Favorites => "favorites",
            Self::TopRated => "toprated",
            Self::Settings => "settings",
        }
    }

    pub const fn nav_label(self) -> &'static str {
        match self {
            Self::Home => "Início",
            Self::Popular => "Populares",
            Self::NowPlaying => "Em Cartaz",
            Self::Upcoming => "Próximas Estreias",
            Self::Favorites => "Favoritos",
            Self::TopRated => "Mais Avaliados",
            Self::Settings => "Configurações",
        }
    }

    /// Heading shown above the grid.
    pub fn page_title(self, query: &str) -> &'static str {
        match self {
            Self::Home if query.is_empty() => "Bem-Vindo(a).",
            Self::Home => "Resultados da pesquisa",
            Self::Popular => "Filmes Populares",
            Self::TopRated => "Mais Avaliados",
            Self::Favorites => "Favoritos",
            Self::NowPlaying => "Em Cartaz",
            Self::Upcoming => "Próximas Estreias",
            Self::Settings => "Configurações da Conta",
        }
    }

    /// Lists backed by the server-side search endpoint when a query is set.
    pub const fn searches_server_side(self) -> bool {
        matches!(self, Self::Home | Self::Popular | Self::TopRated)
    }

    pub const fn is_list(self) -> bool {
        !matches!(self, Self::Settings)
    }

    /// A search that matches nothing is not the same as having no favorites.
    pub fn empty_message(self, query: &str) -> &'static str {
        match self {
            Self::Favorites if query.trim().is_empty() => "Nenhum favorito ainda.",
            _ => "Nenhum filme encontrado.",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Recent,
    Rated,
}

impl SortOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Rated => "rated",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Recent => "Mais recentes",
            Self::Rated => "Mais avaliados",
        }
    }
}

// ---- cross-thread messages ----
pub struct ListMsg {
    pub generation: u64,
    pub append: bool,
    pub page: crate::app::fetcher::ListPage,
}

pub struct FavoriteMsg {
    pub movie_id: i64,
    pub added: bool,
    /// `MovieList::generation` when the card was clicked.
    pub list_generation: u64,
    pub from_favorites: bool,
    pub result: Result<(), String>,
}

pub enum AuthMsg {
    LoggedIn(String),
    LoginFailed(String),
    Registered,
    RegisterFailed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountAction {
    ChangeUsername,
    ChangePassword,
    ClearFavorites,
    DeleteAccount,
}

pub struct AccountMsg {
    pub action: AccountAction,
    pub result: Result<(), String>,
}

pub struct PosterDone {
    pub key: String,
    pub result: Result<PathBuf, String>,
}

// ---- poster slots ----
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterState {
    Pending, // queued or downloading
    Cached,  // file present on disk (ready to upload)
    Ready,   // texture uploaded
    Failed,  // permanent failure
}

pub struct PosterSlot {
    pub url: String,
    pub path: Option<PathBuf>,
    pub tex: Option<TextureHandle>, // UI thread only
    pub state: PosterState,
}

// ---- movie card backing each grid cell ----
pub struct MovieCard {
    pub movie: Movie,
    pub poster_key: Option<String>,
    pub fav_pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_title_depends_on_query() {
        assert_eq!(ListType::Home.page_title(""), "Bem-Vindo(a).");
        assert_eq!(ListType::Home.page_title("batman"), "Resultados da pesquisa");
        assert_eq!(ListType::Upcoming.page_title("x"), "Próximas Estreias");
    }

    #[test]
    fn favorites_empty_message() {
        assert_eq!(ListType::Favorites.empty_message(""), "Nenhum favorito ainda.");
        assert_eq!(ListType::Favorites.empty_message("zzz"), "Nenhum filme encontrado.");
        assert_eq!(ListType::Popular.empty_message(""), "Nenhum filme encontrado.");
    }
}
