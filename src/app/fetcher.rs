// src/app/fetcher.rs
use std::collections::HashSet;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::app::api::{ApiClient, ApiError};
use crate::app::movie::{filter_by_title, sort_movies, Movie, RawListing};
use crate::app::types::{ListMsg, ListType};
use crate::app::view_state::ListRequest;

/// Backend calls the list loader needs; `ApiClient` in the app, fakes in tests.
pub trait MovieSource {
    fn list_movies(&self, kind: &str, page: u32) -> Result<RawListing, ApiError>;
    fn search_movies(&self, query: &str, page: u32) -> Result<RawListing, ApiError>;
    fn favorites(&self) -> Result<RawListing, ApiError>;
}

impl MovieSource for ApiClient {
    fn list_movies(&self, kind: &str, page: u32) -> Result<RawListing, ApiError> {
        ApiClient::list_movies(self, kind, page)
    }
    fn search_movies(&self, query: &str, page: u32) -> Result<RawListing, ApiError> {
        ApiClient::search_movies(self, query, page)
    }
    fn favorites(&self) -> Result<RawListing, ApiError> {
        ApiClient::favorites(self)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListPage {
    pub movies: Vec<Movie>,
    pub page: u32,
    pub total_pages: u32,
    pub failed: bool,
}

impl ListPage {
    fn failed(page: u32) -> Self {
        Self {
            movies: Vec::new(),
            page,
            total_pages: page,
            failed: true,
        }
    }
}

/// Catalog endpoint for a list type; home falls back to popular.
pub const fn endpoint_kind(list: ListType) -> &'static str {
    match list {
        ListType::Home | ListType::Popular => "popular",
        ListType::NowPlaying => "nowplaying",
        ListType::Upcoming => "upcoming",
        ListType::TopRated => "toprated",
        ListType::Favorites => "favorites",
        ListType::Settings => "settings",
    }
}

fn canonical(items: Vec<crate::app::movie::RawMovie>) -> Vec<Movie> {
    items.into_iter().filter_map(|m| m.canonicalize()).collect()
}

/// Ids of everything the user has favorited.
pub fn favorite_ids(source: &dyn MovieSource) -> Result<HashSet<i64>, ApiError> {
    let (items, _, _) = source.favorites()?.into_parts();
    Ok(items.iter().filter_map(|m| m.favorite_ref()).collect())
}

fn fetch_raw(source: &dyn MovieSource, req: &ListRequest) -> Result<ListPage, ApiError> {
    let query = req.query.trim();

    if req.list == ListType::Favorites {
        let (items, _, _) = source.favorites()?.into_parts();
        let mut movies = filter_by_title(canonical(items), query);
        for m in &mut movies {
            m.is_favorite = true;
        }
        sort_movies(&mut movies, req.sort);
        return Ok(ListPage {
            movies,
            page: 1,
            total_pages: 1,
            failed: false,
        });
    }

    let listing = if !query.is_empty() && req.list.searches_server_side() {
        source.search_movies(query, req.page)?
    } else {
        source.list_movies(endpoint_kind(req.list), req.page)?
    };
    let (items, page, total) = listing.into_parts();
    let mut movies = canonical(items);
    if !req.list.searches_server_side() {
        movies = filter_by_title(movies, query);
    }

    match favorite_ids(source) {
        Ok(ids) => {
            for m in &mut movies {
                m.is_favorite = ids.contains(&m.id);
            }
        }
        Err(e) => warn!("favorites cross-reference failed: {e}"),
    }

    Ok(ListPage {
        movies,
        page: page.unwrap_or(req.page),
        total_pages: total.unwrap_or(1),
        failed: false,
    })
}

/// Load one page for the request. Failures are logged and come back as an
/// empty, failed page; nothing propagates past this point.
pub fn load_list(source: &dyn MovieSource, req: &ListRequest) -> ListPage {
    match fetch_raw(source, req) {
        Ok(page) => {
            debug!(
                "loaded {} {:?} sort={} page {}/{} ({} movies)",
                req.list.as_str(),
                req.query,
                req.sort.as_str(),
                page.page,
                page.total_pages,
                page.movies.len()
            );
            page
        }
        Err(e) => {
            warn!("failed to fetch {} movies: {e}", req.list.as_str());
            ListPage::failed(req.page)
        }
    }
}

/// Run `load_list` on a background thread and post the result.
pub fn spawn_list_fetch(api: Arc<ApiClient>, req: ListRequest, tx: Sender<ListMsg>) {
    std::thread::spawn(move || {
        let page = load_list(api.as_ref(), &req);
        let _ = tx.send(ListMsg {
            generation: req.generation,
            append: req.append,
            page,
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::types::SortOrder;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeSource {
        calls: RefCell<Vec<String>>,
        catalog: &'static str,
        favorites: &'static str,
        fail_catalog: bool,
        fail_favorites: bool,
    }

    fn listing(json: &str) -> RawListing {
        serde_json::from_str(json).unwrap()
    }

    impl MovieSource for FakeSource {
        fn list_movies(&self, kind: &str, page: u32) -> Result<RawListing, ApiError> {
            self.calls.borrow_mut().push(format!("list {kind} {page}"));
            if self.fail_catalog {
                return Err(ApiError::Status {
                    status: 500,
                    message: None,
                });
            }
            Ok(listing(self.catalog))
        }
        fn search_movies(&self, query: &str, page: u32) -> Result<RawListing, ApiError> {
            self.calls.borrow_mut().push(format!("search {query} {page}"));
            Ok(listing(self.catalog))
        }
        fn favorites(&self) -> Result<RawListing, ApiError> {
            self.calls.borrow_mut().push("favorites".into());
            if self.fail_favorites {
                return Err(ApiError::Transport("offline".into()));
            }
            Ok(listing(self.favorites))
        }
    }

    fn req(list: ListType, page: u32, query: &str) -> ListRequest {
        ListRequest {
            generation: 1,
            list,
            page,
            query: query.into(),
            sort: SortOrder::Recent,
            append: page > 1,
        }
    }

    const CATALOG: &str = r#"{"results": [
        {"id": 11, "title": "Star Wars", "vote_average": 8.2},
        {"id": 12, "title": "Finding Nemo", "vote_average": 7.8}
    ], "page": 2, "totalPages": 5}"#;

    const FAVORITES: &str = r#"[
        {"id": 1, "movieId": 12, "title": "Finding Nemo", "voteAverage": 7.8, "createdAt": "2024-02-01T00:00:00Z"},
        {"id": 2, "movieId": 99, "title": "Heat", "voteAverage": 8.3, "createdAt": "2024-05-01T00:00:00Z"}
    ]"#;

    #[test]
    fn home_loads_popular_and_marks_favorites() {
        let src = FakeSource {
            catalog: CATALOG,
            favorites: FAVORITES,
            ..Default::default()
        };
        let page = load_list(&src, &req(ListType::Home, 2, ""));
        assert_eq!(
            *src.calls.borrow(),
            vec!["list popular 2".to_string(), "favorites".to_string()]
        );
        assert_eq!((page.page, page.total_pages, page.failed), (2, 5, false));
        let flags: Vec<(i64, bool)> = page.movies.iter().map(|m| (m.id, m.is_favorite)).collect();
        assert_eq!(flags, vec![(11, false), (12, true)]);
    }

    #[test]
    fn toprated_query_uses_search_endpoint() {
        let src = FakeSource {
            catalog: CATALOG,
            favorites: "[]",
            ..Default::default()
        };
        load_list(&src, &req(ListType::TopRated, 1, "star"));
        assert_eq!(src.calls.borrow()[0], "search star 1");
    }

    #[test]
    fn upcoming_query_filters_client_side() {
        let src = FakeSource {
            catalog: CATALOG,
            favorites: "[]",
            ..Default::default()
        };
        let page = load_list(&src, &req(ListType::Upcoming, 1, "nemo"));
        assert_eq!(src.calls.borrow()[0], "list upcoming 1");
        assert_eq!(page.movies.len(), 1);
        assert_eq!(page.movies[0].title, "Finding Nemo");
    }

    #[test]
    fn favorites_skip_cross_reference_and_sort() {
        let src = FakeSource {
            favorites: FAVORITES,
            ..Default::default()
        };
        let mut r = req(ListType::Favorites, 1, "");
        r.sort = SortOrder::Recent;
        let page = load_list(&src, &r);
        assert_eq!(*src.calls.borrow(), vec!["favorites".to_string()]);
        assert_eq!(page.movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 1]);
        assert!(page.movies.iter().all(|m| m.is_favorite));
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn empty_favorites_yield_empty_page() {
        let src = FakeSource {
            favorites: "[]",
            ..Default::default()
        };
        let page = load_list(&src, &req(ListType::Favorites, 1, ""));
        assert!(page.movies.is_empty());
        assert!(!page.failed);
    }

    #[test]
    fn catalog_failure_returns_empty_failed_page() {
        let src = FakeSource {
            fail_catalog: true,
            ..Default::default()
        };
        let page = load_list(&src, &req(ListType::Popular, 3, ""));
        assert!(page.failed);
        assert!(page.movies.is_empty());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn cross_reference_failure_keeps_movies() {
        let src = FakeSource {
            catalog: CATALOG,
            fail_favorites: true,
            ..Default::default()
        };
        let page = load_list(&src, &req(ListType::NowPlaying, 1, ""));
        assert!(!page.failed);
        assert_eq!(page.movies.len(), 2);
        assert!(page.movies.iter().all(|m| !m.is_favorite));
    }
}
