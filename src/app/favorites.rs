// src/app/favorites.rs
//! Optimistic favorite toggling with backend reconciliation.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::app::api::{ApiClient, FavoritePayload};
use crate::app::list::MovieList;
use crate::app::types::FavoriteMsg;

pub const FAVORITE_SYNC_ERROR: &str = "Erro ao atualizar favorito";

#[derive(Clone, Debug, PartialEq)]
pub enum FavoriteCall {
    Add(FavoritePayload),
    Remove { delete_id: i64 },
}

/// One pending toggle, stamped with the list it was clicked in.
#[derive(Clone, Debug, PartialEq)]
pub struct FavoriteOp {
    pub movie_id: i64,
    pub list_generation: u64,
    pub from_favorites: bool,
    pub call: FavoriteCall,
}

impl FavoriteOp {
    pub const fn adds(&self) -> bool {
        matches!(self.call, FavoriteCall::Add(_))
    }

    pub fn message(&self, result: Result<(), String>) -> FavoriteMsg {
        FavoriteMsg {
            movie_id: self.movie_id,
            added: self.adds(),
            list_generation: self.list_generation,
            from_favorites: self.from_favorites,
            result,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Confirmed,
    /// Unfavorited from the favorites view; the card left the list.
    Removed,
    Reverted(String),
    /// The list the click came from has been replaced since.
    Orphaned,
}

/// Flip the card's flag right away and describe the backend call to make.
/// Clicks on a card whose previous toggle is still syncing are ignored.
pub fn begin_toggle(
    list: &mut MovieList,
    movie_id: i64,
    from_favorites: bool,
) -> Option<FavoriteOp> {
    let list_generation = list.generation();
    let card = list.get_mut(movie_id)?;
    if card.fav_pending {
        return None;
    }
    card.fav_pending = true;
    card.movie.is_favorite = !card.movie.is_favorite;
    let call = if card.movie.is_favorite {
        FavoriteCall::Add(FavoritePayload::from(&card.movie))
    } else {
        FavoriteCall::Remove {
            delete_id: card.movie.movie_ref,
        }
    };
    Some(FavoriteOp {
        movie_id,
        list_generation,
        from_favorites,
        call,
    })
}

/// Reconcile the optimistic flag with the backend answer.
pub fn finish_toggle(list: &mut MovieList, msg: &FavoriteMsg) -> FavoriteOutcome {
    if msg.list_generation != list.generation() {
        return FavoriteOutcome::Orphaned;
    }
    let Some(card) = list.get_mut(msg.movie_id) else {
        return FavoriteOutcome::Orphaned;
    };
    card.fav_pending = false;
    match &msg.result {
        Ok(()) if !msg.added && msg.from_favorites => {
            list.remove(msg.movie_id);
            FavoriteOutcome::Removed
        }
        Ok(()) => FavoriteOutcome::Confirmed,
        Err(e) => {
            card.movie.is_favorite = !msg.added;
            FavoriteOutcome::Reverted(e.clone())
        }
    }
}

pub fn spawn_favorite_sync(api: Arc<ApiClient>, op: FavoriteOp, tx: Sender<FavoriteMsg>) {
    std::thread::spawn(move || {
        let res = match &op.call {
            FavoriteCall::Add(payload) => api.add_favorite(payload),
            FavoriteCall::Remove { delete_id } => api.remove_favorite(*delete_id),
        };
        let result = match res {
            Ok(()) => {
                debug!("favorite {} synced (add={})", op.movie_id, op.adds());
                Ok(())
            }
            Err(e) => {
                warn!("favorite sync failed for {}: {e}", op.movie_id);
                Err(e.user_message(FAVORITE_SYNC_ERROR))
            }
        };
        let _ = tx.send(op.message(result));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::movie::Movie;

    fn movie(id: i64, movie_ref: i64, fav: bool) -> Movie {
        Movie {
            id,
            tmdb_id: id + 1000,
            movie_ref,
            title: "Alien".into(),
            poster_path: "/alien.jpg".into(),
            overview: String::new(),
            vote_average: 8.5,
            release_date: Some("1979-05-25".into()),
            is_favorite: fav,
            created_at: None,
        }
    }

    fn list_with(id: i64, fav: bool) -> MovieList {
        let mut list = MovieList::default();
        list.append(vec![movie(id, id + 1000, fav)]);
        list
    }

    #[test]
    fn add_posts_tmdb_payload() {
        let mut list = list_with(7, false);
        let op = begin_toggle(&mut list, 7, false).unwrap();
        match &op.call {
            FavoriteCall::Add(payload) => assert_eq!(payload.id, 1007),
            other => panic!("expected add, got {other:?}"),
        }
        assert!(list.get(7).unwrap().movie.is_favorite);
    }

    #[test]
    fn toggling_twice_restores_original_state() {
        let mut list = list_with(7, false);
        let first = begin_toggle(&mut list, 7, false).unwrap();
        assert_eq!(finish_toggle(&mut list, &first.message(Ok(()))), FavoriteOutcome::Confirmed);
        let second = begin_toggle(&mut list, 7, false).unwrap();
        assert_eq!(second.call, FavoriteCall::Remove { delete_id: 1007 });
        finish_toggle(&mut list, &second.message(Ok(())));

        let card = list.get(7).unwrap();
        assert!(!card.movie.is_favorite);
        assert!(!card.fav_pending);
    }

    #[test]
    fn click_while_syncing_is_ignored() {
        let mut list = list_with(7, false);
        begin_toggle(&mut list, 7, false).unwrap();
        assert_eq!(begin_toggle(&mut list, 7, false), None);
        assert_eq!(begin_toggle(&mut list, 99, false), None);
    }

    #[test]
    fn failure_reverts_flag() {
        let mut list = list_with(7, true);
        let op = begin_toggle(&mut list, 7, true).unwrap();
        assert!(!list.get(7).unwrap().movie.is_favorite);
        let out = finish_toggle(&mut list, &op.message(Err("offline".into())));
        assert_eq!(out, FavoriteOutcome::Reverted("offline".into()));
        assert!(list.get(7).unwrap().movie.is_favorite);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn unfavorite_in_favorites_view_removes_card() {
        let mut list = list_with(7, true);
        let op = begin_toggle(&mut list, 7, true).unwrap();
        assert_eq!(finish_toggle(&mut list, &op.message(Ok(()))), FavoriteOutcome::Removed);
        assert!(list.is_empty());
    }

    #[test]
    fn unfavorite_elsewhere_keeps_card() {
        let mut list = list_with(7, true);
        let op = begin_toggle(&mut list, 7, false).unwrap();
        assert_eq!(finish_toggle(&mut list, &op.message(Ok(()))), FavoriteOutcome::Confirmed);
        assert!(!list.get(7).unwrap().movie.is_favorite);
    }

    #[test]
    fn ack_for_reloaded_list_is_orphaned() {
        let mut list = list_with(7, false);
        let op = begin_toggle(&mut list, 7, false).unwrap();
        list.clear();
        assert_eq!(finish_toggle(&mut list, &op.message(Ok(()))), FavoriteOutcome::Orphaned);
    }

    #[test]
    fn answer_from_previous_list_leaves_same_id_in_new_list_alone() {
        // unfavorite 12 on Popular, then open Favorites before the DELETE returns
        let mut list = list_with(12, true);
        let op = begin_toggle(&mut list, 12, false).unwrap();
        list.clear();
        list.append(vec![movie(12, 680, true)]);

        let out = finish_toggle(&mut list, &op.message(Ok(())));
        assert_eq!(out, FavoriteOutcome::Orphaned);
        assert_eq!(list.len(), 1);
        assert!(list.get(12).unwrap().movie.is_favorite);

        let failed = finish_toggle(&mut list, &op.message(Err("offline".into())));
        assert_eq!(failed, FavoriteOutcome::Orphaned);
        assert!(list.get(12).unwrap().movie.is_favorite);
    }
}
