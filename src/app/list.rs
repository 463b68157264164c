// src/app/list.rs
use std::collections::HashSet;

use crate::app::movie::Movie;
use crate::app::types::MovieCard;

/// Append-only set of rendered cards, unique by movie id.
#[derive(Default)]
pub struct MovieList {
    cards: Vec<MovieCard>,
    ids: HashSet<i64>,
    /// Bumped whenever the cards are thrown away and replaced.
    generation: u64,
}

impl MovieList {
    pub fn clear(&mut self) {
        self.cards.clear();
        self.ids.clear();
        self.generation += 1;
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Append movies not rendered yet; returns how many were added.
    pub fn append(&mut self, movies: Vec<Movie>) -> usize {
        let mut added = 0usize;
        for movie in movies {
            if !self.ids.insert(movie.id) {
                continue;
            }
            self.cards.push(MovieCard {
                movie,
                poster_key: None,
                fav_pending: false,
            });
            added += 1;
        }
        added
    }

    pub fn remove(&mut self, id: i64) -> Option<MovieCard> {
        let idx = self.cards.iter().position(|c| c.movie.id == id)?;
        self.ids.remove(&id);
        Some(self.cards.remove(idx))
    }

    pub fn get(&self, id: i64) -> Option<&MovieCard> {
        self.cards.iter().find(|c| c.movie.id == id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut MovieCard> {
        self.cards.iter_mut().find(|c| c.movie.id == id)
    }

    pub fn cards(&self) -> &[MovieCard] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut [MovieCard] {
        &mut self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
