use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::reference::{GenreId, MpaId};
use crate::models::user::UserId;

pub type FilmId = i64;

/// A stored film together with its genre and liker associations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Film {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub duration: i32,
    pub release_date: NaiveDate,
    pub mpa_id: MpaId,
    pub genre_ids: BTreeSet<GenreId>,
    pub likes: BTreeSet<UserId>,
}

/// Film fields as submitted, before storage assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFilm {
    pub name: String,
    pub description: String,
    pub duration: i32,
    pub release_date: NaiveDate,
    pub mpa_id: MpaId,
    pub genre_ids: BTreeSet<GenreId>,
}

impl NewFilm {
    /// Attach a storage-assigned id. A new film has no likes.
    pub fn with_id(self, id: FilmId) -> Film {
        Film {
            id,
            name: self.name,
            description: self.description,
            duration: self.duration,
            release_date: self.release_date,
            mpa_id: self.mpa_id,
            genre_ids: self.genre_ids,
            likes: BTreeSet::new(),
        }
    }
}

impl Film {
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}
