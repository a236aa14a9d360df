// Reference data - genres and MPA ratings are fixed, id-addressed tables

use serde::Serialize;

pub type GenreId = i64;
pub type MpaId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: &'static str,
}

/// Content rating attached to every film.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mpa {
    pub id: MpaId,
    pub name: &'static str,
}

pub const GENRES: [Genre; 6] = [
    Genre { id: 1, name: "Comedy" },
    Genre { id: 2, name: "Drama" },
    Genre { id: 3, name: "Cartoon" },
    Genre { id: 4, name: "Thriller" },
    Genre { id: 5, name: "Documentary" },
    Genre { id: 6, name: "Action" },
];

pub const MPA_RATINGS: [Mpa; 5] = [
    Mpa { id: 1, name: "G" },
    Mpa { id: 2, name: "PG" },
    Mpa { id: 3, name: "PG-13" },
    Mpa { id: 4, name: "R" },
    Mpa { id: 5, name: "NC-17" },
];

impl Genre {
    pub fn by_id(id: GenreId) -> Option<Genre> {
        GENRES.iter().copied().find(|genre| genre.id == id)
    }
}

impl Mpa {
    pub fn by_id(id: MpaId) -> Option<Mpa> {
        MPA_RATINGS.iter().copied().find(|mpa| mpa.id == id)
    }
}
