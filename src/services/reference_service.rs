use crate::error::{AppError, AppResult};
use crate::models::{Genre, GenreId, Mpa, MpaId, GENRES, MPA_RATINGS};

/// Read-only lookups over the genre and MPA rating tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceService;

impl ReferenceService {
    pub fn list_genres(&self) -> Vec<Genre> {
        GENRES.to_vec()
    }

    pub fn get_genre(&self, id: GenreId) -> AppResult<Genre> {
        Genre::by_id(id).ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    pub fn list_mpa(&self) -> Vec<Mpa> {
        MPA_RATINGS.to_vec()
    }

    pub fn get_mpa(&self, id: MpaId) -> AppResult<Mpa> {
        Mpa::by_id(id).ok_or_else(|| AppError::NotFound(format!("MPA rating {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_ordered_by_id() {
        let service = ReferenceService;
        let genre_ids: Vec<_> = service.list_genres().iter().map(|g| g.id).collect();
        assert_eq!(genre_ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(service.list_mpa().len(), 5);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let service = ReferenceService;
        assert_eq!(service.get_genre(2).unwrap().name, "Drama");
        assert!(matches!(service.get_genre(42), Err(AppError::NotFound(_))));
        assert!(matches!(service.get_mpa(0), Err(AppError::NotFound(_))));
    }
}
