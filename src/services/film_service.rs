use futures::future::try_join_all;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::infrastructure::{FilmStorage, UserStorage};
use crate::mapper;
use crate::models::{Film, FilmDto, FilmId, FilmRequest, UserId};

pub const DEFAULT_POPULAR_COUNT: usize = 10;

/// Film catalogue operations: CRUD, likes and popularity.
#[derive(Clone)]
pub struct FilmService {
    films: Arc<dyn FilmStorage>,
    users: Arc<dyn UserStorage>,
}

impl FilmService {
    pub fn new(films: Arc<dyn FilmStorage>, users: Arc<dyn UserStorage>) -> Self {
        Self { films, users }
    }

    pub async fn list_films(&self) -> AppResult<Vec<FilmDto>> {
        let films = self.films.list_films().await?;
        self.to_dtos(&films).await
    }

    pub async fn get_film(&self, id: FilmId) -> AppResult<FilmDto> {
        let film = self.require_film(id).await?;
        self.to_dto(&film).await
    }

    pub async fn create_film(&self, request: FilmRequest) -> AppResult<FilmDto> {
        request.validate()?;
        let new_film = mapper::new_film(&request)?;

        let film = self.films.add_film(new_film).await?;
        tracing::info!(film_id = film.id, "Created film '{}'", film.name);

        mapper::film_dto(&film, Vec::new())
    }

    pub async fn update_film(&self, request: FilmRequest) -> AppResult<FilmDto> {
        request.validate()?;
        let id = request
            .id
            .ok_or_else(|| AppError::NotEnoughData("Film id is required for update".to_string()))?;
        let new_film = mapper::new_film(&request)?;

        if !self.films.film_exists(id).await? {
            return Err(film_not_found(id));
        }

        let film = self.films.update_film(&new_film.with_id(id)).await?;
        tracing::info!(film_id = id, "Updated film");

        self.to_dto(&film).await
    }

    pub async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        self.require_film(film_id).await?;
        self.require_user(user_id).await?;

        self.films.add_like(film_id, user_id).await?;
        tracing::info!(film_id, user_id, "Like added");
        Ok(())
    }

    /// Removing a like that was never given is not an error.
    pub async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        let film = self.require_film(film_id).await?;
        self.require_user(user_id).await?;

        if film.likes.contains(&user_id) {
            self.films.remove_like(film_id, user_id).await?;
            tracing::info!(film_id, user_id, "Like removed");
        } else {
            tracing::debug!(film_id, user_id, "No like to remove");
        }
        Ok(())
    }

    /// Up to `count` films by descending like count. Equal counts keep
    /// ascending id order.
    pub async fn most_liked(&self, count: usize) -> AppResult<Vec<FilmDto>> {
        let mut films = self.films.list_films().await?;
        films.sort_by(|a, b| b.like_count().cmp(&a.like_count()));
        films.truncate(count);

        tracing::debug!(count, returned = films.len(), "Popular films");
        self.to_dtos(&films).await
    }

    async fn require_film(&self, id: FilmId) -> AppResult<Film> {
        self.films
            .get_film(id)
            .await?
            .ok_or_else(|| film_not_found(id))
    }

    async fn require_user(&self, id: UserId) -> AppResult<()> {
        if !self.users.user_exists(id).await? {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn to_dto(&self, film: &Film) -> AppResult<FilmDto> {
        let likes = self.films.likers_of(film.id).await?;
        mapper::film_dto(film, likes)
    }

    async fn to_dtos(&self, films: &[Film]) -> AppResult<Vec<FilmDto>> {
        try_join_all(films.iter().map(|film| self.to_dto(film))).await
    }
}

fn film_not_found(id: FilmId) -> AppError {
    AppError::NotFound(format!("Film {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryDatabase;
    use crate::models::{IdRef, NewUser};
    use chrono::NaiveDate;

    struct Fixture {
        db: Arc<InMemoryDatabase>,
        service: FilmService,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(InMemoryDatabase::new());
        let service = FilmService::new(db.clone(), db.clone());
        Fixture { db, service }
    }

    fn cars() -> FilmRequest {
        FilmRequest {
            id: None,
            name: "Cars".to_string(),
            description: "Pixar".to_string(),
            duration: 90,
            release_date: NaiveDate::from_ymd_opt(2005, 1, 1).unwrap(),
            mpa: Some(IdRef { id: 1 }),
            genres: vec![IdRef { id: 3 }],
        }
    }

    async fn user(db: &InMemoryDatabase, login: &str) -> UserId {
        db.add_user(NewUser {
            email: format!("{}@example.com", login),
            login: login.to_string(),
            name: login.to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_create_resolves_references() {
        let f = fixture();
        let dto = f.service.create_film(cars()).await.unwrap();

        assert!(dto.id > 0);
        assert_eq!(dto.mpa.name, "G");
        assert_eq!(dto.genres.len(), 1);
        assert_eq!(dto.genres[0].name, "Cartoon");
        assert!(dto.likes.is_empty());
        assert_eq!(f.service.get_film(dto.id).await.unwrap(), dto);
    }

    #[tokio::test]
    async fn test_update_requires_known_id() {
        let f = fixture();

        let missing_id = f.service.update_film(cars()).await;
        assert!(matches!(missing_id, Err(AppError::NotEnoughData(_))));

        let mut unknown = cars();
        unknown.id = Some(999);
        assert!(matches!(f.service.update_film(unknown).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_replaces_genres_and_keeps_likes() {
        let f = fixture();
        let ann = user(&f.db, "ann").await;
        let mut request = cars();
        request.genres = vec![IdRef { id: 1 }, IdRef { id: 2 }];
        let created = f.service.create_film(request.clone()).await.unwrap();
        f.service.add_like(created.id, ann).await.unwrap();

        request.id = Some(created.id);
        request.genres = vec![IdRef { id: 3 }];
        let updated = f.service.update_film(request.clone()).await.unwrap();
        let again = f.service.update_film(request).await.unwrap();

        let genre_ids: Vec<_> = updated.genres.iter().map(|g| g.id).collect();
        assert_eq!(genre_ids, vec![3]);
        assert_eq!(updated.likes, vec!["ann"]);
        assert_eq!(updated, again);
    }

    #[tokio::test]
    async fn test_like_requires_existing_film_and_user() {
        let f = fixture();
        let film = f.service.create_film(cars()).await.unwrap();
        let ann = user(&f.db, "ann").await;

        assert!(matches!(f.service.add_like(film.id, 42).await, Err(AppError::NotFound(_))));
        assert!(matches!(f.service.add_like(42, ann).await, Err(AppError::NotFound(_))));

        f.service.add_like(film.id, ann).await.unwrap();
        f.service.add_like(film.id, ann).await.unwrap();
        assert_eq!(f.service.get_film(film.id).await.unwrap().likes, vec!["ann"]);
    }

    #[tokio::test]
    async fn test_remove_like_twice_is_quiet() {
        let f = fixture();
        let film = f.service.create_film(cars()).await.unwrap();
        let ann = user(&f.db, "ann").await;
        f.service.add_like(film.id, ann).await.unwrap();

        f.service.remove_like(film.id, ann).await.unwrap();
        f.service.remove_like(film.id, ann).await.unwrap();
        assert!(f.service.get_film(film.id).await.unwrap().likes.is_empty());
    }

    #[tokio::test]
    async fn test_most_liked_orders_by_likes_then_id() {
        let f = fixture();
        let a = f.service.create_film(cars()).await.unwrap();
        let b = f.service.create_film(cars()).await.unwrap();
        let c = f.service.create_film(cars()).await.unwrap();
        let ann = user(&f.db, "ann").await;
        let bob = user(&f.db, "bob").await;

        f.service.add_like(c.id, ann).await.unwrap();
        f.service.add_like(c.id, bob).await.unwrap();
        f.service.add_like(b.id, ann).await.unwrap();

        let ids = |films: Vec<FilmDto>| films.into_iter().map(|film| film.id).collect::<Vec<_>>();
        assert_eq!(ids(f.service.most_liked(10).await.unwrap()), vec![c.id, b.id, a.id]);
        assert_eq!(ids(f.service.most_liked(2).await.unwrap()), vec![c.id, b.id]);
        assert!(f.service.most_liked(0).await.unwrap().is_empty());

        f.service.remove_like(c.id, ann).await.unwrap();
        f.service.remove_like(c.id, bob).await.unwrap();
        assert_eq!(ids(f.service.most_liked(10).await.unwrap()), vec![b.id, a.id, c.id]);
    }
}
