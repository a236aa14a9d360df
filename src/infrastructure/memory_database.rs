// In-memory storage - ordered maps behind async locks

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::infrastructure::id_generator::SequentialIdGenerator;
use crate::infrastructure::storage::{FilmStorage, FriendshipStorage, UserStorage};
use crate::models::{Film, FilmId, GenreId, NewFilm, NewUser, User, UserId};

/// Keeps every film and user in memory. When both maps are needed, `films`
/// is locked before `users`.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    films: RwLock<BTreeMap<FilmId, Film>>,
    users: RwLock<BTreeMap<UserId, User>>,
    film_ids: SequentialIdGenerator,
    user_ids: SequentialIdGenerator,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

fn film_not_found(id: FilmId) -> AppError {
    AppError::NotFound(format!("Film {} not found", id))
}

fn user_not_found(id: UserId) -> AppError {
    AppError::NotFound(format!("User {} not found", id))
}

#[async_trait]
impl FilmStorage for InMemoryDatabase {
    async fn list_films(&self) -> AppResult<Vec<Film>> {
        Ok(self.films.read().await.values().cloned().collect())
    }

    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>> {
        Ok(self.films.read().await.get(&id).cloned())
    }

    async fn film_exists(&self, id: FilmId) -> AppResult<bool> {
        Ok(self.films.read().await.contains_key(&id))
    }

    async fn add_film(&self, film: NewFilm) -> AppResult<Film> {
        let film = film.with_id(self.film_ids.next_id());
        self.films.write().await.insert(film.id, film.clone());
        Ok(film)
    }

    async fn update_film(&self, film: &Film) -> AppResult<Film> {
        let mut films = self.films.write().await;
        let stored = films.get_mut(&film.id).ok_or_else(|| film_not_found(film.id))?;

        let likes = std::mem::take(&mut stored.likes);
        *stored = Film {
            likes,
            ..film.clone()
        };
        Ok(stored.clone())
    }

    async fn add_genres(&self, film_id: FilmId, genre_ids: &BTreeSet<GenreId>) -> AppResult<()> {
        let mut films = self.films.write().await;
        let film = films.get_mut(&film_id).ok_or_else(|| film_not_found(film_id))?;
        film.genre_ids.extend(genre_ids.iter().copied());
        Ok(())
    }

    async fn replace_genres(
        &self,
        film_id: FilmId,
        genre_ids: &BTreeSet<GenreId>,
    ) -> AppResult<()> {
        let mut films = self.films.write().await;
        let film = films.get_mut(&film_id).ok_or_else(|| film_not_found(film_id))?;
        film.genre_ids = genre_ids.clone();
        Ok(())
    }

    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        let mut films = self.films.write().await;
        let film = films.get_mut(&film_id).ok_or_else(|| film_not_found(film_id))?;
        film.likes.insert(user_id);
        Ok(())
    }

    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        if let Some(film) = self.films.write().await.get_mut(&film_id) {
            film.likes.remove(&user_id);
        }
        Ok(())
    }

    async fn likers_of(&self, film_id: FilmId) -> AppResult<Vec<String>> {
        let films = self.films.read().await;
        let Some(film) = films.get(&film_id) else {
            return Ok(Vec::new());
        };

        let users = self.users.read().await;
        Ok(film
            .likes
            .iter()
            .filter_map(|id| users.get(id))
            .map(|user| user.name.clone())
            .collect())
    }
}

#[async_trait]
impl UserStorage for InMemoryDatabase {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn user_exists(&self, id: UserId) -> AppResult<bool> {
        Ok(self.users.read().await.contains_key(&id))
    }

    async fn add_user(&self, user: NewUser) -> AppResult<User> {
        let user = user.with_id(self.user_ids.next_id());
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> AppResult<User> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user.id).ok_or_else(|| user_not_found(user.id))?;

        let friends = std::mem::take(&mut stored.friends);
        *stored = User {
            friends,
            ..user.clone()
        };
        Ok(stored.clone())
    }

    async fn friend_emails(&self, user_id: UserId) -> AppResult<Vec<String>> {
        let users = self.users.read().await;
        let Some(user) = users.get(&user_id) else {
            return Ok(Vec::new());
        };

        Ok(user
            .friends
            .iter()
            .filter_map(|id| users.get(id))
            .map(|friend| friend.email.clone())
            .collect())
    }
}

#[async_trait]
impl FriendshipStorage for InMemoryDatabase {
    async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&friend_id) {
            return Err(user_not_found(friend_id));
        }
        let user = users.get_mut(&user_id).ok_or_else(|| user_not_found(user_id))?;
        user.friends.insert(friend_id);
        Ok(())
    }

    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.friends.remove(&friend_id);
        }
        Ok(())
    }

    async fn are_friends(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .get(&user_id)
            .is_some_and(|user| user.friends.contains(&friend_id)))
    }
}
