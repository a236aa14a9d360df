// Storage seams - every backend implements all three traits

use crate::error::AppResult;
use crate::models::{Film, FilmId, GenreId, NewFilm, NewUser, User, UserId};
use async_trait::async_trait;
use std::collections::BTreeSet;

#[async_trait]
pub trait FilmStorage: Send + Sync {
    /// All films in ascending id order, each with its genres and likes.
    async fn list_films(&self) -> AppResult<Vec<Film>>;
    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>>;
    async fn film_exists(&self, id: FilmId) -> AppResult<bool>;

    /// Persist the film and its genre associations as one unit.
    async fn add_film(&self, film: NewFilm) -> AppResult<Film>;

    /// Replace every scalar field and the genre set of an existing film.
    /// Likes are untouched. Fails with `NotFound` if the id is unknown.
    async fn update_film(&self, film: &Film) -> AppResult<Film>;

    /// Both genre operations fail with `NotFound` if the film is unknown.
    async fn add_genres(&self, film_id: FilmId, genre_ids: &BTreeSet<GenreId>) -> AppResult<()>;
    async fn replace_genres(&self, film_id: FilmId, genre_ids: &BTreeSet<GenreId>)
        -> AppResult<()>;

    /// Recording an existing like again is a no-op.
    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()>;
    /// Removing an absent like is a no-op.
    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()>;

    /// Display names of the users who liked the film, by ascending user id.
    async fn likers_of(&self, film_id: FilmId) -> AppResult<Vec<String>>;
}

#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn list_users(&self) -> AppResult<Vec<User>>;
    async fn get_user(&self, id: UserId) -> AppResult<Option<User>>;
    async fn user_exists(&self, id: UserId) -> AppResult<bool>;
    async fn add_user(&self, user: NewUser) -> AppResult<User>;

    /// Replace the scalar fields of an existing user, keeping its friends.
    async fn update_user(&self, user: &User) -> AppResult<User>;

    /// Emails of the users this user has befriended, by ascending friend id.
    async fn friend_emails(&self, user_id: UserId) -> AppResult<Vec<String>>;
}

/// Friendship is a directed edge: `add_friend(a, b)` puts `b` into `a`'s
/// friend set only.
#[async_trait]
pub trait FriendshipStorage: Send + Sync {
    async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()>;
    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()>;
    async fn are_friends(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool>;
}
