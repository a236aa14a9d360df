use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use crate::infrastructure::aggregate::{aggregate, FanOutRow};
use crate::infrastructure::storage::{FilmStorage, FriendshipStorage, UserStorage};
use crate::models::{
    Film, FilmId, GenreId, NewFilm, NewUser, User, UserId, GENRES, MPA_RATINGS,
};

const SELECT_FILMS: &str = r#"
    SELECT f.id, f.name, f.description, f.duration, f.release_date, f.rating_id,
           fg.genre_id, fl.user_id AS liker_id
    FROM films f
    LEFT JOIN film_genre fg ON fg.film_id = f.id
    LEFT JOIN film_likes fl ON fl.film_id = f.id
"#;

const SELECT_USERS: &str = r#"
    SELECT u.id, u.email, u.login, u.name, u.birthday, fr.friend_id
    FROM users u
    LEFT JOIN friendship fr ON fr.user_id = u.id
"#;

const SCHEMA: [(&str, &str); 7] = [
    (
        "ratings",
        "CREATE TABLE IF NOT EXISTS ratings (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
    ),
    (
        "genres",
        "CREATE TABLE IF NOT EXISTS genres (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
    ),
    (
        "films",
        "CREATE TABLE IF NOT EXISTS films (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            duration INTEGER NOT NULL,
            release_date TEXT NOT NULL,
            rating_id INTEGER NOT NULL REFERENCES ratings(id)
        )",
    ),
    (
        "film_genre",
        "CREATE TABLE IF NOT EXISTS film_genre (
            film_id INTEGER NOT NULL REFERENCES films(id) ON DELETE CASCADE,
            genre_id INTEGER NOT NULL REFERENCES genres(id),
            PRIMARY KEY (film_id, genre_id)
        )",
    ),
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL,
            login TEXT NOT NULL,
            name TEXT NOT NULL,
            birthday TEXT NOT NULL
        )",
    ),
    (
        "film_likes",
        "CREATE TABLE IF NOT EXISTS film_likes (
            film_id INTEGER NOT NULL REFERENCES films(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (film_id, user_id)
        )",
    ),
    (
        "friendship",
        "CREATE TABLE IF NOT EXISTS friendship (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            friend_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, friend_id)
        )",
    ),
];

/// One row of the film × genre × like join.
#[derive(Debug, sqlx::FromRow)]
struct FilmRow {
    id: FilmId,
    name: String,
    description: String,
    duration: i32,
    release_date: NaiveDate,
    rating_id: i64,
    genre_id: Option<GenreId>,
    liker_id: Option<UserId>,
}

impl FanOutRow for FilmRow {
    type Key = FilmId;
    type Entity = Film;

    fn key(&self) -> FilmId {
        self.id
    }

    fn to_entity(&self) -> Film {
        Film {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            duration: self.duration,
            release_date: self.release_date,
            mpa_id: self.rating_id,
            genre_ids: BTreeSet::new(),
            likes: BTreeSet::new(),
        }
    }

    fn absorb_into(&self, film: &mut Film) {
        if let Some(genre_id) = self.genre_id {
            film.genre_ids.insert(genre_id);
        }
        if let Some(liker_id) = self.liker_id {
            film.likes.insert(liker_id);
        }
    }
}

/// One row of the user × friendship join.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    login: String,
    name: String,
    birthday: NaiveDate,
    friend_id: Option<UserId>,
}

impl FanOutRow for UserRow {
    type Key = UserId;
    type Entity = User;

    fn key(&self) -> UserId {
        self.id
    }

    fn to_entity(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            login: self.login.clone(),
            name: self.name.clone(),
            birthday: self.birthday,
            friends: BTreeSet::new(),
        }
    }

    fn absorb_into(&self, user: &mut User) {
        if let Some(friend_id) = self.friend_id {
            user.friends.insert(friend_id);
        }
    }
}

/// SQLite-backed storage for films, users and their associations
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (creating if missing) the database at `config.url` and make sure
    /// the schema and reference rows exist.
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::DatabaseError(format!("Invalid database URL {}: {}", config.url, e))
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to {}: {}", config.url, e))
            })?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Private in-memory database for tests. A single long-lived connection
    /// keeps every query on the same memory instance.
    pub async fn new_in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::DatabaseError(format!("Invalid in-memory URL: {}", e)))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to in-memory SQLite: {}", e))
            })?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Create missing tables and seed the genre and rating tables.
    pub async fn initialize(&self) -> AppResult<()> {
        for (table, ddl) in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await.map_err(|e| {
                AppError::DatabaseError(format!("Failed to create {} table: {}", table, e))
            })?;
        }

        for genre in GENRES {
            sqlx::query("INSERT OR IGNORE INTO genres (id, name) VALUES (?, ?)")
                .bind(genre.id)
                .bind(genre.name)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to seed genres: {}", e)))?;
        }

        for rating in MPA_RATINGS {
            sqlx::query("INSERT OR IGNORE INTO ratings (id, name) VALUES (?, ?)")
                .bind(rating.id)
                .bind(rating.name)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to seed ratings: {}", e)))?;
        }

        tracing::debug!("SQLite schema ready");
        Ok(())
    }

    async fn fetch_films(&self, id: Option<FilmId>) -> AppResult<Vec<Film>> {
        let sql = match id {
            Some(_) => format!("{} WHERE f.id = ? ORDER BY f.id", SELECT_FILMS),
            None => format!("{} ORDER BY f.id", SELECT_FILMS),
        };
        let mut query = sqlx::query_as::<_, FilmRow>(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to load films: {}", e)))?;
        Ok(aggregate(rows))
    }

    async fn fetch_users(&self, id: Option<UserId>) -> AppResult<Vec<User>> {
        let sql = match id {
            Some(_) => format!("{} WHERE u.id = ? ORDER BY u.id", SELECT_USERS),
            None => format!("{} ORDER BY u.id", SELECT_USERS),
        };
        let mut query = sqlx::query_as::<_, UserRow>(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to load users: {}", e)))?;
        Ok(aggregate(rows))
    }

    async fn row_exists(&self, sql: &str, id: i64) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed existence check {}: {}", id, e)))?;
        Ok(found.is_some())
    }
}

async fn insert_genres(
    conn: &mut SqliteConnection,
    film_id: FilmId,
    genre_ids: &BTreeSet<GenreId>,
) -> AppResult<()> {
    for genre_id in genre_ids.iter().copied() {
        sqlx::query("INSERT OR IGNORE INTO film_genre (film_id, genre_id) VALUES (?, ?)")
            .bind(film_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to attach genre {} to film {}: {}",
                    genre_id, film_id, e
                ))
            })?;
    }
    Ok(())
}

async fn ensure_film(conn: &mut SqliteConnection, film_id: FilmId) -> AppResult<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM films WHERE id = ?")
        .bind(film_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to look up film {}: {}", film_id, e)))?;
    match found {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("Film {} not found", film_id))),
    }
}

async fn delete_genres(conn: &mut SqliteConnection, film_id: FilmId) -> AppResult<()> {
    sqlx::query("DELETE FROM film_genre WHERE film_id = ?")
        .bind(film_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to clear genres of film {}: {}", film_id, e))
        })?;
    Ok(())
}

fn tx_error(action: &str, e: sqlx::Error) -> AppError {
    AppError::DatabaseError(format!("Failed to {} transaction: {}", action, e))
}

#[async_trait]
impl FilmStorage for SqliteDatabase {
    async fn list_films(&self) -> AppResult<Vec<Film>> {
        self.fetch_films(None).await
    }

    async fn get_film(&self, id: FilmId) -> AppResult<Option<Film>> {
        Ok(self.fetch_films(Some(id)).await?.into_iter().next())
    }

    async fn film_exists(&self, id: FilmId) -> AppResult<bool> {
        self.row_exists("SELECT id FROM films WHERE id = ?", id).await
    }

    async fn add_film(&self, film: NewFilm) -> AppResult<Film> {
        let mut tx = self.pool.begin().await.map_err(|e| tx_error("begin", e))?;

        let result = sqlx::query(
            "INSERT INTO films (name, description, duration, release_date, rating_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.duration)
        .bind(film.release_date)
        .bind(film.mpa_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert film: {}", e)))?;

        let id = result.last_insert_rowid();
        if id <= 0 {
            return Err(AppError::Internal(
                "film insert did not yield a generated id".to_string(),
            ));
        }

        insert_genres(&mut tx, id, &film.genre_ids).await?;
        tx.commit().await.map_err(|e| tx_error("commit", e))?;

        Ok(film.with_id(id))
    }

    async fn update_film(&self, film: &Film) -> AppResult<Film> {
        let mut tx = self.pool.begin().await.map_err(|e| tx_error("begin", e))?;

        let result = sqlx::query(
            "UPDATE films SET name = ?, description = ?, duration = ?, release_date = ?, rating_id = ?
             WHERE id = ?",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.duration)
        .bind(film.release_date)
        .bind(film.mpa_id)
        .bind(film.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update film {}: {}", film.id, e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Film {} not found", film.id)));
        }

        delete_genres(&mut tx, film.id).await?;
        insert_genres(&mut tx, film.id, &film.genre_ids).await?;
        tx.commit().await.map_err(|e| tx_error("commit", e))?;

        self.get_film(film.id).await?.ok_or_else(|| {
            AppError::Internal(format!("Film {} vanished after update", film.id))
        })
    }

    async fn add_genres(&self, film_id: FilmId, genre_ids: &BTreeSet<GenreId>) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| tx_error("begin", e))?;
        ensure_film(&mut tx, film_id).await?;
        insert_genres(&mut tx, film_id, genre_ids).await?;
        tx.commit().await.map_err(|e| tx_error("commit", e))
    }

    async fn replace_genres(
        &self,
        film_id: FilmId,
        genre_ids: &BTreeSet<GenreId>,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| tx_error("begin", e))?;
        ensure_film(&mut tx, film_id).await?;
        delete_genres(&mut tx, film_id).await?;
        insert_genres(&mut tx, film_id, genre_ids).await?;
        tx.commit().await.map_err(|e| tx_error("commit", e))
    }

    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO film_likes (film_id, user_id) VALUES (?, ?)")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to add like of user {} to film {}: {}",
                    user_id, film_id, e
                ))
            })?;
        Ok(())
    }

    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        sqlx::query("DELETE FROM film_likes WHERE film_id = ? AND user_id = ?")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to remove like of user {} from film {}: {}",
                    user_id, film_id, e
                ))
            })?;
        Ok(())
    }

    async fn likers_of(&self, film_id: FilmId) -> AppResult<Vec<String>> {
        sqlx::query_scalar(
            "SELECT u.name FROM film_likes fl
             JOIN users u ON u.id = fl.user_id
             WHERE fl.film_id = ?
             ORDER BY u.id",
        )
        .bind(film_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to load likers of {}: {}", film_id, e)))
    }
}

#[async_trait]
impl UserStorage for SqliteDatabase {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.fetch_users(None).await
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.fetch_users(Some(id)).await?.into_iter().next())
    }

    async fn user_exists(&self, id: UserId) -> AppResult<bool> {
        self.row_exists("SELECT id FROM users WHERE id = ?", id).await
    }

    async fn add_user(&self, user: NewUser) -> AppResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (email, login, name, birthday) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert user: {}", e)))?;

        let id = result.last_insert_rowid();
        if id <= 0 {
            return Err(AppError::Internal(
                "user insert did not yield a generated id".to_string(),
            ));
        }
        Ok(user.with_id(id))
    }

    async fn update_user(&self, user: &User) -> AppResult<User> {
        let result = sqlx::query(
            "UPDATE users SET email = ?, login = ?, name = ?, birthday = ? WHERE id = ?",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update user {}: {}", user.id, e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user.id)));
        }

        self.get_user(user.id).await?.ok_or_else(|| {
            AppError::Internal(format!("User {} vanished after update", user.id))
        })
    }

    async fn friend_emails(&self, user_id: UserId) -> AppResult<Vec<String>> {
        sqlx::query_scalar(
            "SELECT u.email FROM friendship fr
             JOIN users u ON u.id = fr.friend_id
             WHERE fr.user_id = ?
             ORDER BY u.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to load friends of {}: {}", user_id, e))
        })
    }
}

#[async_trait]
impl FriendshipStorage for SqliteDatabase {
    async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO friendship (user_id, friend_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to add friend {} to user {}: {}",
                    friend_id, user_id, e
                ))
            })?;
        Ok(())
    }

    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        sqlx::query("DELETE FROM friendship WHERE user_id = ? AND friend_id = ?")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to remove friend {} from user {}: {}",
                    friend_id, user_id, e
                ))
            })?;
        Ok(())
    }

    async fn are_friends(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM friendship WHERE user_id = ? AND friend_id = ?")
                .bind(user_id)
                .bind(friend_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to check friendship: {}", e))
                })?;
        Ok(found.is_some())
    }
}
