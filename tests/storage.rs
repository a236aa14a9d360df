// Behaviour every storage backend must share

use chrono::NaiveDate;
use std::collections::BTreeSet;

use filmorate::{
    infrastructure::{FilmStorage, FriendshipStorage, InMemoryDatabase, SqliteDatabase, UserStorage},
    models::{NewFilm, NewUser},
    AppError,
};

trait Backend: FilmStorage + UserStorage + FriendshipStorage {}
impl<T: FilmStorage + UserStorage + FriendshipStorage> Backend for T {}

fn film(name: &str, mpa_id: i64, genres: &[i64]) -> NewFilm {
    NewFilm {
        name: name.to_string(),
        description: format!("{} description", name),
        duration: 120,
        release_date: NaiveDate::from_ymd_opt(1999, 3, 31).unwrap(),
        mpa_id,
        genre_ids: genres.iter().copied().collect(),
    }
}

fn user(login: &str) -> NewUser {
    NewUser {
        email: format!("{}@example.com", login),
        login: login.to_string(),
        name: format!("{} name", login),
        birthday: NaiveDate::from_ymd_opt(1985, 7, 14).unwrap(),
    }
}

async fn films_round_trip(db: &dyn Backend) {
    let first = db.add_film(film("Matrix", 4, &[1, 2])).await.unwrap();
    let second = db.add_film(film("Up", 1, &[])).await.unwrap();
    assert!(first.id > 0);
    assert_ne!(first.id, second.id);

    let stored = db.get_film(first.id).await.unwrap().unwrap();
    assert_eq!(stored, first);
    assert_eq!(stored.genre_ids, BTreeSet::from([1, 2]));
    assert!(db.film_exists(second.id).await.unwrap());
    assert!(!db.film_exists(second.id + 100).await.unwrap());
    assert!(db.get_film(second.id + 100).await.unwrap().is_none());

    let listed: Vec<_> = db.list_films().await.unwrap().into_iter().map(|f| f.id).collect();
    assert_eq!(listed, vec![first.id, second.id]);

    db.replace_genres(first.id, &BTreeSet::from([3])).await.unwrap();
    assert_eq!(db.get_film(first.id).await.unwrap().unwrap().genre_ids, BTreeSet::from([3]));

    db.add_genres(second.id, &BTreeSet::from([5, 6])).await.unwrap();
    db.add_genres(second.id, &BTreeSet::from([6])).await.unwrap();
    assert_eq!(
        db.get_film(second.id).await.unwrap().unwrap().genre_ids,
        BTreeSet::from([5, 6])
    );
}

async fn film_update_keeps_likes(db: &dyn Backend) {
    let created = db.add_film(film("Alien", 4, &[4])).await.unwrap();
    let ann = db.add_user(user("ann")).await.unwrap();
    db.add_like(created.id, ann.id).await.unwrap();

    let mut changed = film("Aliens", 5, &[6, 4]).with_id(created.id);
    let updated = db.update_film(&changed).await.unwrap();
    assert_eq!(updated.name, "Aliens");
    assert_eq!(updated.mpa_id, 5);
    assert_eq!(updated.genre_ids, BTreeSet::from([4, 6]));
    assert_eq!(updated.likes, BTreeSet::from([ann.id]));

    changed.id = created.id + 100;
    assert!(matches!(db.update_film(&changed).await, Err(AppError::NotFound(_))));
}

async fn genre_writes_need_existing_film(db: &dyn Backend) {
    let known = db.add_film(film("Known", 1, &[2])).await.unwrap();
    let unknown = known.id + 100;

    assert!(matches!(
        db.add_genres(unknown, &BTreeSet::from([1])).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        db.replace_genres(unknown, &BTreeSet::from([1])).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(db.get_film(known.id).await.unwrap().unwrap().genre_ids, BTreeSet::from([2]));
}

async fn likes_are_sets(db: &dyn Backend) {
    let created = db.add_film(film("Heat", 3, &[])).await.unwrap();
    let ann = db.add_user(user("ann")).await.unwrap();
    let bob = db.add_user(user("bob")).await.unwrap();

    db.add_like(created.id, bob.id).await.unwrap();
    db.add_like(created.id, ann.id).await.unwrap();
    db.add_like(created.id, ann.id).await.unwrap();

    let stored = db.get_film(created.id).await.unwrap().unwrap();
    assert_eq!(stored.like_count(), 2);
    assert_eq!(db.likers_of(created.id).await.unwrap(), vec!["ann name", "bob name"]);

    db.remove_like(created.id, ann.id).await.unwrap();
    db.remove_like(created.id, ann.id).await.unwrap();
    assert_eq!(db.likers_of(created.id).await.unwrap(), vec!["bob name"]);
}

async fn users_round_trip(db: &dyn Backend) {
    let ann = db.add_user(user("ann")).await.unwrap();
    let bob = db.add_user(user("bob")).await.unwrap();
    assert_ne!(ann.id, bob.id);
    assert_eq!(db.get_user(ann.id).await.unwrap().unwrap(), ann);
    assert!(db.user_exists(bob.id).await.unwrap());
    assert!(!db.user_exists(bob.id + 10).await.unwrap());

    db.add_friend(ann.id, bob.id).await.unwrap();
    let mut renamed = ann.clone();
    renamed.email = "ann@new.example.com".to_string();
    let updated = db.update_user(&renamed).await.unwrap();
    assert_eq!(updated.email, "ann@new.example.com");
    assert_eq!(updated.friends, BTreeSet::from([bob.id]));

    renamed.id = bob.id + 10;
    assert!(matches!(db.update_user(&renamed).await, Err(AppError::NotFound(_))));

    assert_eq!(db.list_users().await.unwrap().len(), 2);
}

async fn friendship_is_directed(db: &dyn Backend) {
    let ann = db.add_user(user("ann")).await.unwrap();
    let bob = db.add_user(user("bob")).await.unwrap();

    db.add_friend(ann.id, bob.id).await.unwrap();
    assert!(db.are_friends(ann.id, bob.id).await.unwrap());
    assert!(!db.are_friends(bob.id, ann.id).await.unwrap());
    assert_eq!(db.friend_emails(ann.id).await.unwrap(), vec!["bob@example.com"]);
    assert!(db.friend_emails(bob.id).await.unwrap().is_empty());

    db.remove_friend(ann.id, bob.id).await.unwrap();
    db.remove_friend(ann.id, bob.id).await.unwrap();
    assert!(!db.are_friends(ann.id, bob.id).await.unwrap());
    assert!(db.get_user(ann.id).await.unwrap().unwrap().friends.is_empty());
}

macro_rules! backend_contract {
    ($name:ident) => {
        mod $name {
            use super::*;

            #[tokio::test]
            async fn memory() {
                $name(&InMemoryDatabase::new()).await;
            }

            #[tokio::test]
            async fn sqlite() {
                $name(&SqliteDatabase::new_in_memory().await.unwrap()).await;
            }
        }
    };
}

backend_contract!(films_round_trip);
backend_contract!(film_update_keeps_likes);
backend_contract!(genre_writes_need_existing_film);
backend_contract!(likes_are_sets);
backend_contract!(users_round_trip);
backend_contract!(friendship_is_directed);

#[tokio::test]
async fn sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = filmorate::config::DatabaseConfig {
        url: format!("sqlite:{}", dir.path().join("films.db").display()),
        max_connections: 2,
        acquire_timeout_secs: 5,
    };

    let id = {
        let db = SqliteDatabase::new(&config).await.unwrap();
        db.add_film(film("Persisted", 2, &[1])).await.unwrap().id
    };

    let reopened = SqliteDatabase::new(&config).await.unwrap();
    let stored = reopened.get_film(id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Persisted");
    assert_eq!(stored.genre_ids, BTreeSet::from([1]));
}
