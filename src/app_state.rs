use std::sync::Arc;

use crate::{
    config::{Config, StorageBackend},
    error::AppResult,
    infrastructure::{
        FilmStorage, FriendshipStorage, InMemoryDatabase, SqliteDatabase, UserStorage,
    },
    services::{FilmService, FriendshipService, ReferenceService, UserService},
};

#[derive(Clone)]
pub struct AppState {
    pub films: FilmService,
    pub users: UserService,
    pub friendships: FriendshipService,
    pub reference: ReferenceService,
}

impl AppState {
    pub async fn new(config: &Config) -> AppResult<Self> {
        match config.storage {
            StorageBackend::Sqlite => {
                let database = SqliteDatabase::new(&config.database).await?;
                tracing::info!(url = %config.database.url, "Using SQLite storage");
                Ok(Self::with_storage(Arc::new(database)))
            }
            StorageBackend::Memory => {
                tracing::info!("Using in-memory storage");
                Ok(Self::with_storage(Arc::new(InMemoryDatabase::new())))
            }
        }
    }

    /// Wire every service to one backend.
    pub fn with_storage<S>(storage: Arc<S>) -> Self
    where
        S: FilmStorage + UserStorage + FriendshipStorage + 'static,
    {
        Self {
            films: FilmService::new(storage.clone(), storage.clone()),
            users: UserService::new(storage.clone()),
            friendships: FriendshipService::new(storage.clone(), storage),
            reference: ReferenceService,
        }
    }
}
