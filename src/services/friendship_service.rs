use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::infrastructure::{FriendshipStorage, UserStorage};
use crate::models::UserId;

/// Adds and removes directed friendship edges between existing users.
#[derive(Clone)]
pub struct FriendshipService {
    users: Arc<dyn UserStorage>,
    friendships: Arc<dyn FriendshipStorage>,
}

impl FriendshipService {
    pub fn new(users: Arc<dyn UserStorage>, friendships: Arc<dyn FriendshipStorage>) -> Self {
        Self { users, friendships }
    }

    pub async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        if user_id == friend_id {
            return Err(AppError::Validation(format!(
                "User {} cannot befriend themselves",
                user_id
            )));
        }
        self.require_users(user_id, friend_id).await?;

        if self.friendships.are_friends(user_id, friend_id).await? {
            return Err(AppError::Conflict(format!(
                "User {} is already friends with user {}",
                user_id, friend_id
            )));
        }

        self.friendships.add_friend(user_id, friend_id).await?;
        tracing::info!(user_id, friend_id, "Friend added");
        Ok(())
    }

    /// Deleting a missing edge is not an error.
    pub async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        self.require_users(user_id, friend_id).await?;

        self.friendships.remove_friend(user_id, friend_id).await?;
        tracing::info!(user_id, friend_id, "Friend removed");
        Ok(())
    }

    pub async fn are_friends(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        self.friendships.are_friends(user_id, friend_id).await
    }

    async fn require_users(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        for id in [user_id, friend_id] {
            if !self.users.user_exists(id).await? {
                return Err(AppError::NotFound(format!("User {} not found", id)));
            }
        }
        Ok(())
    }
}
