use futures::future::try_join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::infrastructure::UserStorage;
use crate::mapper;
use crate::models::{User, UserDto, UserId, UserRequest};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStorage>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStorage>) -> Self {
        Self { users }
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserDto>> {
        let users = self.users.list_users().await?;
        self.to_dtos(&users).await
    }

    pub async fn get_user(&self, id: UserId) -> AppResult<UserDto> {
        let user = self.require_user(id).await?;
        self.to_dto(&user).await
    }

    pub async fn create_user(&self, request: UserRequest) -> AppResult<UserDto> {
        request.validate()?;

        let user = self.users.add_user(mapper::new_user(&request)).await?;
        tracing::info!(user_id = user.id, "Created user '{}'", user.login);

        Ok(mapper::user_dto(&user, Vec::new()))
    }

    pub async fn update_user(&self, request: UserRequest) -> AppResult<UserDto> {
        request.validate()?;
        let id = request
            .id
            .ok_or_else(|| AppError::NotEnoughData("User id is required for update".to_string()))?;

        if !self.users.user_exists(id).await? {
            return Err(user_not_found(id));
        }

        let user = self
            .users
            .update_user(&mapper::new_user(&request).with_id(id))
            .await?;
        tracing::info!(user_id = id, "Updated user");

        self.to_dto(&user).await
    }

    /// Users this user has befriended, by ascending id.
    pub async fn friends_of(&self, id: UserId) -> AppResult<Vec<UserDto>> {
        let user = self.require_user(id).await?;
        self.resolve(&user.friends).await
    }

    /// Users both `id` and `other_id` have befriended.
    pub async fn mutual_friends(&self, id: UserId, other_id: UserId) -> AppResult<Vec<UserDto>> {
        let user = self.require_user(id).await?;
        let other = self.require_user(other_id).await?;

        let common: BTreeSet<UserId> = user.friends.intersection(&other.friends).copied().collect();
        tracing::debug!(id, other_id, common = common.len(), "Mutual friends");
        self.resolve(&common).await
    }

    async fn require_user(&self, id: UserId) -> AppResult<User> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    async fn resolve(&self, ids: &BTreeSet<UserId>) -> AppResult<Vec<UserDto>> {
        let found = try_join_all(ids.iter().map(|id| self.users.get_user(*id))).await?;
        let users: Vec<User> = found.into_iter().flatten().collect();
        self.to_dtos(&users).await
    }

    async fn to_dto(&self, user: &User) -> AppResult<UserDto> {
        let emails = self.users.friend_emails(user.id).await?;
        Ok(mapper::user_dto(user, emails))
    }

    async fn to_dtos(&self, users: &[User]) -> AppResult<Vec<UserDto>> {
        try_join_all(users.iter().map(|user| self.to_dto(user))).await
    }
}

fn user_not_found(id: UserId) -> AppError {
    AppError::NotFound(format!("User {} not found", id))
}
