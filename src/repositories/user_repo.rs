use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    models::users::{NewUser, ProfileChanges, User},
    Error, Result,
};

use super::PostgresRepo;

const USER_COLUMNS: &str =
    "id, username, email, password, avatar, bio, role, created_at, updated_at";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_username_or_email(&self, username: &str, email: &str)
        -> Result<Option<User>>;
    async fn create_user(&self, new_user: NewUser) -> Result<User>;
    async fn update_profile(&self, user_id: Uuid, changes: &ProfileChanges) -> Result<User>;
}

#[async_trait]
impl UserRepository for PostgresRepo {
    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        tracing::debug!(user_found = user.is_some(), "User query completed");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        tracing::debug!(user_found = user.is_some(), "User query completed");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2 LIMIT 1"
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, new_user), fields(username = %new_user.username))]
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(new_user.username)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn update_profile(&self, user_id: Uuid, changes: &ProfileChanges) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                bio = COALESCE($3, bio),
                avatar = COALESCE($4, avatar),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(changes.username.as_deref())
        .bind(changes.bio.as_deref())
        .bind(changes.avatar.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| Error::NotFound("User not found".to_string()))
    }
}
