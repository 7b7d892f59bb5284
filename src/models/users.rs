use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub avatar: String,
    pub bio: String,
    pub role: UserRole,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(
        min = 3,
        max = 30,
        message = "Username must be between 3 and 30 characters"
    ))]
    pub username: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Invalid email address")
    )]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    #[validate(length(
        min = 3,
        max = 30,
        message = "Username must be between 3 and 30 characters"
    ))]
    pub username: Option<String>,
    #[validate(length(max = 200, message = "Bio cannot exceed 200 characters"))]
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl UpdateProfileDto {
    /// An empty username means "leave it as is".
    pub fn normalized(mut self) -> Self {
        self.username = self.username.filter(|name| !name.is_empty());
        self
    }
}

impl From<UpdateProfileDto> for ProfileChanges {
    fn from(dto: UpdateProfileDto) -> Self {
        Self {
            username: dto.username,
            bio: dto.bio,
            avatar: dto.avatar,
        }
    }
}

/// A user as exposed over the API: everything but the password hash.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilterUserDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub bio: String,
    pub role: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id,
            username: user.username.to_owned(),
            email: user.email.to_owned(),
            avatar: user.avatar.to_owned(),
            bio: user.bio.to_owned(),
            role: user.role.to_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfileDto {
    #[serde(flatten)]
    pub user: FilterUserDto,
    #[serde(rename = "postCount")]
    pub post_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatedProfileDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub bio: String,
}

impl From<&User> for UpdatedProfileDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub token: String,
}
