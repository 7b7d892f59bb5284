use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "post_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Technology,
    Life,
    Travel,
    Food,
    Other,
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technology" => Ok(Self::Technology),
            "life" => Ok(Self::Life),
            "travel" => Ok(Self::Travel),
            "food" => Ok(Self::Food),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}

/// A referenced user, reduced to what a post or comment needs to render it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AuthorSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Row shape of a post joined with its author.
#[derive(Debug, sqlx::FromRow, Clone)]
pub struct PostRecord {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub author_id: Uuid,
    pub author_username: String,
    pub author_avatar: String,
    pub author_bio: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub published: bool,
    pub views: i32,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow, Clone)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub user_username: String,
    pub user_avatar: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: AuthorSummary,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<CommentRecord> for Comment {
    fn from(record: CommentRecord) -> Self {
        Self {
            id: record.id,
            user: AuthorSummary {
                id: record.user_id,
                username: record.user_username,
                avatar: record.user_avatar,
                bio: None,
            },
            content: record.content,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub author: AuthorSummary,
    pub tags: Vec<String>,
    pub category: Category,
    pub published: bool,
    pub views: i32,
    pub likes: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Builds the API view of a post. The author's bio is only carried on
    /// the detail view.
    pub fn from_record(record: PostRecord, comments: Vec<Comment>, with_bio: bool) -> Self {
        Self {
            id: record.id,
            title: record.title,
            content: record.content,
            excerpt: record.excerpt,
            cover_image: record.cover_image,
            author: AuthorSummary {
                id: record.author_id,
                username: record.author_username,
                avatar: record.author_avatar,
                bio: with_bio.then_some(record.author_bio),
            },
            tags: record.tags,
            category: record.category,
            published: record.published,
            views: record.views,
            likes: record.likes,
            comments,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub category: Category,
}

/// Partial update of a post; `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Category>,
    pub published: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub author: Option<Uuid>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title must be between 1 and 100 characters"
    ))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(length(max = 300, message = "Excerpt cannot exceed 300 characters"))]
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<Category>,
}

impl From<CreatePostDto> for NewPost {
    fn from(dto: CreatePostDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            excerpt: dto.excerpt.filter(|e| !e.is_empty()),
            cover_image: dto.cover_image.filter(|c| !c.is_empty()),
            tags: normalize_tags(dto.tags),
            category: dto.category.unwrap_or_default(),
        }
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostDto {
    #[validate(length(max = 100, message = "Title cannot exceed 100 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
    #[validate(length(max = 300, message = "Excerpt cannot exceed 300 characters"))]
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Category>,
    pub published: Option<bool>,
}

impl From<UpdatePostDto> for PostChanges {
    fn from(dto: UpdatePostDto) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        Self {
            title: non_empty(dto.title),
            content: non_empty(dto.content),
            excerpt: non_empty(dto.excerpt),
            cover_image: non_empty(dto.cover_image),
            tags: dto.tags.map(normalize_tags),
            category: dto.category,
            published: dto.published,
        }
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CommentDto {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Comment must be between 1 and 500 characters"
    ))]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LikeResponseDto {
    pub likes: usize,
    #[serde(rename = "isLiked")]
    pub is_liked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListDto {
    pub posts: Vec<Post>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total: i64,
}
