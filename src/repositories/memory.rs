//! In-process repository used by service and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    models::{
        posts::{Category, CommentRecord, NewPost, PostChanges, PostFilter, PostRecord},
        query::Pagination,
        users::{NewUser, ProfileChanges, User, UserRole},
    },
    Error, Result,
};

use super::{posts_repo::PostsRepository, user_repo::UserRepository};

#[derive(Debug, Clone)]
struct StoredPost {
    id: Uuid,
    title: String,
    content: String,
    excerpt: Option<String>,
    cover_image: Option<String>,
    author_id: Uuid,
    tags: Vec<String>,
    category: Category,
    published: bool,
    views: i32,
    likes: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: Uuid,
    post_id: Uuid,
    user_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    users: Vec<User>,
    posts: Vec<StoredPost>,
    comments: Vec<StoredComment>,
}

#[derive(Default)]
pub struct MemoryRepo {
    store: Mutex<Store>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn record(&self, post: &StoredPost) -> PostRecord {
        let author = self.user(post.author_id);
        PostRecord {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone(),
            cover_image: post.cover_image.clone(),
            author_id: post.author_id,
            author_username: author.map(|a| a.username.clone()).unwrap_or_default(),
            author_avatar: author.map(|a| a.avatar.clone()).unwrap_or_default(),
            author_bio: author.map(|a| a.bio.clone()).unwrap_or_default(),
            tags: post.tags.clone(),
            category: post.category,
            published: post.published,
            views: post.views,
            likes: post.likes.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }

    fn comment_record(&self, comment: &StoredComment) -> CommentRecord {
        let user = self.user(comment.user_id);
        CommentRecord {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            user_username: user.map(|u| u.username.clone()).unwrap_or_default(),
            user_avatar: user.map(|u| u.avatar.clone()).unwrap_or_default(),
            content: comment.content.clone(),
            created_at: comment.created_at,
        }
    }

    fn post_mut(&mut self, id: Uuid) -> Result<&mut StoredPost> {
        self.posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound("Post not found".to_string()))
    }
}

fn matches(post: &StoredPost, filter: &PostFilter) -> bool {
    if !post.published {
        return false;
    }
    if let Some(search) = &filter.search {
        let haystack = format!("{} {}", post.title, post.content).to_lowercase();
        if !search
            .to_lowercase()
            .split_whitespace()
            .all(|word| haystack.contains(word))
        {
            return false;
        }
    }
    if filter.category.is_some_and(|c| c != post.category) {
        return false;
    }
    if filter.author.is_some_and(|a| a != post.author_id) {
        return false;
    }
    true
}

#[async_trait]
impl UserRepository for MemoryRepo {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let store = self.store.lock().unwrap();
        Ok(store.user(user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut store = self.store.lock().unwrap();
        if store.users.iter().any(|u| u.username == new_user.username) {
            return Err(Error::Duplicate("username".to_string()));
        }
        if store.users.iter().any(|u| u.email == new_user.email) {
            return Err(Error::Duplicate("email".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            username: new_user.username,
            email: new_user.email,
            password: new_user.password_hash,
            avatar: String::new(),
            bio: String::new(),
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };
        store.users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(&self, user_id: Uuid, changes: &ProfileChanges) -> Result<User> {
        let mut store = self.store.lock().unwrap();
        if let Some(username) = &changes.username {
            if store
                .users
                .iter()
                .any(|u| u.id != user_id && &u.username == username)
            {
                return Err(Error::Duplicate("username".to_string()));
            }
        }

        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        if let Some(bio) = &changes.bio {
            user.bio = bio.clone();
        }
        if let Some(avatar) = &changes.avatar {
            user.avatar = avatar.clone();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl PostsRepository for MemoryRepo {
    async fn list_posts(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<(Vec<PostRecord>, i64)> {
        let store = self.store.lock().unwrap();
        // Newest first; insertion order breaks timestamp ties.
        let mut matching: Vec<&StoredPost> =
            store.posts.iter().rev().filter(|p| matches(p, filter)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .map(|p| store.record(p))
            .collect();
        Ok((page, total))
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<PostRecord>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| store.record(p)))
    }

    async fn increment_views(&self, post_id: Uuid) -> Result<bool> {
        let mut store = self.store.lock().unwrap();
        match store.post_mut(post_id) {
            Ok(post) => {
                post.views += 1;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn create_post(&self, author_id: Uuid, post: NewPost) -> Result<Uuid> {
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();
        let id = Uuid::now_v7();
        store.posts.push(StoredPost {
            id,
            title: post.title,
            content: post.content,
            excerpt: post.excerpt,
            cover_image: post.cover_image,
            author_id,
            tags: post.tags,
            category: post.category,
            published: true,
            views: 0,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn update_post(&self, post_id: Uuid, changes: &PostChanges) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        let post = store.post_mut(post_id)?;
        if let Some(title) = &changes.title {
            post.title = title.clone();
        }
        if let Some(content) = &changes.content {
            post.content = content.clone();
        }
        if let Some(excerpt) = &changes.excerpt {
            post.excerpt = Some(excerpt.clone());
        }
        if let Some(cover_image) = &changes.cover_image {
            post.cover_image = Some(cover_image.clone());
        }
        if let Some(tags) = &changes.tags {
            post.tags = tags.clone();
        }
        if let Some(category) = changes.category {
            post.category = category;
        }
        if let Some(published) = changes.published {
            post.published = published;
        }
        post.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.posts.retain(|p| p.id != post_id);
        store.comments.retain(|c| c.post_id != post_id);
        Ok(())
    }

    async fn set_likes(&self, post_id: Uuid, likes: &[Uuid]) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.post_mut(post_id)?.likes = likes.to_vec();
        Ok(())
    }

    async fn list_comments(&self, post_ids: &[Uuid]) -> Result<Vec<CommentRecord>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .comments
            .iter()
            .filter(|c| post_ids.contains(&c.post_id))
            .map(|c| store.comment_record(c))
            .collect())
    }

    async fn find_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<CommentRecord>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .comments
            .iter()
            .find(|c| c.post_id == post_id && c.id == comment_id)
            .map(|c| store.comment_record(c)))
    }

    async fn create_comment(&self, post_id: Uuid, user_id: Uuid, content: &str) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.comments.push(StoredComment {
            id: Uuid::now_v7(),
            post_id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.comments.retain(|c| c.id != comment_id);
        Ok(())
    }

    async fn count_published_by_author(&self, author_id: Uuid) -> Result<i64> {
        let store = self.store.lock().unwrap();
        Ok(store
            .posts
            .iter()
            .filter(|p| p.author_id == author_id && p.published)
            .count() as i64)
    }
}
