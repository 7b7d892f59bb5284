use std::sync::Arc;

use uuid::Uuid;

use crate::{
    models::{
        posts::{PostFilter, PostListDto},
        query::Pagination,
        users::{FilterUserDto, ProfileChanges, User, UserProfileDto},
    },
    repositories::user_repo::UserRepository,
    services::posts::PostsService,
    Error, Result,
};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    posts: PostsService,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, posts: PostsService) -> Self {
        Self { repo, posts }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfileDto> {
        let user = self.get_user(user_id).await?;
        let post_count = self.posts.count_published_by_author(user.id).await?;

        Ok(UserProfileDto {
            user: FilterUserDto::filter_user(&user),
            post_count,
        })
    }

    /// Email is not part of `ProfileChanges` and cannot change here.
    pub async fn update_profile(&self, user: &User, changes: ProfileChanges) -> Result<User> {
        let updated = self.repo.update_profile(user.id, &changes).await?;
        tracing::info!(user_id = %updated.id, "Profile updated");
        Ok(updated)
    }

    pub async fn posts_by_author(
        &self,
        author_id: Uuid,
        pagination: Pagination,
    ) -> Result<PostListDto> {
        let filter = PostFilter {
            author: Some(author_id),
            ..Default::default()
        };
        self.posts.list_posts(filter, pagination).await
    }
}
