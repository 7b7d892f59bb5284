use std::{collections::HashMap, sync::Arc};

use uuid::Uuid;

use crate::{
    models::{
        posts::{
            Comment, LikeResponseDto, NewPost, Post, PostChanges, PostFilter, PostListDto,
            PostRecord,
        },
        query::Pagination,
        users::User,
    },
    repositories::posts_repo::PostsRepository,
    Error, Result,
};

#[derive(Clone)]
pub struct PostsService {
    repo: Arc<dyn PostsRepository>,
}

/// Adds `user_id` to `likes` when absent, removes it when present.
/// Returns whether the user likes the post afterwards.
pub fn toggle_like(likes: &mut Vec<Uuid>, user_id: Uuid) -> bool {
    match likes.iter().position(|id| *id == user_id) {
        Some(index) => {
            likes.remove(index);
            false
        }
        None => {
            likes.push(user_id);
            true
        }
    }
}

fn post_not_found() -> Error {
    Error::NotFound("Post not found".to_string())
}

impl PostsService {
    pub fn new(repo: Arc<dyn PostsRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_posts(&self, filter: PostFilter, pagination: Pagination) -> Result<PostListDto> {
        let (records, total) = self.repo.list_posts(&filter, pagination).await?;

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let mut comments_by_post: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for record in self.repo.list_comments(&ids).await? {
            comments_by_post
                .entry(record.post_id)
                .or_default()
                .push(record.into());
        }

        let posts = records
            .into_iter()
            .map(|record| {
                let comments = comments_by_post.remove(&record.id).unwrap_or_default();
                Post::from_record(record, comments, false)
            })
            .collect();

        Ok(PostListDto {
            posts,
            current_page: pagination.page,
            total_pages: pagination.total_pages(total),
            total,
        })
    }

    /// Every fetch counts as a view, repeated ones by the same reader included.
    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        if !self.repo.increment_views(post_id).await? {
            return Err(post_not_found());
        }

        let record = self.find_record(post_id).await?;
        self.populate(record, true).await
    }

    pub async fn create_post(&self, author: &User, post: NewPost) -> Result<Post> {
        let post_id = self.repo.create_post(author.id, post).await?;

        let record = self.find_record(post_id).await?;
        self.populate(record, false).await
    }

    pub async fn update_post(
        &self,
        caller: &User,
        post_id: Uuid,
        changes: PostChanges,
    ) -> Result<Post> {
        let record = self.find_record(post_id).await?;
        if record.author_id != caller.id {
            return Err(Error::Forbidden(
                "Not authorized to update this post".to_string(),
            ));
        }

        self.repo.update_post(post_id, &changes).await?;

        let record = self.find_record(post_id).await?;
        self.populate(record, false).await
    }

    pub async fn delete_post(&self, caller: &User, post_id: Uuid) -> Result<()> {
        let record = self.find_record(post_id).await?;
        if record.author_id != caller.id {
            return Err(Error::Forbidden(
                "Not authorized to delete this post".to_string(),
            ));
        }

        self.repo.delete_post(post_id).await?;
        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    pub async fn toggle_like(&self, caller: &User, post_id: Uuid) -> Result<LikeResponseDto> {
        let mut likes = self.find_record(post_id).await?.likes;
        let is_liked = toggle_like(&mut likes, caller.id);

        self.repo.set_likes(post_id, &likes).await?;

        Ok(LikeResponseDto {
            likes: likes.len(),
            is_liked,
        })
    }

    pub async fn add_comment(
        &self,
        caller: &User,
        post_id: Uuid,
        content: &str,
    ) -> Result<Vec<Comment>> {
        self.find_record(post_id).await?;
        self.repo.create_comment(post_id, caller.id, content).await?;

        self.comments(post_id).await
    }

    pub async fn delete_comment(
        &self,
        caller: &User,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<()> {
        self.find_record(post_id).await?;

        let comment = self
            .repo
            .find_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| Error::NotFound("Comment not found".to_string()))?;

        if comment.user_id != caller.id {
            return Err(Error::Forbidden(
                "Not authorized to delete this comment".to_string(),
            ));
        }

        self.repo.delete_comment(comment_id).await
    }

    pub async fn count_published_by_author(&self, author_id: Uuid) -> Result<i64> {
        self.repo.count_published_by_author(author_id).await
    }

    async fn find_record(&self, post_id: Uuid) -> Result<PostRecord> {
        self.repo
            .find_post(post_id)
            .await?
            .ok_or_else(post_not_found)
    }

    async fn comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let records = self.repo.list_comments(&[post_id]).await?;
        Ok(records.into_iter().map(Comment::from).collect())
    }

    async fn populate(&self, record: PostRecord, with_bio: bool) -> Result<Post> {
        let comments = self.comments(record.id).await?;
        Ok(Post::from_record(record, comments, with_bio))
    }
}
