use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    models::{
        posts::{CommentRecord, NewPost, PostChanges, PostFilter, PostRecord},
        query::Pagination,
    },
    Result,
};

use super::PostgresRepo;

const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.excerpt, p.cover_image, p.author_id,
           u.username AS author_username, u.avatar AS author_avatar, u.bio AS author_bio,
           p.tags, p.category, p.published, p.views, p.likes, p.created_at, p.updated_at
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.user_id,
           u.username AS user_username, u.avatar AS user_avatar,
           c.content, c.created_at
    FROM post_comments c
    JOIN users u ON u.id = c.user_id
"#;

#[async_trait]
pub trait PostsRepository: Sync + Send {
    /// Published posts matching `filter`, newest first, plus the total count.
    async fn list_posts(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<(Vec<PostRecord>, i64)>;
    async fn find_post(&self, post_id: Uuid) -> Result<Option<PostRecord>>;
    /// Returns false when the post does not exist.
    async fn increment_views(&self, post_id: Uuid) -> Result<bool>;
    async fn create_post(&self, author_id: Uuid, post: NewPost) -> Result<Uuid>;
    async fn update_post(&self, post_id: Uuid, changes: &PostChanges) -> Result<()>;
    async fn delete_post(&self, post_id: Uuid) -> Result<()>;
    async fn set_likes(&self, post_id: Uuid, likes: &[Uuid]) -> Result<()>;
    /// Comments of the given posts, oldest first.
    async fn list_comments(&self, post_ids: &[Uuid]) -> Result<Vec<CommentRecord>>;
    async fn find_comment(&self, post_id: Uuid, comment_id: Uuid)
        -> Result<Option<CommentRecord>>;
    async fn create_comment(&self, post_id: Uuid, user_id: Uuid, content: &str) -> Result<()>;
    async fn delete_comment(&self, comment_id: Uuid) -> Result<()>;
    async fn count_published_by_author(&self, author_id: Uuid) -> Result<i64>;
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    builder.push(" WHERE p.published = TRUE");

    if let Some(search) = &filter.search {
        builder
            .push(" AND p.search_vector @@ plainto_tsquery('simple', ")
            .push_bind(search.clone())
            .push(")");
    }
    if let Some(category) = filter.category {
        builder.push(" AND p.category = ").push_bind(category);
    }
    if let Some(author) = filter.author {
        builder.push(" AND p.author_id = ").push_bind(author);
    }
}

#[async_trait]
impl PostsRepository for PostgresRepo {
    #[instrument(skip(self))]
    async fn list_posts(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<(Vec<PostRecord>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        push_filter(&mut count_query, filter);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut list_query = QueryBuilder::<Postgres>::new(POST_SELECT);
        push_filter(&mut list_query, filter);
        list_query
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let posts = list_query
            .build_query_as::<PostRecord>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(total, returned = posts.len(), "Post listing completed");
        Ok((posts, total))
    }

    #[instrument(skip(self))]
    async fn find_post(&self, post_id: Uuid) -> Result<Option<PostRecord>> {
        let post = sqlx::query_as::<_, PostRecord>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    #[instrument(skip(self))]
    async fn increment_views(&self, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE posts SET views = views + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, post), fields(title = %post.title))]
    async fn create_post(&self, author_id: Uuid, post: NewPost) -> Result<Uuid> {
        let id = Uuid::now_v7();

        sqlx::query(
            r#"
            INSERT INTO posts (id, title, content, excerpt, cover_image, author_id, tags, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(post.title)
        .bind(post.content)
        .bind(post.excerpt)
        .bind(post.cover_image)
        .bind(author_id)
        .bind(post.tags)
        .bind(post.category)
        .execute(&self.pool)
        .await?;

        tracing::info!(post_id = %id, "Post created");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn update_post(&self, post_id: Uuid, changes: &PostChanges) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                excerpt = COALESCE($4, excerpt),
                cover_image = COALESCE($5, cover_image),
                tags = COALESCE($6, tags),
                category = COALESCE($7, category),
                published = COALESCE($8, published),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(changes.excerpt.as_deref())
        .bind(changes.cover_image.as_deref())
        .bind(changes.tags.clone())
        .bind(changes.category)
        .bind(changes.published)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_likes(&self, post_id: Uuid, likes: &[Uuid]) -> Result<()> {
        sqlx::query("UPDATE posts SET likes = $2 WHERE id = $1")
            .bind(post_id)
            .bind(likes.to_vec())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_comments(&self, post_ids: &[Uuid]) -> Result<Vec<CommentRecord>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let comments = sqlx::query_as::<_, CommentRecord>(&format!(
            "{COMMENT_SELECT} WHERE c.post_id = ANY($1) ORDER BY c.created_at ASC, c.id ASC"
        ))
        .bind(post_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    #[instrument(skip(self))]
    async fn find_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<CommentRecord>> {
        let comment = sqlx::query_as::<_, CommentRecord>(&format!(
            "{COMMENT_SELECT} WHERE c.post_id = $1 AND c.id = $2"
        ))
        .bind(post_id)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    #[instrument(skip(self, content))]
    async fn create_comment(&self, post_id: Uuid, user_id: Uuid, content: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO post_comments (id, post_id, user_id, content)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_comment(&self, comment_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM post_comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn count_published_by_author(&self, author_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM posts WHERE author_id = $1 AND published = TRUE",
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
