use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{Comment, Post, PostSort, Vote, VoteCounts, VoteDirection, VoteRow, VoteTarget},
    ranking,
};

use super::{ForumStore, StoreError, StoreResult, count_to_i32};

/// [`ForumStore`] over the `forum_posts`, `forum_comments` and `forum_votes`
/// tables. Cloning is cheap; the pool is reference-counted.
#[derive(Clone)]
pub struct PgForumStore {
    db: PgPool,
}

impl PgForumStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl ForumStore for PgForumStore {
    async fn insert_post(&self, post: Post) -> StoreResult<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO forum_posts (
                id, title, content, author_id, upvotes, downvotes,
                media_urls, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author_id)
        .bind(post.upvotes)
        .bind(post.downvotes)
        .bind(&post.media_urls)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.db)
        .await?;

        Ok(post)
    }

    async fn get_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM forum_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(post)
    }

    async fn list_posts(&self, sort: PostSort) -> StoreResult<Vec<Post>> {
        let query = format!(
            "SELECT * FROM forum_posts ORDER BY {}",
            ranking::order_by_clause(sort)
        );

        let posts = sqlx::query_as::<_, Post>(&query)
            .fetch_all(&self.db)
            .await?;

        Ok(posts)
    }

    async fn insert_comment(&self, comment: Comment) -> StoreResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO forum_comments (
                id, post_id, parent_id, content, author_id, upvotes, downvotes, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, post_id, parent_id, content, author_id, upvotes, downvotes, created_at
            "#,
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.parent_id)
        .bind(&comment.content)
        .bind(&comment.author_id)
        .bind(comment.upvotes)
        .bind(comment.downvotes)
        .bind(comment.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, parent_id, content, author_id, upvotes, downvotes, created_at
            FROM forum_comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(comment)
    }

    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, parent_id, content, author_id, upvotes, downvotes, created_at
            FROM forum_comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.db)
        .await?;

        Ok(comments)
    }

    async fn count_comments(&self, post_id: Uuid) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM forum_comments WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(&self.db)
                .await?;

        Ok(count)
    }

    async fn count_comments_for(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT post_id, COUNT(*)
            FROM forum_comments
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn find_vote(&self, user_id: &str, target: VoteTarget) -> StoreResult<Option<Vote>> {
        // IS NOT DISTINCT FROM so the NULL side of the target matches too
        let row = sqlx::query_as::<_, VoteRow>(
            r#"
            SELECT id, user_id, post_id, comment_id, vote_type, created_at
            FROM forum_votes
            WHERE user_id = $1
              AND post_id IS NOT DISTINCT FROM $2
              AND comment_id IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(user_id)
        .bind(target.post_id())
        .bind(target.comment_id())
        .fetch_optional(&self.db)
        .await?;

        row.map(Vote::try_from).transpose()
    }

    async fn insert_vote(&self, vote: Vote) -> StoreResult<Vote> {
        let result = sqlx::query_as::<_, VoteRow>(
            r#"
            INSERT INTO forum_votes (id, user_id, post_id, comment_id, vote_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, post_id, comment_id, vote_type, created_at
            "#,
        )
        .bind(vote.id)
        .bind(&vote.user_id)
        .bind(vote.target.post_id())
        .bind(vote.target.comment_id())
        .bind(vote.direction.as_str())
        .bind(vote.created_at)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(row) => Vote::try_from(row),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateVote {
                    user_id: vote.user_id,
                    target: vote.target,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_vote_direction(
        &self,
        vote_id: Uuid,
        direction: VoteDirection,
    ) -> StoreResult<()> {
        let result = sqlx::query("UPDATE forum_votes SET vote_type = $1 WHERE id = $2")
            .bind(direction.as_str())
            .bind(vote_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("vote {}", vote_id)));
        }

        Ok(())
    }

    async fn delete_vote(&self, vote_id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM forum_votes WHERE id = $1")
            .bind(vote_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn count_votes(&self, target: VoteTarget, direction: VoteDirection) -> StoreResult<i32> {
        let query = match target {
            VoteTarget::Post(_) => {
                "SELECT COUNT(*) FROM forum_votes WHERE post_id = $1 AND vote_type = $2"
            }
            VoteTarget::Comment(_) => {
                "SELECT COUNT(*) FROM forum_votes WHERE comment_id = $1 AND vote_type = $2"
            }
        };
        let id = match target {
            VoteTarget::Post(id) | VoteTarget::Comment(id) => id,
        };

        let count: i64 = sqlx::query_scalar(query)
            .bind(id)
            .bind(direction.as_str())
            .fetch_one(&self.db)
            .await?;

        count_to_i32(count)
    }

    async fn set_vote_counts(&self, target: VoteTarget, counts: VoteCounts) -> StoreResult<()> {
        let (query, id) = match target {
            VoteTarget::Post(id) => (
                "UPDATE forum_posts SET upvotes = $1, downvotes = $2 WHERE id = $3",
                id,
            ),
            VoteTarget::Comment(id) => (
                "UPDATE forum_comments SET upvotes = $1, downvotes = $2 WHERE id = $3",
                id,
            ),
        };

        let result = sqlx::query(query)
            .bind(counts.upvotes)
            .bind(counts.downvotes)
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(target.to_string()));
        }

        Ok(())
    }
}
