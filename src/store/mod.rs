//! The `ForumStore` trait: the narrow row-store interface the forum services
//! run against.
//!
//! Services never hold a global client; a store handle is built once in
//! `main` and injected through [`crate::AppState`].

mod memory;
mod postgres;

use std::{collections::HashMap, future::Future};

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Comment, Post, PostSort, Vote, VoteCounts, VoteDirection, VoteTarget};

pub use memory::MemoryForumStore;
pub use postgres::PgForumStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Row not found: {0}")]
    Missing(String),

    #[error("Duplicate vote by {user_id} on {target}")]
    DuplicateVote { user_id: String, target: VoteTarget },

    #[error("Count {0} does not fit in an aggregate column")]
    CountOverflow(i64),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Row-store operations over the posts, comments and votes tables.
///
/// No method is transactional with respect to another; callers composing
/// several calls must tolerate interleaving with concurrent writers.
pub trait ForumStore: Send + Sync + 'static {
    // ── Posts ───────────────────────────────────────────────────────────

    fn insert_post(&self, post: Post) -> impl Future<Output = StoreResult<Post>> + Send + '_;

    fn get_post(&self, id: Uuid) -> impl Future<Output = StoreResult<Option<Post>>> + Send + '_;

    /// All posts, fully materialised, in the order `sort` defines.
    fn list_posts(&self, sort: PostSort)
    -> impl Future<Output = StoreResult<Vec<Post>>> + Send + '_;

    // ── Comments ────────────────────────────────────────────────────────

    fn insert_comment(
        &self,
        comment: Comment,
    ) -> impl Future<Output = StoreResult<Comment>> + Send + '_;

    fn get_comment(
        &self,
        id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<Comment>>> + Send + '_;

    /// Comments of a post, oldest first.
    fn list_comments(
        &self,
        post_id: Uuid,
    ) -> impl Future<Output = StoreResult<Vec<Comment>>> + Send + '_;

    fn count_comments(&self, post_id: Uuid) -> impl Future<Output = StoreResult<i64>> + Send + '_;

    /// Comment counts for many posts in one round trip. Posts without
    /// comments are absent from the map.
    fn count_comments_for<'a>(
        &'a self,
        post_ids: &'a [Uuid],
    ) -> impl Future<Output = StoreResult<HashMap<Uuid, i64>>> + Send + 'a;

    // ── Votes ───────────────────────────────────────────────────────────

    fn find_vote<'a>(
        &'a self,
        user_id: &'a str,
        target: VoteTarget,
    ) -> impl Future<Output = StoreResult<Option<Vote>>> + Send + 'a;

    fn insert_vote(&self, vote: Vote) -> impl Future<Output = StoreResult<Vote>> + Send + '_;

    fn update_vote_direction(
        &self,
        vote_id: Uuid,
        direction: VoteDirection,
    ) -> impl Future<Output = StoreResult<()>> + Send + '_;

    fn delete_vote(&self, vote_id: Uuid) -> impl Future<Output = StoreResult<()>> + Send + '_;

    fn count_votes(
        &self,
        target: VoteTarget,
        direction: VoteDirection,
    ) -> impl Future<Output = StoreResult<i32>> + Send + '_;

    /// Overwrite the aggregate `upvotes` / `downvotes` columns of the target row.
    fn set_vote_counts(
        &self,
        target: VoteTarget,
        counts: VoteCounts,
    ) -> impl Future<Output = StoreResult<()>> + Send + '_;
}

pub(crate) fn count_to_i32(count: i64) -> StoreResult<i32> {
    i32::try_from(count).map_err(|_| StoreError::CountOverflow(count))
}
