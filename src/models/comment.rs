use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::{AuthorSummary, VoteCounts};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub author_id: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn vote_counts(&self) -> VoteCounts {
        VoteCounts {
            upvotes: self.upvotes,
            downvotes: self.downvotes,
        }
    }
}

// Create comment request
#[derive(Debug, Validate, Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: String,
    pub parent_id: Option<Uuid>,
}

// Comments are returned flat, in creation order; clients rebuild the tree from parent_id
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub author_id: String,
    pub author: AuthorSummary,
    pub upvotes: i32,
    pub downvotes: i32,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            author: AuthorSummary::for_author(&comment.author_id),
            score: comment.vote_counts().score(),
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            content: comment.content,
            author_id: comment.author_id,
            upvotes: comment.upvotes,
            downvotes: comment.downvotes,
            created_at: comment.created_at,
        }
    }
}
