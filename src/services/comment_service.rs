use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{Identity, require_identity},
    error::{AppError, Result},
    models::{Comment, CreateCommentRequest},
    services::post_service,
    store::ForumStore,
};

pub async fn create_comment<S: ForumStore>(
    store: &S,
    identity: Option<&Identity>,
    request: CreateCommentRequest,
) -> Result<Comment> {
    let author_id = require_identity(identity)?.user_id();

    let request = CreateCommentRequest {
        content: request.content.trim().to_string(),
        ..request
    };
    request.validate()?;

    // Verify post exists
    post_service::get_post(store, request.post_id).await?;

    // If replying to a comment, verify parent comment exists on the same post
    if let Some(parent_id) = request.parent_id {
        let parent = store
            .get_comment(parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;

        if parent.post_id != request.post_id {
            return Err(AppError::Validation(
                "Parent comment is not on the same post".to_string(),
            ));
        }
    }

    let comment = Comment {
        id: Uuid::new_v4(),
        post_id: request.post_id,
        parent_id: request.parent_id,
        content: request.content,
        author_id: author_id.to_string(),
        upvotes: 0,
        downvotes: 0,
        created_at: Utc::now(),
    };

    let comment = store.insert_comment(comment).await?;
    tracing::info!(
        "Created comment {} on post {} by {}",
        comment.id,
        comment.post_id,
        comment.author_id
    );

    Ok(comment)
}

/// Comments of a post, oldest first.
pub async fn list_comments<S: ForumStore>(store: &S, post_id: Uuid) -> Result<Vec<Comment>> {
    post_service::get_post(store, post_id).await?;
    let comments = store.list_comments(post_id).await?;
    Ok(comments)
}
