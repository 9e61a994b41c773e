use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{Identity, require_identity},
    error::{AppError, Result},
    models::{CreatePostRequest, Post, PostResponse, PostSort},
    store::ForumStore,
};

pub async fn create_post<S: ForumStore>(
    store: &S,
    identity: Option<&Identity>,
    request: CreatePostRequest,
) -> Result<Post> {
    let author_id = require_identity(identity)?.user_id();

    // Whitespace-only fields count as empty
    let request = CreatePostRequest {
        title: request.title.trim().to_string(),
        content: request.content.trim().to_string(),
        media_urls: request
            .media_urls
            .iter()
            .map(|url| url.trim().to_string())
            .collect(),
    };
    request.validate()?;

    let now = Utc::now();
    let post = Post {
        id: Uuid::new_v4(),
        title: request.title,
        content: request.content,
        author_id: author_id.to_string(),
        upvotes: 0,
        downvotes: 0,
        media_urls: request.media_urls,
        created_at: now,
        updated_at: now,
    };

    let post = store.insert_post(post).await?;
    tracing::info!("Created post {} by {}", post.id, post.author_id);

    Ok(post)
}

pub async fn get_post<S: ForumStore>(store: &S, post_id: Uuid) -> Result<Post> {
    store
        .get_post(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

/// Every post, ordered by `sort`. Not paginated.
pub async fn list_posts<S: ForumStore>(store: &S, sort: PostSort) -> Result<Vec<Post>> {
    let posts = store.list_posts(sort).await?;
    tracing::debug!("Listed {} posts sorted by {}", posts.len(), sort);
    Ok(posts)
}

/// Attach display fields and comment counts.
pub async fn to_responses<S: ForumStore>(
    store: &S,
    posts: Vec<Post>,
) -> Result<Vec<PostResponse>> {
    let ids: Vec<Uuid> = posts.iter().map(|post| post.id).collect();
    let counts = store.count_comments_for(&ids).await?;

    Ok(posts
        .into_iter()
        .map(|post| {
            let comment_count = counts.get(&post.id).copied().unwrap_or(0);
            PostResponse::new(post, comment_count)
        })
        .collect())
}
