use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppState,
    auth::OptionalAuthUser,
    error::{AppError, Result},
    models::{CreatePostRequest, PostResponse, PostSort, VoteRequest, VoteResponse, VoteTarget},
    services::{post_service, vote_service},
    store::ForumStore,
};

#[derive(Debug, Deserialize)]
pub struct GetPostsQuery {
    pub sort: Option<String>,
}

pub async fn get_posts<S: ForumStore>(
    State(state): State<AppState<S>>,
    Query(params): Query<GetPostsQuery>,
) -> Result<Json<Value>> {
    let sort = match params.sort.as_deref() {
        Some(sort) => sort.parse::<PostSort>().map_err(AppError::Validation)?,
        None => PostSort::default(),
    };

    let posts = post_service::list_posts(state.store.as_ref(), sort).await?;
    let posts = post_service::to_responses(state.store.as_ref(), posts).await?;

    Ok(Json(json!({
        "posts": posts,
        "sort": sort,
    })))
}

pub async fn create_post<S: ForumStore>(
    State(state): State<AppState<S>>,
    auth_user: OptionalAuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreatePostRequest>, AppError>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    let post =
        post_service::create_post(state.store.as_ref(), auth_user.identity(), payload).await?;

    Ok((StatusCode::CREATED, Json(PostResponse::new(post, 0))))
}

pub async fn get_post<S: ForumStore>(
    State(state): State<AppState<S>>,
    WithRejection(Path(post_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<PostResponse>> {
    let post = post_service::get_post(state.store.as_ref(), post_id).await?;
    let comment_count = state.store.count_comments(post_id).await?;

    Ok(Json(PostResponse::new(post, comment_count)))
}

pub async fn vote_post<S: ForumStore>(
    State(state): State<AppState<S>>,
    auth_user: OptionalAuthUser,
    WithRejection(Path(post_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<VoteRequest>, AppError>,
) -> Result<Json<VoteResponse>> {
    let response = vote_service::apply_vote(
        state.store.as_ref(),
        auth_user.identity(),
        VoteTarget::Post(post_id),
        payload.vote_type,
    )
    .await?;

    Ok(Json(response))
}
