use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppState,
    auth::OptionalAuthUser,
    error::{AppError, Result},
    models::{CommentResponse, CreateCommentRequest, VoteRequest, VoteResponse, VoteTarget},
    services::{comment_service, vote_service},
    store::ForumStore,
};

pub async fn create_comment<S: ForumStore>(
    State(state): State<AppState<S>>,
    auth_user: OptionalAuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreateCommentRequest>, AppError>,
) -> Result<(StatusCode, Json<CommentResponse>)> {
    let comment =
        comment_service::create_comment(state.store.as_ref(), auth_user.identity(), payload)
            .await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

pub async fn get_post_comments<S: ForumStore>(
    State(state): State<AppState<S>>,
    WithRejection(Path(post_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<Value>> {
    let comments: Vec<CommentResponse> =
        comment_service::list_comments(state.store.as_ref(), post_id)
            .await?
            .into_iter()
            .map(CommentResponse::from)
            .collect();

    Ok(Json(json!({
        "comments": comments,
        "post_id": post_id
    })))
}

pub async fn vote_comment<S: ForumStore>(
    State(state): State<AppState<S>>,
    auth_user: OptionalAuthUser,
    WithRejection(Path(comment_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<VoteRequest>, AppError>,
) -> Result<Json<VoteResponse>> {
    let response = vote_service::apply_vote(
        state.store.as_ref(),
        auth_user.identity(),
        VoteTarget::Comment(comment_id),
        payload.vote_type,
    )
    .await?;

    Ok(Json(response))
}
