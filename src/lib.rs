pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod ranking;
pub mod services;
pub mod store;
pub mod wallet;

use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::{WALLET_ADDRESS_HEADER, WALLET_CHAIN_HEADER},
    config::Config,
    store::ForumStore,
};

pub struct AppState<S> {
    pub store: Arc<S>,
    pub config: Arc<Config>,
}

impl<S> AppState<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }
}

// Manual impl: cloning the state never requires `S: Clone`
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

pub fn create_app<S: ForumStore>(state: AppState<S>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid allowed origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            AUTHORIZATION,
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(WALLET_ADDRESS_HEADER),
            HeaderName::from_static(WALLET_CHAIN_HEADER),
        ]);

    let forum_routes = Router::new()
        // Post routes
        .route(
            "/api/posts",
            get(handlers::posts::get_posts::<S>).post(handlers::posts::create_post::<S>),
        )
        .route("/api/posts/{post_id}", get(handlers::posts::get_post::<S>))
        .route(
            "/api/posts/{post_id}/vote",
            post(handlers::posts::vote_post::<S>),
        )
        .route(
            "/api/posts/{post_id}/comments",
            get(handlers::comments::get_post_comments::<S>),
        )
        // Comment routes
        .route(
            "/api/comments",
            post(handlers::comments::create_comment::<S>),
        )
        .route(
            "/api/comments/{comment_id}/vote",
            post(handlers::comments::vote_comment::<S>),
        );

    Router::new()
        .route("/api/health", get(handlers::health))
        .merge(forum_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
