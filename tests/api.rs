//! End-to-end tests of the HTTP surface over the in-memory store.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use crypto_forum::{
    AppState,
    auth::{Claims, WALLET_ADDRESS_HEADER, WALLET_CHAIN_HEADER},
    config::Config,
    create_app,
    store::MemoryForumStore,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "integration-secret";
const ALICE: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
const BOB: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

fn app() -> Router {
    create_app(AppState::new(MemoryForumStore::new(), Config::in_memory(SECRET)))
}

enum Caller<'a> {
    Anonymous,
    Wallet { chain: &'a str, address: &'a str },
    Bearer(String),
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    caller: &Caller<'_>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    match caller {
        Caller::Anonymous => {}
        Caller::Wallet { chain, address } => {
            builder = builder
                .header(WALLET_ADDRESS_HEADER, *address)
                .header(WALLET_CHAIN_HEADER, *chain);
        }
        Caller::Bearer(token) => {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn alice() -> Caller<'static> {
    Caller::Wallet {
        chain: "solana",
        address: ALICE,
    }
}

fn bob() -> Caller<'static> {
    Caller::Wallet {
        chain: "ethereum",
        address: BOB,
    }
}

async fn cast_vote(
    app: &Router,
    uri: &str,
    caller: &Caller<'_>,
    vote_type: &str,
) -> (StatusCode, Value) {
    send(app, "POST", uri, caller, Some(json!({ "vote_type": vote_type }))).await
}

async fn create_post(app: &Router, caller: &Caller<'_>, title: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/posts",
        caller,
        Some(json!({ "title": title, "content": "body text" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/health", &Caller::Anonymous, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_post_with_wallet_identity() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/posts",
        &alice(),
        Some(json!({
            "title": "SOL flips ETH?",
            "content": "thoughts",
            "media_urls": ["https://example.com/chart.png"]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author_id"], ALICE);
    assert_eq!(body["author"]["username"], "User_9zYtAWWM");
    assert_eq!(body["author"]["avatar_url"], "/placeholder.svg");
    assert_eq!(body["upvotes"], 0);
    assert_eq!(body["downvotes"], 0);
    assert_eq!(body["score"], 0);
    assert_eq!(body["comment_count"], 0);
}

#[tokio::test]
async fn create_post_requires_identity() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/posts",
        &Caller::Anonymous,
        Some(json!({ "title": "t", "content": "c" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn empty_title_is_bad_request_and_nothing_is_listed() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        &alice(),
        Some(json!({ "title": "", "content": "body" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listing) = send(&app, "GET", "/api/posts?sort=new", &Caller::Anonymous, None).await;
    assert_eq!(listing["posts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn session_token_identifies_author() {
    let app = app();
    let (token, _) = Claims::new("session-subject-1234", SECRET, Duration::hours(1)).unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/posts",
        &Caller::Bearer(token),
        Some(json!({ "title": "t", "content": "c" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author_id"], "session-subject-1234");
}

#[tokio::test]
async fn forged_session_token_is_unauthorized() {
    let app = app();
    let (token, _) = Claims::new("intruder", "wrong-secret", Duration::hours(1)).unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/posts",
        &Caller::Bearer(token),
        Some(json!({ "title": "t", "content": "c" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn malformed_wallet_address_is_bad_request() {
    let app = app();
    let caller = Caller::Wallet {
        chain: "ethereum",
        address: "0xnothex",
    };
    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        &caller,
        Some(json!({ "title": "t", "content": "c" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_vote_lifecycle() {
    let app = app();
    let post_id = create_post(&app, &bob(), "vote on me").await;
    let uri = format!("/api/posts/{post_id}/vote");

    let (status, body) = cast_vote(&app, &uri, &alice(), "up").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((body["upvotes"].as_i64(), body["downvotes"].as_i64()), (Some(1), Some(0)));
    assert_eq!(body["user_vote"], "up");

    let (_, body) = cast_vote(&app, &uri, &alice(), "down").await;
    assert_eq!((body["upvotes"].as_i64(), body["downvotes"].as_i64()), (Some(0), Some(1)));
    assert_eq!(body["score"], -1);

    let (_, body) = cast_vote(&app, &uri, &alice(), "down").await;
    assert_eq!((body["upvotes"].as_i64(), body["downvotes"].as_i64()), (Some(0), Some(0)));
    assert!(body["user_vote"].is_null());

    let post_uri = format!("/api/posts/{post_id}");
    let (_, post) = send(&app, "GET", &post_uri, &Caller::Anonymous, None).await;
    assert_eq!(post["upvotes"], 0);
    assert_eq!(post["downvotes"], 0);
}

#[tokio::test]
async fn vote_requires_identity_and_existing_target() {
    let app = app();
    let post_id = create_post(&app, &bob(), "p").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/posts/{post_id}/vote"),
        &Caller::Anonymous,
        Some(json!({ "vote_type": "up" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts/00000000-0000-0000-0000-000000000000/vote",
        &alice(),
        Some(json!({ "vote_type": "up" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_sorts_and_rejects_unknown_sort() {
    let app = app();
    let older = create_post(&app, &bob(), "older").await;
    let newer = create_post(&app, &bob(), "newer").await;

    send(
        &app,
        "POST",
        &format!("/api/posts/{older}/vote"),
        &alice(),
        Some(json!({ "vote_type": "up" })),
    )
    .await;

    let ids = |body: &Value| -> Vec<String> {
        body["posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, body) = send(&app, "GET", "/api/posts?sort=new", &Caller::Anonymous, None).await;
    assert_eq!(ids(&body), vec![newer.clone(), older.clone()]);

    let (_, body) = send(&app, "GET", "/api/posts?sort=top", &Caller::Anonymous, None).await;
    assert_eq!(ids(&body), vec![older.clone(), newer.clone()]);

    let (_, body) = send(&app, "GET", "/api/posts", &Caller::Anonymous, None).await;
    assert_eq!(body["sort"], "hot");
    assert_eq!(ids(&body), vec![newer, older]);

    let (status, _) = send(&app, "GET", "/api/posts?sort=rising", &Caller::Anonymous, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comments_threads_and_votes() {
    let app = app();
    let post_id = create_post(&app, &bob(), "discussion").await;

    let (status, root) = send(
        &app,
        "POST",
        "/api/comments",
        &alice(),
        Some(json!({ "post_id": post_id, "content": "first!" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let root_id = root["id"].as_str().unwrap().to_string();

    let (status, reply) = send(
        &app,
        "POST",
        "/api/comments",
        &bob(),
        Some(json!({ "post_id": post_id, "content": "reply", "parent_id": root_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["parent_id"], root_id.as_str());
    assert_eq!(reply["author_id"], BOB.to_lowercase());

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/comments/{root_id}/vote"),
        &bob(),
        Some(json!({ "vote_type": "up" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upvotes"], 1);

    let (_, listing) = send(
        &app,
        "GET",
        &format!("/api/posts/{post_id}/comments"),
        &Caller::Anonymous,
        None,
    )
    .await;
    let comments = listing["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["id"], root_id.as_str());
    assert_eq!(comments[0]["upvotes"], 1);

    let post_uri = format!("/api/posts/{post_id}");
    let (_, post) = send(&app, "GET", &post_uri, &Caller::Anonymous, None).await;
    assert_eq!(post["comment_count"], 2);
    assert_eq!(post["upvotes"], 0);
}

#[tokio::test]
async fn comments_of_missing_post_are_not_found() {
    let app = app();
    let (status, _) = send(
        &app,
        "GET",
        "/api/posts/00000000-0000-0000-0000-000000000000/comments",
        &Caller::Anonymous,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_and_ids_are_json_bad_requests() {
    let app = app();
    let post_id = create_post(&app, &bob(), "p").await;

    let (status, body) =
        cast_vote(&app, &format!("/api/posts/{post_id}/vote"), &alice(), "sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/api/posts",
        &alice(),
        Some(json!({ "content": "no title" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, body) = send(&app, "GET", "/api/posts/not-a-uuid", &Caller::Anonymous, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, body) = cast_vote(&app, "/api/comments/not-a-uuid/vote", &alice(), "up").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}
