use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidateUrl, ValidationError};

use crate::models::{AuthorSummary, VoteCounts};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub media_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn vote_counts(&self) -> VoteCounts {
        VoteCounts {
            upvotes: self.upvotes,
            downvotes: self.downvotes,
        }
    }
}

// Create post request
#[derive(Debug, Validate, Deserialize)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 40000, message = "Content must be 1-40000 characters"))]
    pub content: String,
    #[serde(default)]
    #[validate(
        length(max = 10, message = "At most 10 media urls are allowed"),
        custom(function = "validate_media_urls")
    )]
    pub media_urls: Vec<String>,
}

fn validate_media_urls(urls: &[String]) -> Result<(), ValidationError> {
    if urls.iter().all(|url| url.validate_url()) {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("Media urls must be valid URLs".into()))
    }
}

// Post response with display info
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author: AuthorSummary,
    pub upvotes: i32,
    pub downvotes: i32,
    pub score: i32,
    pub comment_count: i64,
    pub media_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: Post, comment_count: i64) -> Self {
        Self {
            author: AuthorSummary::for_author(&post.author_id),
            score: post.vote_counts().score(),
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            upvotes: post.upvotes,
            downvotes: post.downvotes,
            comment_count,
            media_urls: post.media_urls,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

// Sorting options for posts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    New,
    Top,
    #[default]
    Hot,
}

impl PostSort {
    pub fn as_str(self) -> &'static str {
        match self {
            PostSort::New => "new",
            PostSort::Top => "top",
            PostSort::Hot => "hot",
        }
    }
}

impl fmt::Display for PostSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostSort {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(PostSort::New),
            "top" => Ok(PostSort::Top),
            "hot" => Ok(PostSort::Hot),
            _ => Err(format!("Unknown sort: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, content: &str, media_urls: &[&str]) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            content: content.to_string(),
            media_urls: media_urls.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn accepts_well_formed_request() {
        let req = request("gm", "wagmi", &["https://example.com/chart.png"]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_empty_title_and_content() {
        let errors = request("", "", &[]).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("content"));
    }

    #[test]
    fn rejects_overlong_title() {
        let title = "x".repeat(301);
        assert!(request(&title, "body", &[]).validate().is_err());
    }

    #[test]
    fn rejects_malformed_media_url() {
        let errors = request("t", "b", &["not a url"]).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("media_urls"));
    }

    #[test]
    fn rejects_too_many_media_urls() {
        let urls = vec!["https://example.com/a.png"; 11];
        assert!(request("t", "b", &urls).validate().is_err());
    }

    #[test]
    fn sort_parses_known_keys_only() {
        assert_eq!("new".parse::<PostSort>(), Ok(PostSort::New));
        assert_eq!("top".parse::<PostSort>(), Ok(PostSort::Top));
        assert_eq!("hot".parse::<PostSort>(), Ok(PostSort::Hot));
        assert!("rising".parse::<PostSort>().is_err());
        assert!("Hot".parse::<PostSort>().is_err());
        assert_eq!(PostSort::default(), PostSort::Hot);
    }
}
