//! Post ordering for the `new`, `top` and `hot` listings.
//!
//! `hot` is a lexicographic composite: newest first, ties broken by raw
//! upvotes. It is not a decaying score.

use std::cmp::Ordering;

use crate::models::{Post, PostSort};

/// SQL `ORDER BY` body matching [`compare`].
pub fn order_by_clause(sort: PostSort) -> &'static str {
    match sort {
        PostSort::New => "created_at DESC",
        PostSort::Top => "upvotes DESC",
        PostSort::Hot => "created_at DESC, upvotes DESC",
    }
}

pub fn compare(sort: PostSort, a: &Post, b: &Post) -> Ordering {
    match sort {
        PostSort::New => b.created_at.cmp(&a.created_at),
        PostSort::Top => b.upvotes.cmp(&a.upvotes),
        PostSort::Hot => b
            .created_at
            .cmp(&a.created_at)
            .then_with(|| b.upvotes.cmp(&a.upvotes)),
    }
}

/// Stable sort; posts equal under `sort` keep their relative order.
pub fn sort_posts(posts: &mut [Post], sort: PostSort) {
    posts.sort_by(|a, b| compare(sort, a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn post(title: &str, minutes: i64, upvotes: i32, downvotes: i32) -> Post {
        let created_at =
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: "body".to_string(),
            author_id: "addr".to_string(),
            upvotes,
            downvotes,
            media_urls: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    fn titles(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.title.as_str()).collect()
    }

    fn sample() -> Vec<Post> {
        vec![
            post("old-popular", 0, 50, 0),
            post("mid-hated", 10, 5, 90),
            post("new-quiet", 20, 1, 0),
            post("new-loud", 20, 7, 0),
        ]
    }

    #[test]
    fn new_is_newest_first() {
        let mut posts = sample();
        sort_posts(&mut posts, PostSort::New);
        assert!(posts.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert_eq!(posts.last().unwrap().title, "old-popular");
    }

    #[test]
    fn top_ignores_downvotes() {
        let mut posts = sample();
        sort_posts(&mut posts, PostSort::Top);
        assert!(posts.windows(2).all(|w| w[0].upvotes >= w[1].upvotes));
        assert_eq!(titles(&posts), vec!["old-popular", "new-loud", "mid-hated", "new-quiet"]);
    }

    #[test]
    fn hot_is_recency_then_upvotes() {
        let mut posts = sample();
        sort_posts(&mut posts, PostSort::Hot);
        assert_eq!(titles(&posts), vec!["new-loud", "new-quiet", "mid-hated", "old-popular"]);
    }

    #[test]
    fn order_clauses_follow_sort_keys() {
        assert_eq!(order_by_clause(PostSort::New), "created_at DESC");
        assert_eq!(order_by_clause(PostSort::Top), "upvotes DESC");
        assert_eq!(order_by_clause(PostSort::Hot), "created_at DESC, upvotes DESC");
    }
}
