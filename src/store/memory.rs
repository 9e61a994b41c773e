use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    models::{Comment, Post, PostSort, Vote, VoteCounts, VoteDirection, VoteTarget},
    ranking,
};

use super::{ForumStore, StoreError, StoreResult, count_to_i32};

#[derive(Default)]
struct Tables {
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    votes: HashMap<Uuid, Vote>,
}

/// In-process [`ForumStore`]. Each call takes the table lock once, so single
/// calls are atomic but sequences of calls interleave like they would against
/// a remote row store.
#[derive(Clone, Default)]
pub struct MemoryForumStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryForumStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every vote row `user_id` holds on `target`.
    #[cfg(test)]
    pub async fn votes_by(&self, user_id: &str, target: VoteTarget) -> Vec<Vote> {
        let tables = self.tables.read().await;
        tables
            .votes
            .values()
            .filter(|v| v.user_id == user_id && v.target == target)
            .cloned()
            .collect()
    }

    #[cfg(test)]
    pub async fn vote_rows(&self) -> usize {
        self.tables.read().await.votes.len()
    }
}

impl ForumStore for MemoryForumStore {
    async fn insert_post(&self, post: Post) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).cloned())
    }

    async fn list_posts(&self, sort: PostSort) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        // HashMap order is arbitrary; pin ties to insertion time before ranking
        posts.sort_by_key(|p| p.created_at);
        ranking::sort_posts(&mut posts, sort);
        Ok(posts)
    }

    async fn insert_comment(&self, comment: Comment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(StoreError::Missing(format!("post {}", comment.post_id)));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.get(&id).cloned())
    }

    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn count_comments(&self, post_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count();
        Ok(count as i64)
    }

    async fn count_comments_for(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for comment in tables.comments.values() {
            if post_ids.contains(&comment.post_id) {
                *counts.entry(comment.post_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn find_vote(&self, user_id: &str, target: VoteTarget) -> StoreResult<Option<Vote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .values()
            .find(|v| v.user_id == user_id && v.target == target)
            .cloned())
    }

    async fn insert_vote(&self, vote: Vote) -> StoreResult<Vote> {
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .votes
            .values()
            .any(|v| v.user_id == vote.user_id && v.target == vote.target);
        if duplicate {
            return Err(StoreError::DuplicateVote {
                user_id: vote.user_id,
                target: vote.target,
            });
        }
        tables.votes.insert(vote.id, vote.clone());
        Ok(vote)
    }

    async fn update_vote_direction(
        &self,
        vote_id: Uuid,
        direction: VoteDirection,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let vote = tables
            .votes
            .get_mut(&vote_id)
            .ok_or_else(|| StoreError::Missing(format!("vote {}", vote_id)))?;
        vote.direction = direction;
        Ok(())
    }

    async fn delete_vote(&self, vote_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.votes.remove(&vote_id);
        Ok(())
    }

    async fn count_votes(&self, target: VoteTarget, direction: VoteDirection) -> StoreResult<i32> {
        let tables = self.tables.read().await;
        let count = tables
            .votes
            .values()
            .filter(|v| v.target == target && v.direction == direction)
            .count();
        count_to_i32(count as i64)
    }

    async fn set_vote_counts(&self, target: VoteTarget, counts: VoteCounts) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match target {
            VoteTarget::Post(id) => {
                let post = tables
                    .posts
                    .get_mut(&id)
                    .ok_or_else(|| StoreError::Missing(target.to_string()))?;
                post.upvotes = counts.upvotes;
                post.downvotes = counts.downvotes;
            }
            VoteTarget::Comment(id) => {
                let comment = tables
                    .comments
                    .get_mut(&id)
                    .ok_or_else(|| StoreError::Missing(target.to_string()))?;
                comment.upvotes = counts.upvotes;
                comment.downvotes = counts.downvotes;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn post(title: &str) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: "body".to_string(),
            author_id: "addr".to_string(),
            upvotes: 0,
            downvotes: 0,
            media_urls: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_and_get_post() {
        let store = MemoryForumStore::new();
        let p = store.insert_post(post("hello")).await.unwrap();

        let fetched = store.get_post(p.id).await.unwrap();
        assert_eq!(fetched, Some(p));
        assert!(store.get_post(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_vote_is_rejected() {
        let store = MemoryForumStore::new();
        let p = store.insert_post(post("hello")).await.unwrap();
        let target = VoteTarget::Post(p.id);

        store
            .insert_vote(Vote::new("alice", target, VoteDirection::Up))
            .await
            .unwrap();
        let err = store
            .insert_vote(Vote::new("alice", target, VoteDirection::Down))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateVote { .. }));
        assert_eq!(store.vote_rows().await, 1);
    }

    #[tokio::test]
    async fn counts_are_per_target_and_direction() {
        let store = MemoryForumStore::new();
        let a = store.insert_post(post("a")).await.unwrap();
        let b = store.insert_post(post("b")).await.unwrap();

        for user in ["u1", "u2"] {
            store
                .insert_vote(Vote::new(user, VoteTarget::Post(a.id), VoteDirection::Up))
                .await
                .unwrap();
        }
        store
            .insert_vote(Vote::new("u3", VoteTarget::Post(a.id), VoteDirection::Down))
            .await
            .unwrap();
        store
            .insert_vote(Vote::new("u1", VoteTarget::Post(b.id), VoteDirection::Down))
            .await
            .unwrap();

        let a_target = VoteTarget::Post(a.id);
        assert_eq!(store.count_votes(a_target, VoteDirection::Up).await.unwrap(), 2);
        assert_eq!(store.count_votes(a_target, VoteDirection::Down).await.unwrap(), 1);
        assert_eq!(
            store
                .count_votes(VoteTarget::Post(b.id), VoteDirection::Up)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn set_vote_counts_on_missing_target_fails() {
        let store = MemoryForumStore::new();
        let err = store
            .set_vote_counts(VoteTarget::Comment(Uuid::new_v4()), VoteCounts::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }

    #[tokio::test]
    async fn comment_requires_existing_post() {
        let store = MemoryForumStore::new();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            parent_id: None,
            content: "orphan".to_string(),
            author_id: "addr".to_string(),
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now(),
        };
        assert!(store.insert_comment(comment).await.is_err());
    }
}
