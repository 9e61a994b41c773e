use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::StoreError;

/// Direction of a single vote. Persisted as `"up"` / `"down"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteDirection::Up),
            "down" => Ok(VoteDirection::Down),
            _ => Err(format!("Unknown vote type: {}", s)),
        }
    }
}

/// The post or comment a vote is cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteTarget {
    Post(Uuid),
    Comment(Uuid),
}

impl VoteTarget {
    pub fn post_id(self) -> Option<Uuid> {
        match self {
            VoteTarget::Post(id) => Some(id),
            VoteTarget::Comment(_) => None,
        }
    }

    pub fn comment_id(self) -> Option<Uuid> {
        match self {
            VoteTarget::Post(_) => None,
            VoteTarget::Comment(id) => Some(id),
        }
    }

    /// Rebuild a target from the nullable `post_id` / `comment_id` columns.
    /// Exactly one of them must be set.
    pub fn from_columns(
        post_id: Option<Uuid>,
        comment_id: Option<Uuid>,
    ) -> Result<Self, StoreError> {
        match (post_id, comment_id) {
            (Some(id), None) => Ok(VoteTarget::Post(id)),
            (None, Some(id)) => Ok(VoteTarget::Comment(id)),
            (Some(_), Some(_)) => Err(StoreError::Corrupt(
                "vote references both a post and a comment".to_string(),
            )),
            (None, None) => Err(StoreError::Corrupt(
                "vote references neither a post nor a comment".to_string(),
            )),
        }
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteTarget::Post(id) => write!(f, "post {}", id),
            VoteTarget::Comment(id) => write!(f, "comment {}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: Uuid,
    pub user_id: String,
    pub target: VoteTarget,
    pub direction: VoteDirection,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(user_id: &str, target: VoteTarget, direction: VoteDirection) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            target,
            direction,
            created_at: Utc::now(),
        }
    }
}

// Row shape of the forum_votes table
#[derive(Debug, Clone, FromRow)]
pub struct VoteRow {
    pub id: Uuid,
    pub user_id: String,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub vote_type: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = StoreError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        let target = VoteTarget::from_columns(row.post_id, row.comment_id)?;
        let direction = row
            .vote_type
            .parse()
            .map_err(|e: String| StoreError::Corrupt(e))?;

        Ok(Vote {
            id: row.id,
            user_id: row.user_id,
            target,
            direction,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteCounts {
    pub upvotes: i32,
    pub downvotes: i32,
}

impl VoteCounts {
    pub fn score(&self) -> i32 {
        self.upvotes - self.downvotes
    }
}

// Vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote_type: VoteDirection,
}

// Vote response
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub user_vote: Option<VoteDirection>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub score: i32,
}
