//! Vote reconciliation: one logical vote per user per target.
//!
//! A request carries a direction. With no existing vote it is inserted; the
//! same direction again retracts it; the opposite direction flips the stored
//! row in place. The target's aggregate counts are then recounted from the
//! vote rows and written back, so they are never incremented blindly.
//!
//! None of this runs in a transaction. A concurrent voter on the same target
//! can land between the recount and the aggregate write, leaving the
//! aggregate briefly stale; the next vote on the target recounts again.

use crate::{
    auth::{Identity, require_identity},
    error::{AppError, Result},
    models::{Vote, VoteCounts, VoteDirection, VoteResponse, VoteTarget},
    store::ForumStore,
};

pub async fn apply_vote<S: ForumStore>(
    store: &S,
    identity: Option<&Identity>,
    target: VoteTarget,
    direction: VoteDirection,
) -> Result<VoteResponse> {
    let user_id = require_identity(identity)?.user_id();

    ensure_target_exists(store, target).await?;

    let existing = store.find_vote(user_id, target).await?;
    let user_vote = match existing {
        None => {
            store
                .insert_vote(Vote::new(user_id, target, direction))
                .await?;
            Some(direction)
        }
        Some(vote) if vote.direction == direction => {
            store.delete_vote(vote.id).await?;
            None
        }
        Some(vote) => {
            store.update_vote_direction(vote.id, direction).await?;
            Some(direction)
        }
    };

    let counts = recount_votes(store, target).await?;
    store.set_vote_counts(target, counts).await?;

    tracing::info!(
        "Vote by {} on {}: {} -> {:?} ({} up / {} down)",
        user_id,
        target,
        direction,
        user_vote,
        counts.upvotes,
        counts.downvotes
    );

    Ok(VoteResponse {
        user_vote,
        upvotes: counts.upvotes,
        downvotes: counts.downvotes,
        score: counts.score(),
    })
}

/// Count the vote rows of `target` by direction.
pub async fn recount_votes<S: ForumStore>(store: &S, target: VoteTarget) -> Result<VoteCounts> {
    let upvotes = store.count_votes(target, VoteDirection::Up).await?;
    let downvotes = store.count_votes(target, VoteDirection::Down).await?;

    tracing::debug!("Recounted {}: {} up / {} down", target, upvotes, downvotes);

    Ok(VoteCounts { upvotes, downvotes })
}

async fn ensure_target_exists<S: ForumStore>(store: &S, target: VoteTarget) -> Result<()> {
    let exists = match target {
        VoteTarget::Post(id) => store.get_post(id).await?.is_some(),
        VoteTarget::Comment(id) => store.get_comment(id).await?.is_some(),
    };

    if !exists {
        let message = match target {
            VoteTarget::Post(_) => "Post not found",
            VoteTarget::Comment(_) => "Comment not found",
        };
        return Err(AppError::NotFound(message.to_string()));
    }

    Ok(())
}
