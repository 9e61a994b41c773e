use serde::Serialize;

pub const PLACEHOLDER_AVATAR: &str = "/placeholder.svg";

/// Display projection of an author. There is no user table: the name is
/// derived from the tail of the wallet address or subject id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    pub username: String,
    pub avatar_url: String,
}

impl AuthorSummary {
    pub fn for_author(author_id: &str) -> Self {
        let tail: Vec<char> = author_id.chars().rev().take(8).collect();
        let username = if tail.is_empty() {
            "User_Unknown".to_string()
        } else {
            format!("User_{}", tail.into_iter().rev().collect::<String>())
        };

        Self {
            username,
            avatar_url: PLACEHOLDER_AVATAR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_last_eight_characters() {
        let summary = AuthorSummary::for_author("0x52908400098527886e0f7030069857d2e4169ee7");
        assert_eq!(summary.username, "User_e4169ee7");
        assert_eq!(summary.avatar_url, PLACEHOLDER_AVATAR);
    }

    #[test]
    fn short_and_empty_ids() {
        assert_eq!(AuthorSummary::for_author("abc").username, "User_abc");
        assert_eq!(AuthorSummary::for_author("").username, "User_Unknown");
    }
}
