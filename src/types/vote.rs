use serde::{Deserialize, Serialize};

/// Direction of a vote.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoteType {
    Like,
    Dislike,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Like => "Like",
            VoteType::Dislike => "Dislike",
        }
    }

    pub fn parse(s: &str) -> Option<VoteType> {
        match s {
            "Like" | "like" => Some(VoteType::Like),
            "Dislike" | "dislike" => Some(VoteType::Dislike),
            _ => None,
        }
    }
}

/// A single user's vote on a bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    pub id: String,
    pub user_id: String,
    pub bookmark_id: String,
    pub voted_at: i64,
    pub vote_type: VoteType,
}

/// What a cast did to the caller's vote.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    /// No previous vote; a new one was recorded.
    Added,
    /// Same type as the previous vote; it was removed.
    Retracted,
    /// Opposite type; the previous vote was replaced.
    Switched,
}

/// Result of casting a vote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteResult {
    pub outcome: VoteOutcome,
    pub votes_count: i64,
    /// The vote now on record for the caller, if any.
    pub vote: Option<Vote>,
}

/// Result of retracting a vote by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteRetraction {
    pub bookmark_id: String,
    pub votes_count: i64,
}
