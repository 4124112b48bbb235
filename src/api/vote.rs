use std::fmt;

use serde::{Deserialize, Serialize};

/// A plugin's vote on an admission or eviction decision.
///
/// On the wire only the sign of the integer counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Vote {
    Reject,
    #[default]
    Abstain,
    Permit,
}

impl From<i32> for Vote {
    fn from(value: i32) -> Self {
        match value.signum() {
            -1 => Self::Reject,
            1 => Self::Permit,
            _ => Self::Abstain,
        }
    }
}

impl From<Vote> for i32 {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Reject => -1,
            Vote::Abstain => 0,
            Vote::Permit => 1,
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Abstain => write!(f, "abstain"),
            Self::Permit => write!(f, "permit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn votes_decode_by_sign() {
        let votes: Vec<Vote> = serde_json::from_str("[-7, -1, 0, 1, 3]").unwrap();

        assert_eq!(
            votes,
            vec![Vote::Reject, Vote::Reject, Vote::Abstain, Vote::Permit, Vote::Permit]
        );
    }

    #[test]
    fn votes_encode_as_unit_integers() {
        assert_eq!(serde_json::to_string(&Vote::Reject).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&Vote::Permit).unwrap(), "1");
    }
}
