//! The publicly notified contract state.

use serde::{Deserialize, Serialize};

use crate::constants;

/// The two encouragement messages. Fixed for the life of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    pub basic: String,
    pub premium: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            basic: constants::DEFAULT_BASIC_MESSAGE.to_string(),
            premium: constants::DEFAULT_PREMIUM_MESSAGE.to_string(),
        }
    }
}

/// Snapshot published to observers on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateState {
    pub messages: Messages,
    /// Encouragements handed out so far; never decreases.
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_messages() {
        let m = Messages::default();
        assert_eq!(m.basic, "You're doing great!");
        assert!(m.premium.starts_with("Wow"));
    }

    #[test]
    fn aggregate_state_json_shape() {
        let state = AggregateState {
            messages: Messages::default(),
            count: 3,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["count"], 3);
        assert_eq!(json["messages"]["basic"], "You're doing great!");
        assert!(json["messages"]["premium"].is_string());
    }
}
