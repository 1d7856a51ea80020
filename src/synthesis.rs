//! Conversation synthesis - turning finished conversations into a request
//!
//! Caller-side helpers; the generator itself never looks at conversations.

use serde::{Deserialize, Serialize};

use crate::generator::ArtworkRequest;
use crate::themes::MAX_PALETTE_COLORS;

/// One finished conversation with an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub agent_id: String,
    pub themes: Vec<String>,
}

/// Agents of the hall and the themes their conversations surface.
pub const AGENTS: [(&str, [&str; 3]); 5] = [
    ("philosopher", ["meaning", "consciousness", "legacy"]),
    ("scientist", ["technology", "systems", "sovereignty"]),
    ("artist", ["creativity", "expression", "beauty"]),
    ("storyteller", ["narrative", "identity", "journey"]),
    ("futurist", ["web3", "identity", "future"]),
];

impl Conversation {
    /// Conversation with a known agent, carrying that agent's themes.
    pub fn with_agent(agent_id: &str) -> Option<Self> {
        AGENTS
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(agent_id))
            .map(|(id, themes)| Self {
                agent_id: id.to_string(),
                themes: themes.iter().map(|t| t.to_string()).collect(),
            })
    }
}

/// First-seen unique themes across conversations, at most five.
pub fn key_themes(conversations: &[Conversation]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for theme in conversations.iter().flat_map(|c| &c.themes) {
        if !seen.contains(theme) {
            seen.push(theme.clone());
        }
    }
    seen.truncate(MAX_PALETTE_COLORS);
    seen
}

pub fn agent_ids(conversations: &[Conversation]) -> Vec<String> {
    conversations.iter().map(|c| c.agent_id.clone()).collect()
}

/// Request for the synthesis artwork of a visit.
pub fn artwork_request(conversations: &[Conversation], seed: Option<String>) -> ArtworkRequest {
    ArtworkRequest {
        themes: key_themes(conversations),
        agent_ids: agent_ids(conversations),
        seed,
        ..ArtworkRequest::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(agents: &[&str]) -> Vec<Conversation> {
        agents.iter().filter_map(|a| Conversation::with_agent(a)).collect()
    }

    #[test]
    fn test_key_themes_dedup_and_cap() {
        let conversations = visit(&["storyteller", "futurist", "artist"]);
        assert_eq!(
            key_themes(&conversations),
            vec!["narrative", "identity", "journey", "web3", "future"]
        );
    }

    #[test]
    fn test_unknown_agent() {
        assert!(Conversation::with_agent("juggler").is_none());
        assert_eq!(Conversation::with_agent("Artist").unwrap().agent_id, "artist");
    }

    #[test]
    fn test_artwork_request_carries_agents() {
        let request = artwork_request(&visit(&["philosopher", "scientist"]), None);
        assert_eq!(request.agent_ids, vec!["philosopher", "scientist"]);
        assert_eq!(request.themes.len(), 5);
        assert!(request.seed.is_none());
    }
}
