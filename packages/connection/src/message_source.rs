//! Sources of simulated incoming messages.

use rand::seq::SliceRandom;

use crate::error::ValidationError;

/// Produces the payload delivered on each timer tick.
pub trait MessageSource: Send + Sync {
    fn next_message(&self) -> String;
}

impl<F> MessageSource for F
where
    F: Fn() -> String + Send + Sync,
{
    fn next_message(&self) -> String {
        self()
    }
}

/// Picks uniformly at random from a fixed, non-empty set of messages.
#[derive(Debug, Clone)]
pub struct CannedMessages {
    messages: Vec<String>,
}

impl CannedMessages {
    pub fn new(messages: Vec<String>) -> Result<Self, ValidationError> {
        if messages.is_empty() {
            return Err(ValidationError::EmptyMessageSet);
        }
        Ok(Self { messages })
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Default for CannedMessages {
    /// "hey" or "lol", each with probability 0.5
    fn default() -> Self {
        Self {
            messages: vec!["hey".to_string(), "lol".to_string()],
        }
    }
}

impl MessageSource for CannedMessages {
    fn next_message(&self) -> String {
        self.messages
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }
}
