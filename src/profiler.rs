//! Trait estimation
//!
//! Runs the second LLM call that estimates OCEAN scores from the user's most
//! recent messages, and turns the free-text reply into a `TraitVector`.
//! Every failure here ends as "no trait vector"; nothing is escalated.

use crate::error::ProfileParseError;
use crate::logging;
use crate::openai::{ChatMessage, CompletionBackend};
use crate::prompts::PROFILER_PROMPT;
use crate::traits::TraitVector;
use serde_json::Value;

pub struct TraitProfiler<'a> {
    backend: &'a dyn CompletionBackend,
    temperature: f32,
    window: usize,
}

impl<'a> TraitProfiler<'a> {
    pub fn new(backend: &'a dyn CompletionBackend, temperature: f32, window: usize) -> Self {
        Self { backend, temperature, window }
    }

    /// Messages sent to the model: the profiler prompt plus the last
    /// `window` user messages, in conversation order.
    pub fn build_messages(&self, conversation: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(PROFILER_PROMPT)];
        messages.extend(recent_user_messages(conversation, self.window));
        messages
    }

    /// Estimate traits for the conversation. `None` when the call or the
    /// parse fails; the reason is logged.
    pub async fn estimate(
        &self,
        conversation: &[ChatMessage],
        session_id: Option<&str>,
    ) -> Option<TraitVector> {
        let messages = self.build_messages(conversation);
        if messages.len() == 1 {
            logging::log_profiler(session_id, "No user messages to profile, skipping");
            return None;
        }

        let reply = match self.backend.chat_completion(messages, self.temperature).await {
            Ok(reply) => reply,
            Err(e) => {
                logging::log_error(session_id, &format!("Failed to complete OCEAN profiling call: {}", e));
                return None;
            }
        };

        logging::log_profiler(session_id, &format!("OCEAN raw response: {}", reply));

        match parse_trait_reply(&reply) {
            Ok(traits) => {
                logging::log_profiler(session_id, &format!("Parsed traits: {}", traits.summary()));
                Some(traits)
            }
            Err(e) => {
                logging::log_error(session_id, &format!("Discarding OCEAN reply: {}", e));
                None
            }
        }
    }
}

/// Last `window` user messages, oldest first.
pub fn recent_user_messages(conversation: &[ChatMessage], window: usize) -> Vec<ChatMessage> {
    let users: Vec<&ChatMessage> = conversation.iter().filter(|m| m.is_user()).collect();
    let skip = users.len().saturating_sub(window);
    users.into_iter().skip(skip).cloned().collect()
}

/// Parse a model reply into a trait vector.
///
/// Tolerates curly quotes, markdown fences and prose around the object.
/// Only the first brace block is considered (first `{` up to the first `}`).
pub fn parse_trait_reply(reply: &str) -> Result<TraitVector, ProfileParseError> {
    let normalized = normalize_quotes(reply);
    let cleaned = strip_code_fences(&normalized);
    let block = first_brace_block(cleaned).ok_or(ProfileParseError::NoJsonObject)?;

    let value: Value = serde_json::from_str(block)
        .map_err(|e| ProfileParseError::MalformedJson(e.to_string()))?;

    Ok(TraitVector::from_json(&value)?)
}

fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
            other => other,
        })
        .collect()
}

fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn first_brace_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let len = text[start..].find('}')?;
    Some(&text[start..=start + len])
}
