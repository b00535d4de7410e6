//! Prompt flattening for completion-style backends

use crate::protocol::Message;

/// Cue appended after the last turn so the model answers as the assistant
const ASSISTANT_CUE: &str = "\nAssistant:";

/// Flatten a conversation into `Role: content` lines followed by an
/// `Assistant:` cue.
pub fn build_prompt(messages: &[Message]) -> String {
    let mut prompt = messages
        .iter()
        .map(|m| format!("{}: {}", m.role.prompt_tag(), m.content))
        .collect::<Vec<_>>()
        .join("\n");
    prompt.push_str(ASSISTANT_CUE);
    prompt
}
