//! Prompt templates for the PDF-grounded assistant endpoints.
//!
//! Both prompts are the same shape: a fixed instruction, a bounded prefix
//! of the extracted document text, and the user's message. The budgets
//! (context characters, output tokens) match the assistant contracts.

/// Upper bound on document context characters included in a prompt.
pub const CONTEXT_CHAR_BUDGET: usize = 8000;

/// Output token budget for the chat assistant.
pub const CHAT_MAX_TOKENS: u32 = 1024;

/// Output token budget for the voice assistant. Tighter, since the answer
/// is meant to be spoken.
pub const VOICE_MAX_TOKENS: u32 = 512;

/// Truncates to at most `budget` characters, never splitting a character.
fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_chat_prompt(context: &str, user_message: &str) -> String {
    format!(
        "You are a helpful career guidance assistant. Use the following context \
         about job roles to answer the user's question.\n\n\
         Context:\n{}\n\n\
         User Question: {}\n\n\
         Please provide a helpful, detailed answer based on the context. If the \
         answer is not in the context, say so and provide general career guidance.",
        truncate_chars(context, CONTEXT_CHAR_BUDGET),
        user_message
    )
}

pub fn build_voice_prompt(context: &str, user_message: &str) -> String {
    format!(
        "You are a helpful career guidance voice assistant. Use the following \
         context about job roles to answer the user's question.\n\
         Keep your response concise and suitable for voice output.\n\n\
         Context:\n{}\n\n\
         User Question: {}\n\n\
         Please provide a helpful, concise answer based on the context. If the \
         answer is not in the context, provide general career guidance.",
        truncate_chars(context, CONTEXT_CHAR_BUDGET),
        user_message
    )
}
