/// Instruction sent with a document upload when the caller gives no prompt.
pub const DOCUMENT_DEFAULT: &str = include_str!("../data/prompts/document_default.txt");
/// Instruction sent with an audio upload when the caller gives no prompt.
pub const AUDIO_DEFAULT: &str = include_str!("../data/prompts/audio_default.txt");

/// Returns the caller's prompt, or `fallback` when it is absent or empty.
pub fn or_default(prompt: Option<String>, fallback: &str) -> String {
    prompt
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
