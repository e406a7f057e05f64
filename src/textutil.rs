//! Cleanup of model output before review.
//!
//! The prompt forbids markdown, but smaller models still wrap commands in
//! code fences or inline backticks. The stripped text is what the user
//! reviews, so decoration must be gone before the command reaches the tty.

/// Remove a surrounding markdown code fence or inline backticks, if present.
///
/// Handles, in order:
/// 1. A fenced block (```` ```lang\n...\n``` ````) anywhere in the text:
///    returns the trimmed fence body.
/// 2. Text fully wrapped in single backticks: returns the unwrapped text.
/// 3. Anything else: returned trimmed and otherwise untouched.
pub fn strip_markdown(text: &str) -> String {
    let text = text.trim();

    if let Some(body) = fenced_block_body(text) {
        return body.trim().to_string();
    }

    if text.len() >= 2 && text.starts_with('`') && text.ends_with('`') {
        return text.trim_matches('`').trim().to_string();
    }

    text.to_string()
}

/// Extract the body of the first ```` ```lang\n...\n``` ```` block.
///
/// The language tag is limited to word characters; a fence followed by
/// arbitrary text before the newline is not an opening fence.
fn fenced_block_body(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find("```") {
        let open = search_from + rel;
        let after_fence = &text[open + 3..];
        if let Some(body) = opened_fence_body(after_fence) {
            return Some(body);
        }
        search_from = open + 3;
    }
    None
}

/// Body of a fence whose tag (the text before the newline) is a word, if
/// the fence is well-formed and non-empty.
fn opened_fence_body(after_fence: &str) -> Option<&str> {
    let newline = after_fence.find('\n')?;
    let tag = &after_fence[..newline];
    if !tag.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let body = &after_fence[newline + 1..];
    let close = body.find("```")?;
    (close > 0).then_some(&body[..close])
}
