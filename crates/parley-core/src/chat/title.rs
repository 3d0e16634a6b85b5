//! Session title rules.
//!
//! `derive_title` turns the first user message into a session title;
//! `validate_title` checks caller-supplied titles.

use parley_types::chat::{AUTO_TITLE_MAX_CHARS, MAX_TITLE_CHARS};
use parley_types::error::ChatError;

/// Derive a session title from message content.
///
/// Content longer than [`AUTO_TITLE_MAX_CHARS`] characters is cut at that
/// many characters and suffixed with `"..."`; shorter content is used as is.
pub fn derive_title(content: &str) -> String {
    match content.char_indices().nth(AUTO_TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Validate a caller-supplied session title.
pub fn validate_title(title: &str) -> Result<(), ChatError> {
    if title.trim().is_empty() {
        return Err(ChatError::validation("title", "This field may not be blank."));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ChatError::validation(
            "title",
            format!("Ensure this field has no more than {MAX_TITLE_CHARS} characters."),
        ));
    }
    Ok(())
}
