use crate::error::{DeckError, Result};

/// Canonical form of a player tag: trimmed, leading `#` removed, upper-cased.
/// Only ASCII letters and digits are accepted so the tag is safe in file names.
pub fn sanitize_player_tag(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let tag = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
    if tag.is_empty() || !tag.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(DeckError::InvalidPlayerTag(raw.to_string()));
    }
    Ok(tag.to_ascii_uppercase())
}
