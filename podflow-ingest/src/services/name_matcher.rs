//! Name matching helpers
//!
//! Turns a dropped media file name into the guest-name candidate used for
//! roster lookup, and builds canonical `Ep<number>_<guest>` base names.

use crate::models::EpisodeNumber;

/// Marker prepended to every canonical name
pub const CANONICAL_PREFIX: &str = "Ep";

/// Normalized form used for containment comparisons (trimmed, lower-case)
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Strip the media extension (case-insensitive) and surrounding whitespace
///
/// `extension` may be given with or without the leading dot. Names that do
/// not carry the extension are only trimmed, so the function is idempotent.
pub fn derive_candidate_name(media_name: &str, extension: &str) -> String {
    let trimmed = media_name.trim();
    let ext = extension.trim().trim_start_matches('.');
    if ext.is_empty() {
        return trimmed.to_string();
    }

    let suffix_len = ext.len() + 1;
    if trimmed.len() > suffix_len && trimmed.is_char_boundary(trimmed.len() - suffix_len) {
        let (stem, tail) = trimmed.split_at(trimmed.len() - suffix_len);
        if tail.starts_with('.') && tail[1..].eq_ignore_ascii_case(ext) {
            return stem.trim().to_string();
        }
    }

    trimmed.to_string()
}

/// `Ep<episode>_<guest>`
pub fn canonical_base_name(episode_number: &EpisodeNumber, guest_name: &str) -> String {
    format!("{}{}_{}", CANONICAL_PREFIX, episode_number, guest_name)
}
