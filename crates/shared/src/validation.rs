//! Input normalization shared by the RSVP and admin endpoints.

use thiserror::Error;

/// Longest accepted invite code.
pub const MAX_INVITE_CODE_LENGTH: usize = 36;

/// Most guest names one invitation may carry.
pub const MAX_GUEST_NAMES: usize = 20;

/// Longest guest display name, in characters.
pub const MAX_GUEST_NAME_LENGTH: usize = 400;

/// Client-facing message for a malformed invite code.
pub const INVALID_INVITE_CODE: &str =
    "Invalid invite code. Use 1-36 characters: letters, numbers, underscore, or hyphen.";

lazy_static::lazy_static! {
    static ref INVITE_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z0-9_-]{1,36}$").unwrap();

    // Keeps tab, LF and CR.
    static ref CONTROL_CHARS_REGEX: regex::Regex =
        regex::Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap();
}

/// Trims and uppercases an invite code, returning it only if it is well formed.
pub fn normalize_invite_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_uppercase();
    if INVITE_CODE_REGEX.is_match(&code) {
        Some(code)
    } else {
        None
    }
}

/// Trims a guest name and strips control characters.
///
/// Returns `None` when nothing printable is left.
pub fn sanitize_guest_name(raw: &str) -> Option<String> {
    let stripped = CONTROL_CHARS_REGEX.replace_all(raw.trim(), "");
    let name = stripped.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Why a strict guest-name list was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuestNamesError {
    #[error("At most {} guest names are allowed (got {count})", MAX_GUEST_NAMES)]
    TooMany { count: usize },

    /// `preview` holds the first characters of the offending name.
    #[error("Guest name exceeds {} characters: {preview}...", MAX_GUEST_NAME_LENGTH)]
    TooLong { preview: String },
}

/// Sanitizes a guest list submitted by a guest.
///
/// Blank entries are dropped. Oversized lists and names are rejected rather than cut.
pub fn sanitize_guest_names_strict(raw: &[String]) -> Result<Vec<String>, GuestNamesError> {
    let names: Vec<String> = raw.iter().filter_map(|n| sanitize_guest_name(n)).collect();

    if names.len() > MAX_GUEST_NAMES {
        return Err(GuestNamesError::TooMany { count: names.len() });
    }
    if let Some(name) = names
        .iter()
        .find(|n| n.chars().count() > MAX_GUEST_NAME_LENGTH)
    {
        return Err(GuestNamesError::TooLong {
            preview: name.chars().take(24).collect(),
        });
    }

    Ok(names)
}

/// Sanitizes a guest list edited in the admin console.
///
/// Over-long names are truncated and the list is capped instead of rejected.
pub fn sanitize_guest_names_lenient(raw: &[String]) -> Vec<String> {
    raw.iter()
        .filter_map(|n| sanitize_guest_name(n))
        .map(|n| n.chars().take(MAX_GUEST_NAME_LENGTH).collect::<String>())
        .take(MAX_GUEST_NAMES)
        .collect()
}
