//! Slug normalization.
//!
//! Turns a human-readable business name into a URL-safe candidate slug.
//! Uniqueness negotiation (probing, suffixing) lives in the saga crate;
//! this module is the pure normalization step.

/// Candidate used when normalization leaves nothing usable.
pub const FALLBACK_SLUG: &str = "business";

/// Normalizes a business name to a candidate slug.
///
/// Lowercases, trims, strips characters outside `[a-z0-9\s-]`, collapses
/// whitespace runs to single hyphens, collapses repeated hyphens, and
/// strips leading/trailing hyphens. Falls back to `"business"` when the
/// result would be empty.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.trim().to_lowercase().chars() {
        let mapped = match ch {
            'a'..='z' | '0'..='9' => Some(ch),
            '-' => None,
            c if c.is_whitespace() => None,
            _ => continue,
        };

        match mapped {
            Some(c) => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            }
            // Whitespace and hyphens both collapse into one separator.
            None => pending_hyphen = true,
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
