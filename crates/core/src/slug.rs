//! URL slug normalization.
//!
//! Uniqueness against existing records is the store's job
//! (`SlugGenerator` in `masthead-workflow`); this module only owns the
//! pure text normalization.

use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Normalize a title into a URL slug: lowercase, runs of non-alphanumeric
/// characters collapsed into single hyphens, no leading/trailing hyphen.
/// An input with no usable characters yields `"untitled"`.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}
