//! Label normalization
//!
//! Syntactic canonicalization applied to both requirement and detection
//! labels before comparison. Deliberately conservative: casing, whitespace,
//! and a naive trailing-"s" plural are handled. Irregular plurals ("shelves")
//! and synonyms ("couch" vs "sofa") are not; the requirement vocabulary is
//! free text while the provider vocabulary is fixed, and guessing across
//! that gap belongs in an explicit synonym table, not here.

/// Minimum stem length that must remain after stripping a trailing "s"
const MIN_SINGULAR_STEM: usize = 3;

/// Normalize a label for comparison.
///
/// Trims, lowercases, collapses internal whitespace runs to a single space,
/// then strips one trailing "s" when the remaining stem keeps at least
/// [`MIN_SINGULAR_STEM`] characters: "chairs" becomes "chair" while "bus"
/// stays "bus".
pub fn normalize(label: &str) -> String {
    let collapsed = label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    match collapsed.strip_suffix('s') {
        Some(stem) if stem.chars().count() >= MIN_SINGULAR_STEM => stem.to_string(),
        _ => collapsed,
    }
}
