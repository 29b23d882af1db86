//! Text normalization for header and unit-name comparison.
//!
//! Two comparison keys are produced here:
//!
//! - [`strict`]: the key for header/column equality ("School Name" and
//!   "SchoolName" compare equal).
//! - [`loose_unit_key`]: the key for unit-name segmentation and registry
//!   matching. It additionally drops a vocabulary of school-type words
//!   ("GS Kigali", "Kigali Primary School" and "KIGALI" all produce
//!   "kigali") and folds accented characters.
//!
//! Both are pure and locale-independent.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// School-type words removed before loose comparison.
///
/// Whole-word removal only, so "Essa" keeps its "ess" prefix. Longer
/// tokens come first so "ecole primaire" wins over "ecole".
const UNIT_TYPE_TOKENS: [&str; 18] = [
    "ecole primaire",
    "école primaire",
    "secondary",
    "primary",
    "collège",
    "college",
    "lycée",
    "lycee",
    "school",
    "école",
    "ecole",
    "tvet",
    "g.s",
    "tss",
    "ess",
    "gs",
    "ps",
    "ss",
];

#[allow(clippy::expect_used)] // Built from a fixed token list, guaranteed valid
static UNIT_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = UNIT_TYPE_TOKENS
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    // Optional plural so "schools" counts as "school"
    Regex::new(&format!(r"\b(?:{alternation})s?\b")).expect("valid regex")
});

/// Whether the text names a school type anywhere ("GS Kigali",
/// "Kigali Primary"). Whole-word matching on the collapsed lowercase
/// form, plus the Arabic word for school.
pub fn contains_unit_type_token(text: &str) -> bool {
    let value = spaced(text);
    UNIT_TYPE_PATTERN.is_match(&value) || value.contains("مدرسة")
}

/// Strict normalization: trim, lowercase, remove all whitespace.
pub fn strict(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect()
}

/// Lowercase with whitespace runs collapsed to single spaces.
pub fn spaced(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Loose normalization used as the unit-name comparison key.
///
/// Removes school-type vocabulary as whole words, folds accents to
/// ASCII, strips everything that is not alphanumeric and collapses the
/// result. Falls back to the strict form when nothing survives (e.g. a
/// name that consists only of type words).
pub fn loose_unit_key(text: &str) -> String {
    let value = spaced(text);
    let value = UNIT_TYPE_PATTERN.replace_all(&value, " ");

    // NFKD then keep ASCII alphanumerics: "école" and "ecole" collapse
    // to the same key, combining marks and punctuation fall away.
    let folded: String = value
        .nfkd()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let key = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    if key.is_empty() {
        strict(text)
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strict_removes_all_whitespace() {
        assert_eq!(strict("  School   Name "), "schoolname");
        assert_eq!(strict("SchoolName"), "schoolname");
        assert_eq!(strict(""), "");
    }

    #[test]
    fn test_spaced_collapses_runs() {
        assert_eq!(spaced("  GS   KIGALI "), "gs kigali");
    }

    #[test]
    fn test_loose_strips_type_words() {
        assert_eq!(loose_unit_key("GS Kigali"), "kigali");
        assert_eq!(loose_unit_key("Kigali Primary School"), "kigali");
        assert_eq!(loose_unit_key("École Primaire Nyamirambo"), "nyamirambo");
        assert_eq!(loose_unit_key("Lycée de Kigali"), "de kigali");
    }

    #[test]
    fn test_loose_is_case_and_spacing_insensitive() {
        assert_eq!(loose_unit_key("GS  KIGALI"), loose_unit_key("gs kigali"));
        assert_eq!(
            loose_unit_key("Kigali Secondary"),
            loose_unit_key("KIGALI secondary")
        );
    }

    #[test]
    fn test_loose_folds_accents() {
        assert_eq!(loose_unit_key("Gatagara é"), loose_unit_key("Gatagara e"));
    }

    #[test]
    fn test_loose_whole_word_only() {
        // "ess" must not be removed from inside a word
        assert_eq!(loose_unit_key("Essa Hills"), "essa hills");
        // "g.s" with the dot is removed as a unit
        assert_eq!(loose_unit_key("G.S Rubavu"), "rubavu");
    }

    #[test]
    fn test_loose_falls_back_to_strict_when_emptied() {
        // A name that is nothing but type words keeps its strict form
        assert_eq!(loose_unit_key("Primary School"), "primaryschool");
    }

    #[test]
    fn test_contains_unit_type_token() {
        assert!(contains_unit_type_token("GS KIGALI"));
        assert!(contains_unit_type_token("Kigali Primary"));
        assert!(contains_unit_type_token("Lycée de Kigali"));
        assert!(contains_unit_type_token("All Schools"));
        assert!(!contains_unit_type_token("TOTAL"));
        assert!(!contains_unit_type_token("NYAGASAMBU")); // no "gs" inside words
    }

    #[test]
    fn test_loose_strips_punctuation() {
        assert_eq!(loose_unit_key("St. Mary's (Annex)"), "st mary s annex");
    }
}
