//! Locale-aware string ordering for display lists.
//!
//! Names and titles are compared on a folded key: canonical decomposition,
//! combining marks removed, lower-cased. "Émile" therefore sorts next to
//! "emile" rather than after "zoe". Raw code-point order breaks ties so the
//! ordering stays total.

use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn compare(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accents_and_case_fold() {
        assert_eq!(collation_key("Émile Zola"), "emile zola");
        assert_eq!(compare("émile", "Zoe"), Ordering::Less);
        assert_eq!(compare("alice", "Bob"), Ordering::Less);
    }

    #[test]
    fn test_ties_are_total() {
        assert_ne!(compare("Anna", "anna"), Ordering::Equal);
        assert_eq!(compare("anna", "anna"), Ordering::Equal);
    }
}
