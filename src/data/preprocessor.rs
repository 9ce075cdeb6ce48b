// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Optional cleaning applied to review text before tokenisation:
//
//   1. Drop every character that is neither alphanumeric nor
//      whitespace (punctuation, emoji, symbols)
//   2. Lowercase what remains
//
//   "123 ABC!!!"  →  "123 abc"
//
// Whitespace is kept as-is, so word boundaries survive.
// Cleaning is off by default; when training enables it the
// flag is stored in the model manifest and the inferencer
// applies the same rule to incoming text.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw review for downstream tokenisation.
    pub fn clean(&self, text: &str) -> String {
        text.chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation_and_lowercases() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("Hello!"), "hello");
        assert_eq!(p.clean("123 ABC!!!"), "123 abc");
    }

    #[test]
    fn test_keeps_whitespace_and_unicode_letters() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("Très  BIEN,\tmerci"), "très  bien\tmerci");
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
        assert_eq!(p.clean("?!"), "");
    }
}
