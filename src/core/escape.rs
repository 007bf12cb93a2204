// src/core/escape.rs

use std::borrow::Cow;

/// Turns an arbitrary value into exactly one shell word.
///
/// Values made only of shell-inert characters pass through untouched.
/// Everything else is wrapped in single quotes, with embedded single quotes
/// rewritten as `'\''` so the shell closes, escapes, and reopens the quoted
/// region. The empty string becomes `''`.
///
/// This is pure string rewriting with no failure mode: any input yields a
/// word the shell hands to the command as a single argument.
pub fn quote(value: &str) -> Cow<'_, str> {
    if value.is_empty() {
        return Cow::Borrowed("''");
    }
    if is_inert_word(value) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(format!("'{}'", value.replace('\'', "'\\''")))
}

/// `true` when `value` is one nonempty word the shell takes literally,
/// i.e. `quote` would pass it through unchanged.
pub(crate) fn is_inert_word(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_inert)
}

/// Characters no POSIX shell treats specially in an unquoted word.
fn is_inert(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | '-' | '.' | '/' | ':' | '@' | '%' | '+' | '=' | ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_becomes_empty_quotes() {
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn test_inert_words_pass_through_borrowed() {
        for word in ["hello", "a/b/c.txt", "KEY=value", "1.2.3", "user@host:22"] {
            match quote(word) {
                Cow::Borrowed(s) => assert_eq!(s, word),
                Cow::Owned(s) => panic!("'{word}' should not allocate, got '{s}'"),
            }
        }
    }

    #[test]
    fn test_whitespace_is_quoted() {
        assert_eq!(quote("hello world"), "'hello world'");
        assert_eq!(quote("a\tb"), "'a\tb'");
        assert_eq!(quote("a\nb"), "'a\nb'");
    }

    #[test]
    fn test_metacharacters_are_quoted() {
        assert_eq!(quote("$HOME"), "'$HOME'");
        assert_eq!(quote("`id`"), "'`id`'");
        assert_eq!(quote("a;b"), "'a;b'");
        assert_eq!(quote("a && b"), "'a && b'");
        assert_eq!(quote("*.rs"), "'*.rs'");
        assert_eq!(quote("2>&1"), "'2>&1'");
    }

    #[test]
    fn test_single_quotes_are_rewritten() {
        assert_eq!(quote("it's"), r"'it'\''s'");
        assert_eq!(quote("''"), r"''\'''\'''");
    }

    #[test]
    fn test_unicode_is_quoted_not_mangled() {
        assert_eq!(quote("héllo wörld"), "'héllo wörld'");
    }
}
