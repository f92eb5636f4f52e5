//! Form validation error accumulator.
//!
//! A `Validator` is built per form submission, fed by the handler's domain
//! checks, and handed to the renderer when the submission is re-displayed.
//! It knows nothing about HTTP, templates, or storage.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Pragmatic email shape check (same pattern class the W3C recommends
    /// for input[type=email]); not a full RFC 5322 parser.
    static ref EMAIL_RX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .expect("email regex must compile");
}

/// Accumulates field-level and form-level validation failures.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    /// First recorded error message per field; later writes for the same
    /// field are no-ops.
    pub field_errors: HashMap<String, String>,
    /// Form-level messages in insertion order.
    pub non_field_errors: Vec<String>,
}

impl Validator {
    /// True iff no field errors and no non-field errors were recorded.
    pub fn valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Records `message` under `key` unless the field already failed.
    pub fn add_field_error(&mut self, key: &str, message: &str) {
        self.field_errors.entry(key.to_string()).or_insert_with(|| message.to_string());
    }

    /// Appends a form-level error message.
    pub fn add_non_field_error(&mut self, message: &str) {
        self.non_field_errors.push(message.to_string());
    }

    /// Records a field error only when `ok` is false.
    pub fn check_field(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_field_error(key, message);
        }
    }

    /// Returns the recorded message for `key`, if any.
    pub fn field_error(&self, key: &str) -> Option<&str> {
        self.field_errors.get(key).map(String::as_str)
    }
}

/// True if `value` is not empty after trimming whitespace.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// True if `value` contains at most `n` characters (unicode scalar values).
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

/// True if `value` contains at least `n` characters (unicode scalar values).
pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

/// True if `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// True if `value` looks like an email address.
pub fn is_email(value: &str) -> bool {
    EMAIL_RX.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_on_empty_validator() {
        let v = Validator::default();
        assert!(v.valid());
    }

    #[test]
    fn test_first_field_error_wins() {
        let mut v = Validator::default();
        v.add_field_error("title", "first");
        v.add_field_error("title", "second");
        assert_eq!(v.field_error("title"), Some("first"));
        assert_eq!(v.field_errors.len(), 1);
        assert!(!v.valid());
    }

    #[test]
    fn test_check_field_records_once() {
        let mut v = Validator::default();
        v.check_field(false, "title", "cannot be blank");
        v.check_field(false, "title", "cannot be blank");
        assert_eq!(v.field_errors.len(), 1);
        assert_eq!(v.field_error("title"), Some("cannot be blank"));

        let mut ok = Validator::default();
        ok.check_field(true, "title", "cannot be blank");
        assert!(ok.valid());
    }

    #[test]
    fn test_non_field_errors_keep_order() {
        let mut v = Validator::default();
        v.add_non_field_error("one");
        v.add_non_field_error("two");
        assert_eq!(v.non_field_errors, vec!["one".to_string(), "two".to_string()]);
        assert!(!v.valid());
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello"));
        assert!(!not_blank(""));
        assert!(!not_blank("   \t\n"));
    }

    #[test]
    fn test_char_counts_are_unicode_aware() {
        // 4 runes, more than 4 bytes
        assert!(max_chars("äöüß", 4));
        assert!(!max_chars("äöüß", 3));
        assert!(min_chars("äöüß", 4));
        assert!(!min_chars("äöü", 4));
    }

    #[test]
    fn test_permitted_value() {
        assert!(permitted_value(&7, &[1, 7, 365]));
        assert!(!permitted_value(&2, &[1, 7, 365]));
        assert!(permitted_value(&"a", &["a", "b"]));
    }

    #[test]
    fn test_is_email() {
        assert!(is_email("alice@example.com"));
        assert!(is_email("a.b+c@sub.example.co"));
        assert!(!is_email("alice"));
        assert!(!is_email("alice@"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("alice@example com"));
    }
}
