//! Value normalization applied on commit.
//!
//! Rules, in order:
//! 1. uppercase-only fields upper-case the committed value;
//! 2. decimal-flagged numeric fields parse and re-format to 2 decimal
//!    places;
//! 3. a `maxLength` constraint rejects the edit outright when the
//!    *formatted* value exceeds it — the caller keeps the prior value.
//!
//! Returning `None` means "silently drop the edit"; it is not an error.

use crate::schema::FieldDescriptor;

/// Normalize a text edit.  `None` when the edit violates `maxLength`.
pub fn normalize_text(descriptor: &FieldDescriptor, value: &str) -> Option<String> {
    let value = if descriptor.uppercase {
        value.to_uppercase()
    } else {
        value.to_string()
    };

    if exceeds_max_length(descriptor, &value) {
        return None;
    }
    Some(value)
}

/// Normalize a numeric edit.  `None` when the value does not parse (with the
/// decimal flag set) or the formatted string violates `maxLength`.
///
/// The length check runs against the formatted value, so a decimal field
/// with `maxLength` can reject an edit that grows past the limit only after
/// rounding appends `.00`.
pub fn normalize_number(descriptor: &FieldDescriptor, raw: &str) -> Option<String> {
    let value = if descriptor.value_in_decimal {
        let parsed: f64 = raw.trim().parse().ok()?;
        format!("{parsed:.2}")
    } else {
        raw.to_string()
    };

    if exceeds_max_length(descriptor, &value) {
        return None;
    }
    Some(value)
}

fn exceeds_max_length(descriptor: &FieldDescriptor, value: &str) -> bool {
    descriptor
        .max_length
        .is_some_and(|limit| value.chars().count() > limit)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Variant;

    fn text_field() -> FieldDescriptor {
        FieldDescriptor::new("name", Variant::Input)
    }

    fn number_field() -> FieldDescriptor {
        FieldDescriptor::new("weight", Variant::Number)
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(
            normalize_text(&text_field(), "hello").as_deref(),
            Some("hello")
        );
    }

    #[test]
    fn uppercase_flag_uppercases() {
        let mut descriptor = text_field();
        descriptor.uppercase = true;
        assert_eq!(
            normalize_text(&descriptor, "hello").as_deref(),
            Some("HELLO")
        );
    }

    #[test]
    fn max_length_rejects_long_edit() {
        let descriptor = text_field().max_length(5);
        assert_eq!(normalize_text(&descriptor, "abcde").as_deref(), Some("abcde"));
        assert_eq!(normalize_text(&descriptor, "abcdef"), None);
    }

    #[test]
    fn decimal_flag_formats_two_places() {
        let mut descriptor = number_field();
        descriptor.value_in_decimal = true;
        assert_eq!(
            normalize_number(&descriptor, "3.14159").as_deref(),
            Some("3.14")
        );
        assert_eq!(normalize_number(&descriptor, "2").as_deref(), Some("2.00"));
    }

    #[test]
    fn decimal_flag_rejects_unparseable() {
        let mut descriptor = number_field();
        descriptor.value_in_decimal = true;
        assert_eq!(normalize_number(&descriptor, "abc"), None);
    }

    #[test]
    fn plain_number_keeps_raw_string() {
        assert_eq!(normalize_number(&number_field(), "42").as_deref(), Some("42"));
    }

    /// The length check runs post-formatting: "9.5" fits in 4 characters
    /// only until rounding turns it into "9.50".
    #[test]
    fn max_length_applies_to_formatted_value() {
        let mut descriptor = number_field().max_length(3);
        descriptor.value_in_decimal = true;
        assert_eq!(normalize_number(&descriptor, "9.5"), None);

        let mut roomier = number_field().max_length(4);
        roomier.value_in_decimal = true;
        assert_eq!(normalize_number(&roomier, "9.5").as_deref(), Some("9.50"));
    }
}
