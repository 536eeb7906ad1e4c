//! Field value shapes.
//!
//! The shape a field stores depends on its variant: plain text, a numeric
//! string, a list of option values, a list of uploaded images, a geographic
//! point, or a list of formatted dates.  [`FieldValue`] is a closed enum over
//! all of them; it serialises untagged so that form snapshots read as plain
//! JSON (`"abc"`, `["a","b"]`, `{"lat":…,"long":…}`, …).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ImageRef
// ---------------------------------------------------------------------------

/// One uploaded or generated image, as stored in form state and returned by
/// the batch upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Public (or signed) URL of the stored image.
    pub url: String,
    /// Storage object name; used to remove the image later.
    pub name: String,
}

// ---------------------------------------------------------------------------
// GeoPoint
// ---------------------------------------------------------------------------

/// Geographic point committed by the location picker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub long: f64,
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// Value of a single form field.
///
/// `Number` keeps the user-visible string rather than a parsed float so that
/// formatting (decimal places, max length) survives a round trip unchanged.
/// Untagged deserialization resolves a bare JSON string to `Text`; numeric
/// fields are re-tagged by the dispatcher when they are committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Geographic point (`location-picker`).
    Location(GeoPoint),
    /// Uploaded / generated images (`upload`).
    Images(Vec<ImageRef>),
    /// Selected option values (`checkbox`, `multi-select`).
    List(Vec<String>),
    /// Formatted dates (`days-picker`).  Untagged deserialization resolves
    /// a string array to `List`; the dispatcher re-tags on commit.
    Dates(Vec<String>),
    /// Free text (`input`, `input-desc`, `select`, pickers).
    Text(String),
    /// Numeric value as entered, after normalization (`number`).
    Number(String),
    /// No value yet.
    Empty,
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Empty
    }
}

impl FieldValue {
    /// `true` for [`FieldValue::Empty`], an empty string, or an empty list.
    pub fn is_unset(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) | FieldValue::Number(s) => s.is_empty(),
            FieldValue::List(items) | FieldValue::Dates(items) => items.is_empty(),
            FieldValue::Images(items) => items.is_empty(),
            FieldValue::Location(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_serialises_as_bare_string() {
        let value = FieldValue::Text("hello".into());
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"hello\"");
    }

    #[test]
    fn images_round_trip() {
        let value = FieldValue::Images(vec![ImageRef {
            url: "https://cdn/x.png".into(),
            name: "x.png".into(),
        }]);
        let json = serde_json::to_string(&value).unwrap();
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn location_round_trip() {
        let value = FieldValue::Location(GeoPoint {
            lat: 12.9716,
            long: 77.5946,
        });
        let json = serde_json::to_string(&value).unwrap();
        assert!(json.contains("\"lat\""));
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn is_unset_semantics() {
        assert!(FieldValue::Empty.is_unset());
        assert!(FieldValue::Text(String::new()).is_unset());
        assert!(FieldValue::List(vec![]).is_unset());
        assert!(!FieldValue::Text("x".into()).is_unset());
        assert!(!FieldValue::Location(GeoPoint { lat: 0.0, long: 0.0 }).is_unset());
    }
}
