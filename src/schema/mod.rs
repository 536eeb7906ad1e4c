//! Field schema — descriptors, the closed variant set, and schema parsing.
//!
//! A form is declared as an ordered array of [`FieldDescriptor`]s authored in
//! JSON by the host.  Descriptors are created once per form load and never
//! mutated by the engine.
//!
//! [`Variant`] is a closed enum: the dispatcher matches on it exhaustively,
//! so forgetting to handle a variant is a build error rather than a silently
//! dropped field.  A *schema* containing an unknown type string is still
//! tolerated at parse time — the offending descriptor is logged and skipped
//! so one bad entry cannot take down the whole form.

pub mod fields;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// The fixed set of field behaviours the dispatcher knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    Input,
    InputDesc,
    Number,
    Radio,
    Checkbox,
    Divider,
    Attributes,
    Select,
    LocationPicker,
    DatePicker,
    TimePicker,
    DaysPicker,
    MultiSelect,
    Upload,
    Label,
}

// ---------------------------------------------------------------------------
// SelectOption
// ---------------------------------------------------------------------------

/// One `{key, value}` choice offered by radio / checkbox / select variants.
///
/// `key` is the display label; `value` is what gets committed to form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub key: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldDescriptor
// ---------------------------------------------------------------------------

/// Static declaration of one form field.
///
/// Field names mirror the wire schema the host authors (camelCase, including
/// the long-standing `isUperCase` misspelling, which is kept for
/// compatibility with existing schema files).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique id within the form; also the form-state key.
    pub id: String,

    /// Which behaviour the dispatcher selects.
    #[serde(rename = "type")]
    pub variant: Variant,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub placeholder: String,

    #[serde(default)]
    pub required: bool,

    /// Choices for radio / checkbox / select / multi-select.
    #[serde(default)]
    pub options: Vec<SelectOption>,

    /// Lower bound for numeric fields.
    #[serde(default)]
    pub min: Option<f64>,

    /// Upper bound for numeric fields.
    #[serde(default)]
    pub max: Option<f64>,

    /// Hard cap on committed value length; edits beyond it are rejected.
    #[serde(default, rename = "maxLength")]
    pub max_length: Option<usize>,

    #[serde(default, rename = "minLength")]
    pub min_length: Option<usize>,

    #[serde(default)]
    pub multiline: bool,

    /// Upload variant: whether more than one file may be attached.
    #[serde(default)]
    pub multiple: bool,

    /// Committed values are upper-cased before merge.
    #[serde(default, rename = "isUperCase")]
    pub uppercase: bool,

    /// Numeric values are rounded to 2 decimal places on commit.
    #[serde(default, rename = "valueInDecimal")]
    pub value_in_decimal: bool,

    #[serde(default, rename = "disableClearable")]
    pub disable_clearable: bool,

    /// Display format for date / time / days pickers.
    #[serde(default)]
    pub format: Option<String>,

    /// Whether the field offers the voice/AI assist entry point.
    #[serde(default, rename = "hasMicIcon")]
    pub has_mic: bool,

    #[serde(default, rename = "isDisabled")]
    pub is_disabled: bool,

    #[serde(default)]
    pub error: bool,

    #[serde(default, rename = "helperText")]
    pub helper_text: String,
}

impl FieldDescriptor {
    /// Minimal descriptor with everything else defaulted — the common
    /// starting point for builders and tests.
    pub fn new(id: impl Into<String>, variant: Variant) -> Self {
        Self {
            id: id.into(),
            variant,
            title: String::new(),
            placeholder: String::new(),
            required: false,
            options: Vec::new(),
            min: None,
            max: None,
            max_length: None,
            min_length: None,
            multiline: false,
            multiple: false,
            uppercase: false,
            value_in_decimal: false,
            disable_clearable: false,
            format: None,
            has_mic: false,
            is_disabled: false,
            error: false,
            helper_text: String::new(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, limit: usize) -> Self {
        self.max_length = Some(limit);
        self
    }

    pub fn with_mic(mut self) -> Self {
        self.has_mic = true;
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }
}

// ---------------------------------------------------------------------------
// SchemaError + parsing
// ---------------------------------------------------------------------------

/// Errors raised while parsing a field schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document is not a JSON array of objects.
    #[error("field schema is not a JSON array: {0}")]
    NotAnArray(String),
}

/// Parse a JSON array of field descriptors.
///
/// A descriptor with an unrecognised `type` string (or any other shape
/// problem) is logged with `log::warn!` and skipped; the rest of the form
/// still loads.  Only a document that is not an array at all is an error.
pub fn parse_descriptors(json: &str) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let raw: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| SchemaError::NotAnArray(e.to_string()))?;

    let mut descriptors = Vec::with_capacity(raw.len());
    for (index, entry) in raw.into_iter().enumerate() {
        match serde_json::from_value::<FieldDescriptor>(entry) {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(e) => {
                log::warn!("skipping field schema entry {index}: {e}");
            }
        }
    }
    Ok(descriptors)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
