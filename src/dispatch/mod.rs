//! Field dispatcher — selects the interaction behaviour for each descriptor
//! and owns every commit path into form state.
//!
//! [`FieldDispatcher::dispatch`] maps a [`FieldDescriptor`] onto a
//! [`FieldControl`]: which widget to render, whether it is disabled (its own
//! flag, preview mode, or a cross-field rule), and a snapshot of its current
//! value.  The match over [`Variant`] is exhaustive — adding a variant
//! without a handler fails the build.
//!
//! Commits go through the dispatcher so normalization (uppercase, decimal
//! formatting, max-length rejection) and cascade rules apply in exactly one
//! place.  Focus and blur notify an optional external observer and never
//! touch state.

pub mod normalize;
pub mod rules;

pub use normalize::{normalize_number, normalize_text};
pub use rules::{CascadeRules, DisabilityRules};

use std::sync::Arc;

use crate::schema::{FieldDescriptor, SelectOption, Variant};
use crate::state::{FieldValue, FormHandle, FormState, GeoPoint};

// ---------------------------------------------------------------------------
// FieldWidget / FieldControl
// ---------------------------------------------------------------------------

/// Which widget the host should render for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWidget {
    /// Single- or multi-line text input; `markdown_preview` marks the
    /// description editor with its preview toggle.
    Text {
        multiline: bool,
        markdown_preview: bool,
    },
    Number {
        min: f64,
        max: f64,
    },
    Radio {
        options: Vec<SelectOption>,
    },
    Checkbox {
        options: Vec<SelectOption>,
    },
    Divider,
    /// The attributes header row with its assist entry point.
    Attributes,
    Select {
        options: Vec<SelectOption>,
        disable_clearable: bool,
    },
    LocationPicker,
    DatePicker {
        format: String,
    },
    TimePicker {
        format: String,
    },
    DaysPicker {
        format: String,
    },
    MultiSelect {
        options: Vec<SelectOption>,
    },
    Upload {
        multiple: bool,
    },
    Label,
}

/// Everything the host needs to render one field right now.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldControl {
    pub field_id: String,
    pub widget: FieldWidget,
    pub title: String,
    pub placeholder: String,
    pub required: bool,
    pub disabled: bool,
    /// The field offers the voice/AI assist entry point.
    pub has_assist: bool,
    /// Snapshot of the field's current value.
    pub value: FieldValue,
    pub error: bool,
    pub helper_text: String,
}

// ---------------------------------------------------------------------------
// LocationSelection
// ---------------------------------------------------------------------------

/// What the place picker hands back when the user confirms a location.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationSelection {
    pub lat: f64,
    pub long: f64,
    pub city: String,
    pub district: String,
    pub state_name: String,
    pub country: String,
    pub area_code: String,
    pub locality: String,
}

// ---------------------------------------------------------------------------
// FieldDispatcher
// ---------------------------------------------------------------------------

/// Observer notified when a field gains (`Some(id)`) or loses (`None`)
/// focus.  Used by surrounding UI; never affects form state.
pub type FocusObserver = Arc<dyn Fn(Option<&str>) + Send + Sync>;

/// Maps descriptors onto controls and owns every commit path.
#[derive(Clone)]
pub struct FieldDispatcher {
    disability: DisabilityRules,
    cascades: CascadeRules,
    focus: Option<FocusObserver>,
}

impl FieldDispatcher {
    /// Dispatcher with the built-in product-form rules.
    pub fn new() -> Self {
        Self {
            disability: DisabilityRules::builtin(),
            cascades: CascadeRules::builtin(),
            focus: None,
        }
    }

    /// Dispatcher with custom rule registries.
    pub fn with_rules(disability: DisabilityRules, cascades: CascadeRules) -> Self {
        Self {
            disability,
            cascades,
            focus: None,
        }
    }

    /// Attach a focused-field observer.
    pub fn with_focus_observer(mut self, observer: FocusObserver) -> Self {
        self.focus = Some(observer);
        self
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Produce the rendering/interaction behaviour for one field.
    ///
    /// `preview_only` forces every interactive control into a disabled state
    /// regardless of other flags.
    pub fn dispatch(
        &self,
        descriptor: &FieldDescriptor,
        state: &FormState,
        preview_only: bool,
    ) -> FieldControl {
        let disabled = preview_only
            || descriptor.is_disabled
            || self.disability.is_disabled(&descriptor.id, state);

        let widget = match descriptor.variant {
            Variant::Input => FieldWidget::Text {
                multiline: descriptor.multiline,
                markdown_preview: false,
            },
            Variant::InputDesc => FieldWidget::Text {
                multiline: descriptor.multiline,
                markdown_preview: true,
            },
            Variant::Number => FieldWidget::Number {
                min: descriptor.min.unwrap_or(0.0),
                max: descriptor.max.unwrap_or(100_000.0),
            },
            Variant::Radio => FieldWidget::Radio {
                options: descriptor.options.clone(),
            },
            Variant::Checkbox => FieldWidget::Checkbox {
                options: descriptor.options.clone(),
            },
            Variant::Divider => FieldWidget::Divider,
            Variant::Attributes => FieldWidget::Attributes,
            Variant::Select => FieldWidget::Select {
                options: descriptor.options.clone(),
                disable_clearable: descriptor.disable_clearable,
            },
            Variant::LocationPicker => FieldWidget::LocationPicker,
            Variant::DatePicker => FieldWidget::DatePicker {
                format: descriptor
                    .format
                    .clone()
                    .unwrap_or_else(|| "DD/MM/YYYY".into()),
            },
            Variant::TimePicker => FieldWidget::TimePicker {
                format: descriptor.format.clone().unwrap_or_else(|| "hh:mm A".into()),
            },
            Variant::DaysPicker => FieldWidget::DaysPicker {
                format: descriptor
                    .format
                    .clone()
                    .unwrap_or_else(|| "DD/MM/YYYY".into()),
            },
            Variant::MultiSelect => FieldWidget::MultiSelect {
                options: descriptor.options.clone(),
            },
            Variant::Upload => FieldWidget::Upload {
                multiple: descriptor.multiple,
            },
            Variant::Label => FieldWidget::Label,
        };

        FieldControl {
            field_id: descriptor.id.clone(),
            widget,
            title: descriptor.title.clone(),
            placeholder: descriptor.placeholder.clone(),
            required: descriptor.required,
            disabled,
            has_assist: descriptor.has_mic,
            value: state.get(&descriptor.id).cloned().unwrap_or_default(),
            error: descriptor.error,
            helper_text: descriptor.helper_text.clone(),
        }
    }

    fn commit_allowed(&self, descriptor: &FieldDescriptor, form: &FormHandle) -> bool {
        !descriptor.is_disabled && !self.disability.is_disabled(&descriptor.id, &form.snapshot())
    }

    // -----------------------------------------------------------------------
    // Commits
    // -----------------------------------------------------------------------

    /// Commit a text edit.  Returns `false` when the edit was rejected
    /// (normalization) or the field is disabled; the prior value stays.
    pub fn commit_text(&self, descriptor: &FieldDescriptor, form: &FormHandle, value: &str) -> bool {
        if !self.commit_allowed(descriptor, form) {
            return false;
        }
        let Some(normalized) = normalize_text(descriptor, value) else {
            return false;
        };
        let field_id = descriptor.id.clone();
        form.update(move |state| state.set(&field_id, FieldValue::Text(normalized)));
        true
    }

    /// Commit a numeric edit (stored as a string, formatted per descriptor).
    pub fn commit_number(
        &self,
        descriptor: &FieldDescriptor,
        form: &FormHandle,
        raw: &str,
    ) -> bool {
        if !self.commit_allowed(descriptor, form) {
            return false;
        }
        let Some(normalized) = normalize_number(descriptor, raw) else {
            return false;
        };
        let field_id = descriptor.id.clone();
        form.update(move |state| state.set(&field_id, FieldValue::Number(normalized)));
        true
    }

    /// Commit a radio / select choice; runs any cascade registered for the
    /// field in the same update.
    pub fn select_choice(
        &self,
        descriptor: &FieldDescriptor,
        form: &FormHandle,
        option_value: &str,
    ) -> bool {
        if !self.commit_allowed(descriptor, form) {
            return false;
        }
        let field_id = descriptor.id.clone();
        let value = option_value.to_string();
        let cascades = self.cascades.clone();
        form.update(move |state| {
            state.set(&field_id, FieldValue::Text(value));
            cascades.apply(&field_id, state);
        });
        true
    }

    /// Toggle a checkbox option in or out of the field's list.
    pub fn toggle_choice(
        &self,
        descriptor: &FieldDescriptor,
        form: &FormHandle,
        option_value: &str,
    ) -> bool {
        if !self.commit_allowed(descriptor, form) {
            return false;
        }
        let field_id = descriptor.id.clone();
        let value = option_value.to_string();
        form.update(move |state| state.toggle_list_entry(&field_id, &value));
        true
    }

    /// Replace a multi-select's whole selection.
    pub fn set_selection(
        &self,
        descriptor: &FieldDescriptor,
        form: &FormHandle,
        values: Vec<String>,
    ) -> bool {
        if !self.commit_allowed(descriptor, form) {
            return false;
        }
        let field_id = descriptor.id.clone();
        form.update(move |state| state.set(&field_id, FieldValue::List(values)));
        true
    }

    /// Commit a confirmed map location: the point plus its sibling address
    /// fields, in one atomic update.  The city falls back to the district
    /// when the geocoder returns an empty city.
    pub fn commit_location(
        &self,
        descriptor: &FieldDescriptor,
        form: &FormHandle,
        selection: LocationSelection,
    ) -> bool {
        if !self.commit_allowed(descriptor, form) {
            return false;
        }
        let field_id = descriptor.id.clone();
        form.update(move |state| {
            state.set(
                &field_id,
                FieldValue::Location(GeoPoint {
                    lat: selection.lat,
                    long: selection.long,
                }),
            );
            let city = if selection.city.is_empty() {
                selection.district.clone()
            } else {
                selection.city.clone()
            };
            state.set("address_city", FieldValue::Text(city));
            state.set("state", FieldValue::Text(selection.state_name.clone()));
            state.set("country", FieldValue::Text(selection.country.clone()));
            state.set("area_code", FieldValue::Text(selection.area_code.clone()));
            state.set("locality", FieldValue::Text(selection.locality.clone()));
        });
        true
    }

    /// Commit a formatted date or time string.
    pub fn commit_moment(
        &self,
        descriptor: &FieldDescriptor,
        form: &FormHandle,
        formatted: &str,
    ) -> bool {
        if !self.commit_allowed(descriptor, form) {
            return false;
        }
        let field_id = descriptor.id.clone();
        let value = formatted.to_string();
        form.update(move |state| state.set(&field_id, FieldValue::Text(value)));
        true
    }

    /// Commit the days picker's formatted date list.
    pub fn commit_days(
        &self,
        descriptor: &FieldDescriptor,
        form: &FormHandle,
        formatted: Vec<String>,
    ) -> bool {
        if !self.commit_allowed(descriptor, form) {
            return false;
        }
        let field_id = descriptor.id.clone();
        form.update(move |state| state.set(&field_id, FieldValue::Dates(formatted)));
        true
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// Notify the observer that `field_id` gained focus.
    pub fn focus(&self, field_id: &str) {
        if let Some(observer) = &self.focus {
            observer(Some(field_id));
        }
    }

    /// Notify the observer that focus left the form's fields.
    pub fn blur(&self) {
        if let Some(observer) = &self.focus {
            observer(None);
        }
    }
}

impl Default for FieldDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FieldDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDispatcher")
            .field("disability", &self.disability)
            .field("cascades", &self.cascades)
            .field("has_focus_observer", &self.focus.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn form() -> FormHandle {
        FormHandle::new(FormState::new())
    }

    #[test]
    fn every_variant_produces_a_control() {
        let dispatcher = FieldDispatcher::new();
        let state = FormState::new();
        let variants = [
            Variant::Input,
            Variant::InputDesc,
            Variant::Number,
            Variant::Radio,
            Variant::Checkbox,
            Variant::Divider,
            Variant::Attributes,
            Variant::Select,
            Variant::LocationPicker,
            Variant::DatePicker,
            Variant::TimePicker,
            Variant::DaysPicker,
            Variant::MultiSelect,
            Variant::Upload,
            Variant::Label,
        ];

        for variant in variants {
            let descriptor = FieldDescriptor::new("field", variant);
            let control = dispatcher.dispatch(&descriptor, &state, false);
            assert_eq!(control.field_id, "field");
        }
    }

    #[test]
    fn preview_only_disables_everything() {
        let dispatcher = FieldDispatcher::new();
        let descriptor = FieldDescriptor::new("productName", Variant::Input);
        let control = dispatcher.dispatch(&descriptor, &FormState::new(), true);
        assert!(control.disabled);
    }

    #[test]
    fn conditional_disable_follows_category() {
        let dispatcher = FieldDispatcher::new();
        let descriptor = FieldDescriptor::new("isVegetarian", Variant::Radio);
        let mut state = FormState::new();

        state.set("productCategory", FieldValue::Text("electronics".into()));
        assert!(dispatcher.dispatch(&descriptor, &state, false).disabled);

        state.set("productCategory", FieldValue::Text("f_and_b".into()));
        assert!(!dispatcher.dispatch(&descriptor, &state, false).disabled);
    }

    #[test]
    fn commit_text_applies_uppercase() {
        let dispatcher = FieldDispatcher::new();
        let handle = form();
        let mut descriptor = FieldDescriptor::new("sku", Variant::Input);
        descriptor.uppercase = true;

        assert!(dispatcher.commit_text(&descriptor, &handle, "ab-12"));
        assert_eq!(handle.snapshot().text("sku"), Some("AB-12"));
    }

    #[test]
    fn commit_text_rejects_over_max_length() {
        let dispatcher = FieldDispatcher::new();
        let handle = form();
        let descriptor = FieldDescriptor::new("pin", Variant::Input).max_length(5);

        assert!(dispatcher.commit_text(&descriptor, &handle, "12345"));
        assert!(!dispatcher.commit_text(&descriptor, &handle, "abcdef"));
        assert_eq!(handle.snapshot().text("pin"), Some("12345"));
    }

    #[test]
    fn commit_number_rounds_decimals() {
        let dispatcher = FieldDispatcher::new();
        let handle = form();
        let mut descriptor = FieldDescriptor::new("weight", Variant::Number);
        descriptor.value_in_decimal = true;

        assert!(dispatcher.commit_number(&descriptor, &handle, "1.239"));
        assert_eq!(
            handle.snapshot().get("weight"),
            Some(&FieldValue::Number("1.24".into()))
        );
    }

    #[test]
    fn disabled_field_rejects_commits() {
        let dispatcher = FieldDispatcher::new();
        let handle = form();
        let mut descriptor = FieldDescriptor::new("locked", Variant::Input);
        descriptor.is_disabled = true;

        assert!(!dispatcher.commit_text(&descriptor, &handle, "nope"));
        assert!(handle.snapshot().is_empty());
    }

    #[test]
    fn conditionally_disabled_field_rejects_commits() {
        let dispatcher = FieldDispatcher::new();
        let handle = form();
        handle.update(|state| state.set("productCategory", FieldValue::Text("electronics".into())));
        let descriptor = FieldDescriptor::new("isVegetarian", Variant::Radio);

        assert!(!dispatcher.select_choice(&descriptor, &handle, "yes"));
        assert_eq!(handle.snapshot().get("isVegetarian"), None);
    }

    #[test]
    fn select_runs_category_cascade() {
        let dispatcher = FieldDispatcher::new();
        let handle = form();
        handle.update(|state| {
            state.set("productSubcategory1", FieldValue::Text("kettles".into()))
        });
        let descriptor = FieldDescriptor::new("productCategory", Variant::Select);

        assert!(dispatcher.select_choice(&descriptor, &handle, "f_and_b"));
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.text("productCategory"), Some("f_and_b"));
        assert_eq!(snapshot.text("productSubcategory1"), Some(""));
    }

    #[test]
    fn checkbox_toggles_membership() {
        let dispatcher = FieldDispatcher::new();
        let handle = form();
        let descriptor = FieldDescriptor::new("days", Variant::Checkbox);

        dispatcher.toggle_choice(&descriptor, &handle, "monday");
        dispatcher.toggle_choice(&descriptor, &handle, "friday");
        dispatcher.toggle_choice(&descriptor, &handle, "monday");

        assert_eq!(
            handle.snapshot().get("days"),
            Some(&FieldValue::List(vec!["friday".into()]))
        );
    }

    #[test]
    fn location_commit_writes_siblings_atomically() {
        let dispatcher = FieldDispatcher::new();
        let handle = form();
        let descriptor = FieldDescriptor::new("location", Variant::LocationPicker);

        let selection = LocationSelection {
            lat: 12.9716,
            long: 77.5946,
            city: String::new(),
            district: "Bengaluru Urban".into(),
            state_name: "Karnataka".into(),
            country: "India".into(),
            area_code: "560001".into(),
            locality: "MG Road".into(),
        };
        assert!(dispatcher.commit_location(&descriptor, &handle, selection));

        let snapshot = handle.snapshot();
        assert_eq!(
            snapshot.get("location"),
            Some(&FieldValue::Location(GeoPoint {
                lat: 12.9716,
                long: 77.5946,
            }))
        );
        // Empty city falls back to the district.
        assert_eq!(snapshot.text("address_city"), Some("Bengaluru Urban"));
        assert_eq!(snapshot.text("state"), Some("Karnataka"));
        assert_eq!(snapshot.text("area_code"), Some("560001"));
        assert_eq!(snapshot.text("locality"), Some("MG Road"));
    }

    #[test]
    fn days_commit_stores_date_list() {
        let dispatcher = FieldDispatcher::new();
        let handle = form();
        let descriptor = FieldDescriptor::new("holidays", Variant::DaysPicker);

        dispatcher.commit_days(
            &descriptor,
            &handle,
            vec!["01/01/2026".into(), "15/08/2026".into()],
        );
        assert_eq!(
            handle.snapshot().get("holidays"),
            Some(&FieldValue::Dates(vec![
                "01/01/2026".into(),
                "15/08/2026".into()
            ]))
        );
    }

    #[test]
    fn focus_and_blur_notify_the_observer_only() {
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let dispatcher = FieldDispatcher::new().with_focus_observer(Arc::new(move |field| {
            sink.lock().unwrap().push(field.map(str::to_string));
        }));
        let handle = form();

        dispatcher.focus("productName");
        dispatcher.blur();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some("productName".to_string()), None]
        );
        assert!(handle.snapshot().is_empty());
    }

    #[test]
    fn value_snapshot_defaults_to_empty() {
        let dispatcher = FieldDispatcher::new();
        let descriptor = FieldDescriptor::new("fresh", Variant::Input);
        let control = dispatcher.dispatch(&descriptor, &FormState::new(), false);
        assert_eq!(control.value, FieldValue::Empty);
    }
}
