//! Cross-field rule registries.
//!
//! Two kinds of rules key off a field id:
//! * [`DisabilityRules`] — `field id -> predicate(&FormState) -> bool`;
//!   the dispatcher consults them on every render so one field's value can
//!   lock another field.
//! * [`CascadeRules`] — `field id -> mutation(&mut FormState)`; applied
//!   after a select commit so a parent choice can reset dependent fields.
//!
//! New rules are registered on the registries; the dispatcher itself never
//! branches on field ids.

use std::collections::HashMap;
use std::sync::Arc;

use crate::state::{FieldValue, FormState};

// ---------------------------------------------------------------------------
// DisabilityRules
// ---------------------------------------------------------------------------

/// Predicate deciding whether a field is disabled given the current state.
pub type DisablePredicate = Arc<dyn Fn(&FormState) -> bool + Send + Sync>;

/// Registry of conditional-disable rules.
#[derive(Clone, Default)]
pub struct DisabilityRules {
    rules: HashMap<String, DisablePredicate>,
}

impl DisabilityRules {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rules shipped with the product form: the vegetarian flag is
    /// locked unless the selected category is food & beverage.
    pub fn builtin() -> Self {
        let mut rules = Self::empty();
        rules.insert("isVegetarian", |state: &FormState| {
            state
                .text("productCategory")
                .is_some_and(|category| !category.is_empty() && category != "f_and_b")
        });
        rules
    }

    /// Register (or override) a rule for `field_id`.
    pub fn insert<F>(&mut self, field_id: impl Into<String>, predicate: F)
    where
        F: Fn(&FormState) -> bool + Send + Sync + 'static,
    {
        self.rules.insert(field_id.into(), Arc::new(predicate));
    }

    /// `true` when a rule for `field_id` fires against `state`.
    pub fn is_disabled(&self, field_id: &str, state: &FormState) -> bool {
        self.rules
            .get(field_id)
            .is_some_and(|predicate| predicate(state))
    }
}

impl std::fmt::Debug for DisabilityRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisabilityRules")
            .field("fields", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// CascadeRules
// ---------------------------------------------------------------------------

/// Mutation applied to the state after a field commits.
pub type CascadeFn = Arc<dyn Fn(&mut FormState) + Send + Sync>;

/// Registry of post-commit cascades.
#[derive(Clone, Default)]
pub struct CascadeRules {
    rules: HashMap<String, CascadeFn>,
}

impl CascadeRules {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The cascades shipped with the product form: changing the category
    /// invalidates the dependent subcategory.
    pub fn builtin() -> Self {
        let mut rules = Self::empty();
        rules.insert("productCategory", |state: &mut FormState| {
            state.set("productSubcategory1", FieldValue::Text(String::new()));
        });
        rules
    }

    /// Register (or override) a cascade for `field_id`.
    pub fn insert<F>(&mut self, field_id: impl Into<String>, cascade: F)
    where
        F: Fn(&mut FormState) + Send + Sync + 'static,
    {
        self.rules.insert(field_id.into(), Arc::new(cascade));
    }

    /// Run the cascade registered for `field_id`, if any.
    pub fn apply(&self, field_id: &str, state: &mut FormState) {
        if let Some(cascade) = self.rules.get(field_id) {
            cascade(state);
        }
    }
}

impl std::fmt::Debug for CascadeRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeRules")
            .field("fields", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vegetarian_rule_follows_category() {
        let rules = DisabilityRules::builtin();
        let mut state = FormState::new();

        // No category selected yet: not disabled.
        assert!(!rules.is_disabled("isVegetarian", &state));

        state.set("productCategory", FieldValue::Text("electronics".into()));
        assert!(rules.is_disabled("isVegetarian", &state));

        state.set("productCategory", FieldValue::Text("f_and_b".into()));
        assert!(!rules.is_disabled("isVegetarian", &state));
    }

    #[test]
    fn unruled_fields_are_never_disabled() {
        let rules = DisabilityRules::builtin();
        let state = FormState::new();
        assert!(!rules.is_disabled("productName", &state));
    }

    #[test]
    fn custom_rule_can_be_registered() {
        let mut rules = DisabilityRules::empty();
        rules.insert("b", |state: &FormState| state.text("a") == Some("lock"));

        let mut state = FormState::new();
        assert!(!rules.is_disabled("b", &state));
        state.set("a", FieldValue::Text("lock".into()));
        assert!(rules.is_disabled("b", &state));
    }

    #[test]
    fn category_cascade_resets_subcategory() {
        let cascades = CascadeRules::builtin();
        let mut state = FormState::new();
        state.set("productSubcategory1", FieldValue::Text("kettles".into()));

        cascades.apply("productCategory", &mut state);
        assert_eq!(state.text("productSubcategory1"), Some(""));
    }

    #[test]
    fn apply_without_rule_is_a_no_op() {
        let cascades = CascadeRules::builtin();
        let mut state = FormState::new();
        state.set("x", FieldValue::Text("y".into()));

        cascades.apply("unrelated", &mut state);
        assert_eq!(state.text("x"), Some("y"));
    }
}
