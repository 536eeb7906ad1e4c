//! Shared form state and the single mutation entry point.
//!
//! [`FormState`] is the mapping from field id to [`FieldValue`] that the
//! whole form reads and writes.  It is owned by the host page; the engine
//! only holds a [`FormHandle`] and requests mutations through it.
//!
//! [`FormHandle`] is a type around `Arc<Mutex<FormState>>` — cheap to clone
//! and safe to share across tasks.  All mutations go through
//! [`FormHandle::update`], which takes a closure over the *previous* state so
//! that async completions arriving out of order compose without lost
//! updates.  Lock with a short critical section; the handle never holds the
//! lock across `.await` points.

pub mod value;

pub use value::{FieldValue, GeoPoint, ImageRef};

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FormState
// ---------------------------------------------------------------------------

/// Mapping from field id to the field's current value.
///
/// Backed by a `BTreeMap` so that snapshots serialise in a stable key order.
/// Every mutation touches only the keys named by the current operation; all
/// other entries are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState {
    fields: BTreeMap<String, FieldValue>,
}

impl FormState {
    /// Create an empty form state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `field_id`, if any.
    pub fn get(&self, field_id: &str) -> Option<&FieldValue> {
        self.fields.get(field_id)
    }

    /// Set `field_id` to `value`, leaving every other key untouched.
    pub fn set(&mut self, field_id: &str, value: FieldValue) {
        self.fields.insert(field_id.to_string(), value);
    }

    /// Remove `field_id` entirely.
    pub fn remove(&mut self, field_id: &str) -> Option<FieldValue> {
        self.fields.remove(field_id)
    }

    /// Borrow the value of `field_id` as text, when it holds text.
    ///
    /// Covers both [`FieldValue::Text`] and [`FieldValue::Number`] (numeric
    /// fields store their value as a string).
    pub fn text(&self, field_id: &str) -> Option<&str> {
        match self.fields.get(field_id) {
            Some(FieldValue::Text(s)) | Some(FieldValue::Number(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrow the image list of `field_id`; empty when the field is unset or
    /// holds a different shape.
    pub fn images(&self, field_id: &str) -> &[ImageRef] {
        match self.fields.get(field_id) {
            Some(FieldValue::Images(refs)) => refs,
            _ => &[],
        }
    }

    /// Append `items` to the image list of `field_id`, creating the list if
    /// the field is unset.  Existing entries are always preserved.
    pub fn push_images(&mut self, field_id: &str, items: Vec<ImageRef>) {
        match self.fields.get_mut(field_id) {
            Some(FieldValue::Images(refs)) => refs.extend(items),
            _ => {
                self.fields
                    .insert(field_id.to_string(), FieldValue::Images(items));
            }
        }
    }

    /// Remove the image with the given `name` from the image list of
    /// `field_id`.  A no-op when the field holds no matching entry.
    pub fn remove_image(&mut self, field_id: &str, name: &str) {
        if let Some(FieldValue::Images(refs)) = self.fields.get_mut(field_id) {
            refs.retain(|image| image.name != name);
        }
    }

    /// Toggle membership of `value` in the string list of `field_id`,
    /// creating the list if the field is unset.
    pub fn toggle_list_entry(&mut self, field_id: &str, value: &str) {
        match self.fields.get_mut(field_id) {
            Some(FieldValue::List(entries)) => {
                if let Some(pos) = entries.iter().position(|e| e == value) {
                    entries.remove(pos);
                } else {
                    entries.push(value.to_string());
                }
            }
            _ => {
                self.fields
                    .insert(field_id.to_string(), FieldValue::List(vec![value.to_string()]));
            }
        }
    }

    /// Number of fields currently present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when no field has a value yet.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(field id, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }
}

// ---------------------------------------------------------------------------
// FormHandle
// ---------------------------------------------------------------------------

/// Shared handle to the parent-owned [`FormState`].
///
/// The engine never keeps its own copy of the state: it reads the latest
/// snapshot with [`snapshot`](Self::snapshot) and requests mutations through
/// [`update`](Self::update) (transform the previous state) or
/// [`replace`](Self::replace) (swap in a whole new state).
#[derive(Debug, Clone)]
pub struct FormHandle {
    inner: Arc<Mutex<FormState>>,
}

impl FormHandle {
    /// Wrap a fresh state.
    pub fn new(initial: FormState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    /// Wrap a state cell owned elsewhere (the host page keeps its own clone
    /// of the `Arc`).
    pub fn from_shared(inner: Arc<Mutex<FormState>>) -> Self {
        Self { inner }
    }

    /// Clone out the latest snapshot.
    pub fn snapshot(&self) -> FormState {
        self.inner.lock().unwrap().clone()
    }

    /// Replace the whole state with `next`.
    pub fn replace(&self, next: FormState) {
        *self.inner.lock().unwrap() = next;
    }

    /// Apply `mutate` to the current state under the lock.
    ///
    /// This is the form used by every async completion so that two
    /// operations finishing out of order both apply cleanly.
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut FormState),
    {
        let mut state = self.inner.lock().unwrap();
        mutate(&mut state);
    }
}

impl Default for FormHandle {
    fn default() -> Self {
        Self::new(FormState::new())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
