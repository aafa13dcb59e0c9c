use std::collections::BTreeMap;

use tracing::{trace, warn};

use super::validation::ValidationResult;
use super::value::{FieldKey, FieldValue, FieldValues};

/// Per-field state as seen by the UI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldState {
    pub value: FieldValue,
    pub is_focused: bool,
    pub is_touched: bool,
    pub is_dirty: bool,
    pub is_validated: bool,
    pub validation: ValidationResult,
}

impl FieldState {
    pub fn new(value: FieldValue) -> Self {
        Self {
            value,
            is_focused: false,
            is_touched: false,
            is_dirty: false,
            is_validated: false,
            validation: ValidationResult::valid(),
        }
    }

    /// An unvalidated field never fails the form.
    pub fn counts_as_valid(&self) -> bool {
        !self.is_validated || self.validation.is_valid
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormState {
    pub is_valid: bool,
    pub is_dirty: bool,
    pub is_touched: bool,
    pub is_submitting: bool,
    pub is_submitted: bool,
    pub submit_count: u32,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            is_valid: true,
            is_dirty: false,
            is_touched: false,
            is_submitting: false,
            is_submitted: false,
            submit_count: 0,
        }
    }
}

/// Partial update merged into a [`FieldState`]. `None` leaves a property alone.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldStatePatch {
    pub value: Option<FieldValue>,
    pub is_focused: Option<bool>,
    pub is_touched: Option<bool>,
    pub is_dirty: Option<bool>,
    pub is_validated: Option<bool>,
    pub validation: Option<ValidationResult>,
}

impl FieldStatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.is_focused = Some(focused);
        self
    }

    pub fn touched(mut self, touched: bool) -> Self {
        self.is_touched = Some(touched);
        self
    }

    pub fn dirty(mut self, dirty: bool) -> Self {
        self.is_dirty = Some(dirty);
        self
    }

    pub fn validated(mut self, validated: bool) -> Self {
        self.is_validated = Some(validated);
        self
    }

    pub fn validation(mut self, result: ValidationResult) -> Self {
        self.validation = Some(result);
        self
    }
}

/// Field registry plus aggregate form state. Every mutation recomputes
/// `FormState::is_valid` before returning.
#[derive(Clone, Debug)]
pub struct FieldStore {
    default_value: FieldValue,
    warn_on_reregister: bool,
    initial_values: BTreeMap<FieldKey, FieldValue>,
    fields: BTreeMap<FieldKey, FieldState>,
    form: FormState,
}

impl FieldStore {
    pub fn new(default_value: FieldValue, warn_on_reregister: bool) -> Self {
        Self {
            default_value,
            warn_on_reregister,
            initial_values: BTreeMap::new(),
            fields: BTreeMap::new(),
            form: FormState::default(),
        }
    }

    /// Creates (or recreates) a field. Returns `true` when an existing
    /// registration was overwritten.
    pub fn register(&mut self, name: FieldKey, initial: Option<FieldValue>) -> bool {
        let value = initial.unwrap_or_else(|| self.default_value.clone());
        let replaced = self
            .fields
            .insert(name.clone(), FieldState::new(value.clone()))
            .is_some();
        if replaced && self.warn_on_reregister {
            warn!(field = %name, "field registered twice; previous state was reset");
        }
        self.initial_values.insert(name, value);
        self.recompute_validity();
        replaced
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        let removed = self.fields.remove(name).is_some();
        self.initial_values.remove(name);
        if removed {
            self.recompute_validity();
        } else {
            trace!(field = name, "unregister ignored for unknown field");
        }
        removed
    }

    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn form_state(&self) -> FormState {
        self.form
    }

    /// Stores a new value and marks the field dirty. Validation is left to the
    /// caller. Unknown fields are ignored.
    pub fn set_value(&mut self, name: &str, value: FieldValue) -> bool {
        let Some(field) = self.fields.get_mut(name) else {
            trace!(field = name, "value write ignored for unknown field");
            return false;
        };
        field.value = value;
        field.is_dirty = true;
        self.form.is_dirty = true;
        true
    }

    pub fn apply_patch(&mut self, name: &str, patch: FieldStatePatch) -> bool {
        let Some(field) = self.fields.get_mut(name) else {
            trace!(field = name, "state write ignored for unknown field");
            return false;
        };
        if let Some(value) = patch.value {
            field.value = value;
        }
        if let Some(focused) = patch.is_focused {
            field.is_focused = focused;
        }
        if let Some(touched) = patch.is_touched {
            field.is_touched = touched;
            if touched {
                self.form.is_touched = true;
            }
        }
        if let Some(dirty) = patch.is_dirty {
            field.is_dirty = dirty;
            if dirty {
                self.form.is_dirty = true;
            }
        }
        if let Some(validated) = patch.is_validated {
            field.is_validated = validated;
        }
        if let Some(validation) = patch.validation {
            field.validation = validation;
        }
        self.recompute_validity();
        true
    }

    pub fn validate_field(&self, name: &str) -> Option<bool> {
        self.fields.get(name).map(|field| field.validation.is_valid)
    }

    /// Marks every field validated and returns the aggregate validity.
    pub fn validate_all(&mut self) -> bool {
        for field in self.fields.values_mut() {
            field.is_validated = true;
        }
        self.recompute_validity();
        self.form.is_valid
    }

    /// Restores each field from `values`, then its registration value, then
    /// the store default. Form state returns to its initial shape, except
    /// that `is_submitting` survives a reset issued mid-submit.
    pub fn reset(&mut self, values: Option<&FieldValues>) {
        for (name, field) in self.fields.iter_mut() {
            let value = values
                .and_then(|values| values.get(name))
                .or_else(|| self.initial_values.get(name))
                .unwrap_or(&self.default_value)
                .clone();
            *field = FieldState::new(value);
        }
        // An in-flight submit keeps its re-entrancy guard.
        self.form = FormState {
            is_submitting: self.form.is_submitting,
            ..FormState::default()
        };
        self.recompute_validity();
    }

    pub fn reset_field(&mut self, name: &str) -> bool {
        let Some(field) = self.fields.get_mut(name) else {
            return false;
        };
        let value = self
            .initial_values
            .get(name)
            .unwrap_or(&self.default_value)
            .clone();
        *field = FieldState::new(value);
        self.recompute_validity();
        true
    }

    pub fn clear_errors(&mut self) {
        for field in self.fields.values_mut() {
            field.validation = ValidationResult::valid();
        }
        self.recompute_validity();
    }

    pub fn values(&self) -> FieldValues {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.value.clone()))
            .collect()
    }

    /// Messages for validated fields that failed.
    pub fn errors(&self) -> BTreeMap<FieldKey, String> {
        self.fields
            .iter()
            .filter(|(_, field)| field.is_validated && !field.validation.is_valid)
            .map(|(name, field)| {
                (
                    name.clone(),
                    field.validation.message.clone().unwrap_or_default(),
                )
            })
            .collect()
    }

    pub fn first_error(&self) -> Option<FieldKey> {
        self.fields
            .iter()
            .find_map(|(name, field)| (!field.counts_as_valid()).then(|| name.clone()))
    }

    pub(super) fn begin_submit(&mut self) {
        self.form.is_submitting = true;
    }

    pub(super) fn finish_submit(&mut self, succeeded: bool) {
        self.form.is_submitting = false;
        if succeeded {
            self.form.is_submitted = true;
            self.form.submit_count = self.form.submit_count.saturating_add(1);
        }
    }

    fn recompute_validity(&mut self) {
        self.form.is_valid = self.fields.values().all(FieldState::counts_as_valid);
    }
}
