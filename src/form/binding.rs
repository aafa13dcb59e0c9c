use std::str::FromStr;

use rust_decimal::Decimal;

use super::controller::{FormController, ValidationMode};
use super::store::{FieldState, FieldStatePatch};
use super::validation::{ValidationResult, Validator};
use super::value::{FieldKey, FieldValue};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepDirection {
    Increment,
    Decrement,
}

/// Bounds and grid for numeric stepper fields.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StepOptions {
    pub step: Decimal,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub precision: Option<u32>,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            step: Decimal::ONE,
            min: None,
            max: None,
            precision: None,
        }
    }
}

impl StepOptions {
    fn clamp(&self, mut value: Decimal) -> Decimal {
        if let Some(min) = self.min {
            value = value.max(min);
        }
        if let Some(max) = self.max {
            value = value.min(max);
        }
        value
    }
}

/// Glue between one input element and the form: forwards value, focus and
/// blur events, and runs the field's validator according to the form's
/// [`ValidationMode`].
#[derive(Clone)]
pub struct FieldBinding {
    controller: FormController,
    key: FieldKey,
    validator: Option<Validator>,
}

impl FormController {
    pub fn bind(&self, name: impl Into<FieldKey>, validator: Option<Validator>) -> FieldBinding {
        FieldBinding {
            controller: self.clone(),
            key: name.into(),
            validator,
        }
    }
}

impl FieldBinding {
    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn mount(&self, initial: Option<FieldValue>) {
        self.controller.register_field(self.key.clone(), initial);
    }

    pub fn unmount(&self) {
        self.controller.unregister_field(self.key.as_str());
    }

    pub fn state(&self) -> Option<FieldState> {
        self.controller.field_state(self.key.as_str())
    }

    pub fn value(&self) -> Option<FieldValue> {
        self.state().map(|state| state.value)
    }

    pub fn change(&self, value: impl Into<FieldValue>) -> bool {
        if !self.controller.set_field_value(self.key.as_str(), value) {
            return false;
        }
        let already_validated = self.state().is_some_and(|state| state.is_validated);
        if self.controller.options().validation_mode == ValidationMode::OnChange
            || already_validated
        {
            self.validate();
        }
        true
    }

    /// A plain value callback for widgets that report new values directly.
    pub fn on_change(&self) -> impl Fn(FieldValue) + Send + Sync + 'static {
        let binding = self.clone();
        move |value: FieldValue| {
            binding.change(value);
        }
    }

    pub fn focus(&self) -> bool {
        self.controller
            .set_field_state(self.key.as_str(), FieldStatePatch::new().focused(true))
    }

    pub fn blur(&self) -> bool {
        if !self.controller.set_field_state(
            self.key.as_str(),
            FieldStatePatch::new().focused(false).touched(true),
        ) {
            return false;
        }
        if self.controller.options().validation_mode != ValidationMode::OnSubmit {
            self.validate();
        }
        true
    }

    /// Runs the validator against the current values and reports the result
    /// into the store. Returns the field's validity; unknown fields are valid.
    pub fn validate(&self) -> bool {
        let values = self.controller.values();
        let Some(value) = values.get(self.key.as_str()) else {
            return true;
        };
        let result = self
            .validator
            .as_ref()
            .map(|validator| validator.validate(value, &values))
            .unwrap_or_else(ValidationResult::valid);
        let is_valid = result.is_valid;
        self.controller.set_field_state(
            self.key.as_str(),
            FieldStatePatch::new().validation(result).validated(true),
        );
        is_valid
    }

    pub fn error_for_display(&self) -> Option<String> {
        self.controller.display_error(self.key.as_str())
    }

    /// Moves a numeric field one step and reports the new value like any other
    /// change. Text values are parsed; anything unparsable starts from zero.
    pub fn step(&self, direction: StepDirection, options: &StepOptions) -> Option<Decimal> {
        let current = self.value()?;
        let current = match current {
            FieldValue::Number(value) => Some(value),
            FieldValue::Text(text) => parse_number(&text),
            _ => None,
        };
        let next = stepped_value(current, direction, options);
        self.change(FieldValue::Number(next)).then_some(next)
    }
}

pub(super) fn parse_number(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "." || trimmed == "-." {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

/// Next value on the step grid anchored at `min` (or zero), clamped to bounds.
pub(super) fn stepped_value(
    current: Option<Decimal>,
    direction: StepDirection,
    options: &StepOptions,
) -> Decimal {
    let step = if options.step.is_zero() {
        Decimal::ONE
    } else {
        options.step.abs()
    };
    let current = options.clamp(current.unwrap_or(Decimal::ZERO));
    let base = options.min.unwrap_or(Decimal::ZERO);
    let delta = match direction {
        StepDirection::Increment => step,
        StepDirection::Decrement => -step,
    };
    let raw_next = current + delta;
    let snapped = ((raw_next - base) / step).round() * step + base;
    let clamped = options.clamp(snapped);
    match options.precision {
        Some(precision) => clamped.round_dp(precision).normalize(),
        None => clamped.normalize(),
    }
}
