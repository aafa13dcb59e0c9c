use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::value::{FieldKey, FieldValue, FieldValues};

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile")
});

/// Outcome of running one validator against one value.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

type ValidatorFn = dyn Fn(&FieldValue, &FieldValues) -> ValidationResult + Send + Sync;

/// A field validator. Receives the field's value and the whole form's values
/// so cross-field rules never have to look outside the store.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

impl Validator {
    pub fn new<F>(validate: F) -> Self
    where
        F: Fn(&FieldValue, &FieldValues) -> ValidationResult + Send + Sync + 'static,
    {
        Self(Arc::new(validate))
    }

    pub fn validate(&self, value: &FieldValue, values: &FieldValues) -> ValidationResult {
        (self.0)(value, values)
    }

    /// Runs `self`, then `next` only if `self` passed.
    pub fn and(self, next: Validator) -> Validator {
        compose([self, next])
    }
}

impl Debug for Validator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Validator")
    }
}

/// Optional fields skip every rule except `required` while left empty.
fn optional(
    check: impl Fn(&FieldValue, &FieldValues) -> ValidationResult + Send + Sync + 'static,
) -> Validator {
    Validator::new(move |value, values| {
        if value.is_empty() {
            ValidationResult::valid()
        } else {
            check(value, values)
        }
    })
}

pub fn required(message: impl Into<String>) -> Validator {
    let message = message.into();
    Validator::new(move |value, _| {
        if value.is_blank() {
            ValidationResult::invalid(message.clone())
        } else {
            ValidationResult::valid()
        }
    })
}

/// Text must match `regex`. Non-text values pass.
pub fn pattern(regex: Regex, message: impl Into<String>) -> Validator {
    let message = message.into();
    optional(move |value, _| match value.as_text() {
        Some(text) if !regex.is_match(text) => ValidationResult::invalid(message.clone()),
        _ => ValidationResult::valid(),
    })
}

pub fn email(message: impl Into<String>) -> Validator {
    pattern(EMAIL_REGEX.clone(), message)
}

/// Inclusive lower bound on characters (text) or items (lists).
pub fn min_length(min: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    optional(move |value, _| match value.length() {
        Some(length) if length < min => ValidationResult::invalid(message.clone()),
        _ => ValidationResult::valid(),
    })
}

/// Inclusive upper bound on characters (text) or items (lists).
pub fn max_length(max: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    optional(move |value, _| match value.length() {
        Some(length) if length > max => ValidationResult::invalid(message.clone()),
        _ => ValidationResult::valid(),
    })
}

/// Value must equal the current value of `other` ("confirm password").
pub fn matches_field(other: impl Into<FieldKey>, message: impl Into<String>) -> Validator {
    let other = other.into();
    let message = message.into();
    optional(move |value, values| {
        if values.get(other.as_str()) == Some(value) {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(message.clone())
        }
    })
}

/// Runs validators in order and stops at the first failure.
pub fn compose(validators: impl IntoIterator<Item = Validator>) -> Validator {
    let validators: Vec<Validator> = validators.into_iter().collect();
    Validator::new(move |value, values| {
        for validator in &validators {
            let result = validator.validate(value, values);
            if !result.is_valid {
                return result;
            }
        }
        ValidationResult::valid()
    })
}

/// Caller-owned validator table. The store never holds these; the UI layer
/// runs them and reports the results back.
#[derive(Clone, Debug, Default)]
pub struct FormValidators {
    by_field: BTreeMap<FieldKey, Validator>,
}

impl FormValidators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<FieldKey>, validator: Validator) -> Self {
        self.insert(field, validator);
        self
    }

    pub fn insert(&mut self, field: impl Into<FieldKey>, validator: Validator) {
        self.by_field.insert(field.into(), validator);
    }

    pub fn remove(&mut self, field: &str) -> Option<Validator> {
        self.by_field.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&Validator> {
        self.by_field.get(field)
    }

    /// Validates every field present in `values` that has a validator.
    pub fn run(&self, values: &FieldValues) -> Vec<(FieldKey, ValidationResult)> {
        values
            .iter()
            .filter_map(|(key, value)| {
                self.by_field
                    .get(key)
                    .map(|validator| (key.clone(), validator.validate(value, values)))
            })
            .collect()
    }
}
