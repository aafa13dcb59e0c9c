pub use crate::form::{
    EMAIL_MESSAGE, FieldBinding, FieldKey, FieldState, FieldStatePatch, FieldValue, FieldValues,
    FormController, FormError, FormModel, FormOptions, FormState, FormValidators,
    REQUIRED_MESSAGE, StepDirection, StepOptions, SubmissionNotice, SubmitError, SubmitOutcome,
    ValidationMode, ValidationResult, Validator, compose, email, matches_field, max_length,
    min_length, pattern, required,
};
