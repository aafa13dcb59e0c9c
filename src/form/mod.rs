mod binding;
mod circuit;
mod controller;
mod error;
mod model;
mod store;
mod validation;
mod value;


pub use binding::{FieldBinding, StepDirection, StepOptions};
pub use buildconnect_forms_derive::FormModel;
pub use circuit::{BLOCK_THRESHOLD, SubmissionCircuit, SubmissionNotice, WARN_THRESHOLD};
pub use controller::{FormController, FormOptions, SubmitOutcome, SubmitState, ValidationMode};
pub use error::{FormError, FormResult, SubmitError};
pub use model::{FormModel, FromFieldValue, read_field};
pub use store::{FieldState, FieldStatePatch, FieldStore, FormState};
pub use validation::{
    EMAIL_MESSAGE, FormValidators, REQUIRED_MESSAGE, ValidationResult, Validator, compose, email,
    matches_field, max_length, min_length, pattern, required,
};
pub use value::{FieldKey, FieldValue, FieldValues};
