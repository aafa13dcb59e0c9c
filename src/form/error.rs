use thiserror::Error;

use super::value::FieldKey;

/// Failures reading typed data out of a form or configuring one.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("invalid form options: {0}")]
    InvalidOptions(&'static str),
    #[error("field `{0}` is not registered")]
    MissingField(FieldKey),
    #[error("field `{field}` holds a {found} value, expected {expected}")]
    TypeMismatch {
        field: FieldKey,
        expected: &'static str,
        found: &'static str,
    },
}

/// Rejection reasons for an injected submit function. Any `Err` counts as a
/// failed submission; the variant only matters for logs.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SubmitError {
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("service unavailable")]
    Unavailable,
    #[error("request timed out")]
    Timeout,
}

pub type FormResult<T> = Result<T, FormError>;
