use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::circuit::{BLOCK_THRESHOLD, SubmissionCircuit, SubmissionNotice, WARN_THRESHOLD};
use super::error::{FormError, FormResult};
use super::store::{FieldState, FieldStatePatch, FieldStore, FormState};
use super::validation::FormValidators;
use super::value::{FieldKey, FieldValue, FieldValues};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
}

/// When a bound field runs its validator on its own.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationMode {
    OnChange,
    OnBlur,
    OnSubmit,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub validation_mode: ValidationMode,
    pub warn_threshold: u32,
    pub block_threshold: u32,
    /// Value for fields registered without one, and the reset fallback.
    pub default_value: FieldValue,
    pub warn_on_reregister: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::OnBlur,
            warn_threshold: WARN_THRESHOLD,
            block_threshold: BLOCK_THRESHOLD,
            default_value: FieldValue::default(),
            warn_on_reregister: true,
        }
    }
}

impl FormOptions {
    pub fn validate(&self) -> FormResult<()> {
        if self.warn_threshold == 0 {
            return Err(FormError::InvalidOptions("warn_threshold must be at least 1"));
        }
        if self.block_threshold < self.warn_threshold {
            return Err(FormError::InvalidOptions(
                "block_threshold must not be lower than warn_threshold",
            ));
        }
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        if let Err(error) = self.validate() {
            warn!(%error, "adjusting form options");
            self.warn_threshold = self.warn_threshold.max(1);
            self.block_threshold = self.block_threshold.max(self.warn_threshold);
        }
        self
    }
}

/// How a call to [`FormController::submit_form`] ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    Submitted,
    /// At least one field failed validation. Not counted as a failure.
    Invalid,
    /// The circuit is open; the submit function was not called.
    Blocked(SubmissionNotice),
    Failed {
        error_count: u32,
        notice: Option<SubmissionNotice>,
    },
    /// Another submit is in flight; this request was dropped.
    AlreadySubmitting,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted)
    }
}

pub(super) struct FormInner {
    pub(super) store: FieldStore,
    pub(super) circuit: SubmissionCircuit,
    pub(super) submit_state: SubmitState,
}

/// Handle to one form's state. Clones share the same form; separate
/// `FormController::new` calls never share fields or failure counters.
#[derive(Clone)]
pub struct FormController {
    pub(super) options: Arc<FormOptions>,
    pub(super) inner: Arc<RwLock<FormInner>>,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(FormOptions::default())
    }
}

impl FormController {
    pub fn new(options: FormOptions) -> Self {
        let options = options.sanitized();
        let inner = FormInner {
            store: FieldStore::new(options.default_value.clone(), options.warn_on_reregister),
            circuit: SubmissionCircuit::new(options.warn_threshold, options.block_threshold),
            submit_state: SubmitState::Idle,
        };
        Self {
            options: Arc::new(options),
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// Creates the field, or resets it if the name is already registered.
    pub fn register_field(&self, name: impl Into<FieldKey>, initial: Option<FieldValue>) -> bool {
        self.write().store.register(name.into(), initial)
    }

    pub fn register_field_with(&self, name: impl Into<FieldKey>, initial: impl Into<FieldValue>) {
        self.register_field(name, Some(initial.into()));
    }

    pub fn unregister_field(&self, name: &str) -> bool {
        self.write().store.unregister(name)
    }

    pub fn field_state(&self, name: &str) -> Option<FieldState> {
        self.read().store.field(name).cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.read().store.contains(name)
    }

    pub fn set_field_value(&self, name: &str, value: impl Into<FieldValue>) -> bool {
        self.write().store.set_value(name, value.into())
    }

    pub fn set_field_state(&self, name: &str, patch: FieldStatePatch) -> bool {
        self.write().store.apply_patch(name, patch)
    }

    pub fn validate_field(&self, name: &str) -> Option<bool> {
        self.read().store.validate_field(name)
    }

    pub fn validate_form(&self) -> bool {
        self.write().store.validate_all()
    }

    pub fn reset_form(&self, values: Option<&FieldValues>) {
        self.write().store.reset(values);
    }

    pub fn reset_field(&self, name: &str) -> bool {
        self.write().store.reset_field(name)
    }

    pub fn clear_errors(&self) {
        self.write().store.clear_errors();
    }

    pub fn values(&self) -> FieldValues {
        self.read().store.values()
    }

    pub fn errors(&self) -> BTreeMap<FieldKey, String> {
        self.read().store.errors()
    }

    pub fn first_error(&self) -> Option<FieldKey> {
        self.read().store.first_error()
    }

    /// The message to render under a field: only once the field has been
    /// touched or validated, and only when it is invalid.
    pub fn display_error(&self, name: &str) -> Option<String> {
        let inner = self.read();
        let field = inner.store.field(name)?;
        if !(field.is_touched || field.is_validated) || field.validation.is_valid {
            return None;
        }
        field.validation.message.clone()
    }

    pub fn form_state(&self) -> FormState {
        self.read().store.form_state()
    }

    pub fn submit_state(&self) -> SubmitState {
        self.read().submit_state
    }

    pub fn circuit(&self) -> SubmissionCircuit {
        self.read().circuit
    }

    pub fn notice(&self) -> Option<SubmissionNotice> {
        self.read().circuit.notice()
    }

    pub fn is_submit_disabled(&self) -> bool {
        let inner = self.read();
        inner.submit_state != SubmitState::Idle || inner.circuit.is_blocked()
    }

    /// Hides the current warning (and lifts a block) until the next failure.
    pub fn dismiss_warning(&self) {
        let mut inner = self.write();
        inner.circuit.dismiss();
        debug!(
            error_count = inner.circuit.error_count(),
            "submission warning dismissed"
        );
    }

    /// Validates every field with `validators`, then calls `on_submit` with the
    /// form values if the form is valid and the circuit allows it.
    ///
    /// Validators run under the form lock and must not call back into this
    /// controller. Failures of `on_submit` are recorded, never returned.
    pub async fn submit_form<F, Fut, E>(
        &self,
        validators: &FormValidators,
        on_submit: F,
    ) -> SubmitOutcome
    where
        F: FnOnce(FieldValues) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let values = {
            let mut inner = self.write();
            if inner.submit_state != SubmitState::Idle {
                debug!("submit ignored while another submit is in flight");
                return SubmitOutcome::AlreadySubmitting;
            }
            transition_submit_state(&mut inner, SubmitState::Validating);

            let values = inner.store.values();
            for (key, result) in validators.run(&values) {
                inner
                    .store
                    .apply_patch(key.as_str(), FieldStatePatch::new().validation(result));
            }
            if !inner.store.validate_all() {
                transition_submit_state(&mut inner, SubmitState::Idle);
                debug!(errors = inner.store.errors().len(), "submit stopped by validation");
                return SubmitOutcome::Invalid;
            }
            if let Some(notice @ SubmissionNotice::Blocked { .. }) = inner.circuit.notice() {
                transition_submit_state(&mut inner, SubmitState::Idle);
                warn!(
                    error_count = inner.circuit.error_count(),
                    "submit refused while circuit is open"
                );
                return SubmitOutcome::Blocked(notice);
            }

            transition_submit_state(&mut inner, SubmitState::Submitting);
            inner.store.begin_submit();
            values
        };

        let mut in_flight = InFlightSubmit {
            controller: self,
            settled: false,
        };
        let result = on_submit(values).await;
        in_flight.settled = true;

        let mut inner = self.write();
        let outcome = match result {
            Ok(()) => {
                inner.store.finish_submit(true);
                inner.circuit.record_success();
                debug!(
                    submit_count = inner.store.form_state().submit_count,
                    "submission succeeded"
                );
                SubmitOutcome::Submitted
            }
            Err(error) => {
                inner.store.finish_submit(false);
                let notice = inner.circuit.record_failure();
                let error_count = inner.circuit.error_count();
                warn!(%error, error_count, "submission failed");
                SubmitOutcome::Failed {
                    error_count,
                    notice,
                }
            }
        };
        transition_submit_state(&mut inner, SubmitState::Idle);
        outcome
    }

    pub(super) fn read(&self) -> RwLockReadGuard<'_, FormInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn write(&self) -> RwLockWriteGuard<'_, FormInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the in-flight flags when a submit future is dropped, or its submit
/// function panics, before the result comes back. Abandoned attempts do not
/// count toward the circuit.
struct InFlightSubmit<'a> {
    controller: &'a FormController,
    settled: bool,
}

impl Drop for InFlightSubmit<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.controller.write();
        inner.store.finish_submit(false);
        transition_submit_state(&mut inner, SubmitState::Idle);
        warn!("submit abandoned before the submit function returned");
    }
}

fn transition_submit_state(inner: &mut FormInner, next: SubmitState) {
    let current = inner.submit_state;
    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Validating)
            | (SubmitState::Validating, SubmitState::Submitting)
            | (SubmitState::Validating, SubmitState::Idle)
            | (SubmitState::Submitting, SubmitState::Idle)
    );
    debug_assert!(allowed, "invalid submit state transition: {current:?} -> {next:?}");
    if !allowed {
        warn!(?current, ?next, "invalid submit state transition");
    }
    inner.submit_state = next;
}
