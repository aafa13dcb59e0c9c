extern crate self as buildconnect_forms;

pub mod form;
pub mod logging;
pub mod prelude;

pub use form::{FormController, FormOptions, SubmitOutcome};
