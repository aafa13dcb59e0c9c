use std::cell::Cell;
use std::time::Duration;

use buildconnect_forms::logging::{LogConfig, init_logging};
use buildconnect_forms::prelude::*;
use clap::{ArgAction, Parser};
use futures::executor::block_on;
use futures_timer::Delay;
use rust_decimal::Decimal;
use tracing::info;

#[derive(Parser)]
#[command(name = "signup_demo", about = "Walks a supplier signup form through a flaky endpoint")]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Disable colored log output.
    #[arg(long = "no-color")]
    no_color: bool,

    /// Requests the endpoint rejects before accepting one.
    #[arg(long, default_value_t = 5)]
    failures: u32,
}

#[derive(Clone, Debug, FormModel)]
struct SupplierSignup {
    email: String,
    password: String,
    confirm_password: String,
    company: String,
    seats: Decimal,
    accept_terms: bool,
}

/// Stand-in for the registration endpoint: rejects the first few requests.
struct FlakyEndpoint {
    failures_left: Cell<u32>,
    latency: Duration,
}

impl FlakyEndpoint {
    async fn register(&self, values: FieldValues) -> Result<(), SubmitError> {
        Delay::new(self.latency).await;
        let left = self.failures_left.get();
        if left > 0 {
            self.failures_left.set(left - 1);
            return Err(SubmitError::Unavailable);
        }
        info!(fields = values.len(), "registration accepted");
        Ok(())
    }
}

fn validators() -> FormValidators {
    let fields = SupplierSignup::fields();
    FormValidators::new()
        .with(
            fields.email(),
            compose([required("Email is required"), email(EMAIL_MESSAGE)]),
        )
        .with(
            fields.password(),
            compose([
                required("Password is required"),
                min_length(8, "Password must be at least 8 characters"),
            ]),
        )
        .with(
            fields.confirm_password(),
            compose([
                required("Please confirm your password"),
                matches_field(fields.password(), "Passwords do not match"),
            ]),
        )
        .with(
            fields.company(),
            max_length(80, "Company name must be at most 80 characters"),
        )
        .with(
            fields.accept_terms(),
            required("You must accept the terms to continue"),
        )
}

fn main() {
    let cli = Cli::parse();
    let log_config = LogConfig::from_verbosity(cli.verbose).with_ansi(!cli.no_color);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("logging disabled: {error}");
    }

    let form = FormController::new(FormOptions::default());
    form.register_model(&SupplierSignup {
        email: String::new(),
        password: String::new(),
        confirm_password: String::new(),
        company: String::new(),
        seats: Decimal::ONE,
        accept_terms: false,
    });

    let validators = validators();
    let fields = SupplierSignup::fields();
    let email_field = form.bind(fields.email(), validators.get(fields.email()).cloned());
    email_field.focus();
    email_field.change("bad");
    email_field.blur();
    info!(error = ?email_field.error_for_display(), "email after blur");

    email_field.change("buyer@buildconnect.example");
    form.bind(fields.password(), None).change("abc12345");
    form.bind(fields.confirm_password(), None).change("abc12345");
    form.bind(fields.accept_terms(), None).change(true);

    let seats = form.bind(fields.seats(), None);
    let seat_steps = StepOptions {
        min: Some(Decimal::ONE),
        max: Some(Decimal::from(50)),
        ..StepOptions::default()
    };
    seats.step(StepDirection::Increment, &seat_steps);
    seats.step(StepDirection::Increment, &seat_steps);

    let endpoint = FlakyEndpoint {
        failures_left: Cell::new(cli.failures),
        latency: Duration::from_millis(50),
    };

    for attempt in 1..=8 {
        let outcome = block_on(form.submit_form(&validators, |values| endpoint.register(values)));
        info!(attempt, ?outcome, "submit attempt finished");
        if let Some(notice) = form.notice() {
            info!(%notice, "banner shown");
        }
        match outcome {
            SubmitOutcome::Submitted => break,
            SubmitOutcome::Blocked(_) => {
                info!("user dismissed the banner");
                form.dismiss_warning();
            }
            _ => {}
        }
    }

    match form.model::<SupplierSignup>() {
        Ok(model) => info!(
            email = %model.email,
            seats = %model.seats,
            submit_count = form.form_state().submit_count,
            "final form"
        ),
        Err(error) => eprintln!("could not read form: {error}"),
    }
}
