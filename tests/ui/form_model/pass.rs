use buildconnect_forms::form::{FieldValue, FormController, FormModel, FormOptions};

#[derive(Clone, Debug, PartialEq, buildconnect_forms::form::FormModel)]
struct DemoForm {
    email: String,
    newsletter: bool,
}

fn main() {
    let fields = DemoForm::fields();
    let form = FormController::new(FormOptions::default());
    form.register_model(&DemoForm {
        email: "a@buildconnect.example".to_string(),
        newsletter: false,
    });
    form.set_field_value(fields.email(), "b@buildconnect.example");
    form.set_field_value(fields.newsletter(), FieldValue::Bool(true));

    let model = form.model::<DemoForm>().expect("model reads back");
    assert_eq!(model.email, "b@buildconnect.example");
    assert!(model.newsletter);
    assert_eq!(DemoForm::field_names(), &["email", "newsletter"]);
}
