use rust_decimal::Decimal;

use super::controller::FormController;
use super::error::{FormError, FormResult};
use super::value::{FieldKey, FieldValue, FieldValues};

/// Field types a [`FormModel`] struct may contain.
pub trait FromFieldValue: Sized + Into<FieldValue> {
    const KIND: &'static str;

    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

impl FromFieldValue for String {
    const KIND: &'static str = "text";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_text().map(str::to_string)
    }
}

impl FromFieldValue for bool {
    const KIND: &'static str = "bool";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromFieldValue for Vec<String> {
    const KIND: &'static str = "list";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_list().map(<[String]>::to_vec)
    }
}

impl FromFieldValue for Decimal {
    const KIND: &'static str = "number";

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_number()
    }
}

/// A typed view over a form's values. Usually derived with
/// `#[derive(FormModel)]`.
pub trait FormModel: Sized {
    type Fields;

    fn fields() -> Self::Fields;
    fn field_names() -> &'static [&'static str];
    fn to_values(&self) -> FieldValues;
    fn from_values(values: &FieldValues) -> FormResult<Self>;
}

/// Reads one typed field out of `values`.
pub fn read_field<T>(values: &FieldValues, name: &str) -> FormResult<T>
where
    T: FromFieldValue,
{
    let value = values
        .get(name)
        .ok_or_else(|| FormError::MissingField(FieldKey::new(name)))?;
    T::from_field_value(value).ok_or_else(|| FormError::TypeMismatch {
        field: FieldKey::new(name),
        expected: T::KIND,
        found: value.kind(),
    })
}

impl FormController {
    /// Registers one field per model field, seeded with the model's values.
    pub fn register_model<T>(&self, model: &T)
    where
        T: FormModel,
    {
        for (name, value) in model.to_values() {
            self.register_field(name, Some(value));
        }
    }

    pub fn model<T>(&self) -> FormResult<T>
    where
        T: FormModel,
    {
        T::from_values(&self.values())
    }
}
