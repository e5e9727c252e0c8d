use std::collections::{BTreeMap, HashMap};

/// Form fields are addressed by the `name` attribute the host renders.
pub type FieldName = String;

/// Read-only access to the current value of each named field.
///
/// The host owns the values; the engine only ever borrows them for the
/// duration of one validation pass. A field the host does not know about
/// reads as `None`, which the evaluator treats like an empty value.
pub trait FieldSource {
    fn value(&self, field: &str) -> Option<&str>;
}

impl FieldSource for BTreeMap<String, String> {
    fn value(&self, field: &str) -> Option<&str> {
        self.get(field).map(String::as_str)
    }
}

impl FieldSource for HashMap<String, String> {
    fn value(&self, field: &str) -> Option<&str> {
        self.get(field).map(String::as_str)
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn value(&self, field: &str) -> Option<&str> {
        (**self).value(field)
    }
}
