use crate::model::{FieldValue, FormErrors, FormValues};

/// Values and errors owned by the engine.
///
/// Readers get shared references only; writes go through the `pub(super)`
/// transition helpers so every view is a projection of this state. `version`
/// increases on each effective write.
#[derive(Debug, Clone, Default)]
pub struct FormStore {
    values: FormValues,
    errors: FormErrors,
    version: u64,
}

impl FormStore {
    #[cfg(test)]
    pub fn with_state(values: FormValues, errors: FormErrors) -> Self {
        Self {
            values,
            errors,
            version: 0,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn error_for(&self, field_id: &str) -> Option<&str> {
        self.errors.get(field_id).map(String::as_str)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(super) fn set(&mut self, field_id: &str, value: FieldValue) {
        self.values.insert(field_id.to_string(), value);
        self.version += 1;
    }

    pub(super) fn clear_error(&mut self, field_id: &str) -> bool {
        let removed = self.errors.remove(field_id).is_some();
        if removed {
            self.version += 1;
        }
        removed
    }

    pub(super) fn replace_errors(&mut self, errors: FormErrors) {
        self.errors = errors;
        self.version += 1;
    }
}
