pub mod store;

use crate::model::{validate_schema, FieldValue, FormSchema, FormSectionSchema, FormValues, User};
use crate::validation::validate_section;
use store::FormStore;
use tracing::{debug, info, warn};

pub const SCHEMA_UNAVAILABLE_MSG: &str = "Failed to load form data. Please try again.";

#[derive(Debug)]
pub enum Phase {
    Loading,
    Failed(String),
    Ready(FormSession),
}

/// Result of a "next" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced { to: usize },
    // Valid, but already on the last section
    AtEnd,
    Blocked { errors: usize },
}

/// The fetched schema plus everything the user has done with it.
#[derive(Debug)]
pub struct FormSession {
    schema: FormSchema,
    index: usize,
    store: FormStore,
}

impl FormSession {
    fn new(schema: FormSchema) -> Self {
        Self {
            schema,
            index: 0,
            store: FormStore::default(),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn section_count(&self) -> usize {
        self.schema.sections.len()
    }

    pub fn current_section(&self) -> &FormSectionSchema {
        &self.schema.sections[self.index]
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.section_count()
    }

    pub fn store(&self) -> &FormStore {
        &self.store
    }

    /// Validate the visible section and publish its errors.
    fn check_current(&mut self) -> bool {
        let report = validate_section(&self.current_section().fields, self.store.values());
        if !report.is_valid {
            debug!(
                section = self.index,
                errors = report.errors.len(),
                "section validation failed"
            );
        }
        self.store.replace_errors(report.errors);
        report.is_valid
    }
}

/// Owns the schema, navigation, values and errors for one identity.
#[derive(Debug)]
pub struct FormEngine {
    user: User,
    fetch_issued: bool,
    phase: Phase,
}

impl FormEngine {
    pub fn new(user: User) -> Self {
        Self {
            user,
            fetch_issued: false,
            phase: Phase::Loading,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn session(&self) -> Option<&FormSession> {
        match &self.phase {
            Phase::Ready(s) => Some(s),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut FormSession> {
        match &mut self.phase {
            Phase::Ready(s) => Some(s),
            _ => None,
        }
    }

    /// Claim the one schema request allowed for this identity.
    /// Returns `false` if it was already claimed.
    pub fn begin_fetch(&mut self) -> bool {
        if self.fetch_issued {
            debug!(roll_number = %self.user.roll_number, "schema fetch already issued");
            return false;
        }
        self.fetch_issued = true;
        info!(roll_number = %self.user.roll_number, "fetching form schema");
        true
    }

    /// Leave `Loading`. Outcomes arriving in any other phase are dropped
    /// and `false` is returned.
    pub fn schema_loaded(&mut self, outcome: Result<FormSchema, String>) -> bool {
        if !matches!(self.phase, Phase::Loading) {
            warn!("schema result ignored outside loading phase");
            return false;
        }
        let checked = outcome.and_then(|schema| validate_schema(&schema).map(|_| schema));
        self.phase = match checked {
            Ok(schema) => {
                info!(
                    title = %schema.form_title,
                    sections = schema.sections.len(),
                    "form schema ready"
                );
                Phase::Ready(FormSession::new(schema))
            }
            Err(e) => {
                warn!(error = %e, "form schema unavailable");
                Phase::Failed(SCHEMA_UNAVAILABLE_MSG.to_string())
            }
        };
        true
    }

    /// Record a value and optimistically drop that field's error.
    pub fn change_field(&mut self, field_id: &str, value: FieldValue) {
        if let Some(s) = self.session_mut() {
            s.store.set(field_id, value);
            let cleared = s.store.clear_error(field_id);
            tracing::trace!(field_id, cleared, version = s.store.version(), "field changed");
        }
    }

    pub fn next(&mut self) -> StepOutcome {
        let Some(s) = self.session_mut() else {
            return StepOutcome::Blocked { errors: 0 };
        };
        if !s.check_current() {
            return StepOutcome::Blocked {
                errors: s.store.errors().len(),
            };
        }
        if s.is_last() {
            return StepOutcome::AtEnd;
        }
        s.index += 1;
        debug!(section = s.index, "advanced");
        StepOutcome::Advanced { to: s.index }
    }

    pub fn prev(&mut self) -> bool {
        match self.session_mut() {
            Some(s) if !s.is_first() => {
                s.index -= 1;
                debug!(section = s.index, "went back");
                true
            }
            _ => false,
        }
    }

    /// Validate the visible section; when it passes, hand out the full value map.
    pub fn submit(&mut self) -> Option<FormValues> {
        let s = self.session_mut()?;
        if !s.check_current() {
            return None;
        }
        info!(fields = s.store.values().len(), "form submitted");
        Some(s.store.values().clone())
    }
}
