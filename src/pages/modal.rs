//! Modal form state machine
//!
//! ```text
//! Closed --open--> Open --begin_submit--> Submitting
//!   ^               ^                         |
//!   |               +------ finish(Err) ------+
//!   +----------------------- finish(Ok) ------+
//! ```
//!
//! Client-side validation failures never leave `Open`. A failed submission
//! returns to `Open` with an inline error, server field errors mapped onto
//! the form, and the entered values untouched. A 401 closes the modal
//! without an inline error.

use crate::api::ApiError;
use crate::pages::form::{FieldErrors, Form};
use crate::pages::widgets::Button;

/// Whether the modal creates a record or edits record `id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone)]
pub struct ModalForm<F: Form> {
    phase: ModalPhase,
    mode: ModalMode,
    values: F,
    field_errors: FieldErrors,
    error: Option<String>,
}

impl<F: Form> Default for ModalForm<F> {
    fn default() -> Self {
        Self {
            phase: ModalPhase::Closed,
            mode: ModalMode::Create,
            values: F::default(),
            field_errors: FieldErrors::new(),
            error: None,
        }
    }
}

impl<F: Form> ModalForm<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens with blank fields
    pub fn open_create(&mut self) {
        self.open(ModalMode::Create, F::default());
    }

    /// Opens pre-populated from the record being edited
    pub fn open_edit(&mut self, id: i64, values: F) {
        self.open(ModalMode::Edit(id), values);
    }

    /// Opens in `mode` with `values`
    pub fn open(&mut self, mode: ModalMode, values: F) {
        self.phase = ModalPhase::Open;
        self.mode = mode;
        self.values = values;
        self.field_errors.clear();
        self.error = None;
    }

    /// Closes and discards the entered values
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn mode(&self) -> ModalMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.phase != ModalPhase::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == ModalPhase::Submitting
    }

    pub fn values(&self) -> &F {
        &self.values
    }

    /// Editable values; None unless the modal is open and idle
    pub fn values_mut(&mut self) -> Option<&mut F> {
        match self.phase {
            ModalPhase::Open => Some(&mut self.values),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    /// Inline error of the last failed submission
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validates the values and, if they pass, enters `Submitting`
    ///
    /// # Returns
    ///
    /// * `Some((mode, output))` - Ready to send; the caller must call `finish`
    /// * `None` - Not open, already submitting, or invalid (field errors set)
    pub fn begin_submit(&mut self) -> Option<(ModalMode, F::Output)> {
        if self.phase != ModalPhase::Open {
            return None;
        }

        match self.values.validate() {
            Ok(output) => {
                self.field_errors.clear();
                self.error = None;
                self.phase = ModalPhase::Submitting;
                Some((self.mode, output))
            }
            Err(errors) => {
                tracing::debug!("Form rejected: {:?}", errors.keys().collect::<Vec<_>>());
                self.field_errors = errors;
                None
            }
        }
    }

    /// Settles a submission
    ///
    /// # Arguments
    ///
    /// * `result` - Outcome of the request
    /// * `failure` - Inline message for failures without a server message
    pub fn finish<T>(&mut self, result: &Result<T, ApiError>, failure: &str) {
        if self.phase != ModalPhase::Submitting {
            return;
        }

        match result {
            Ok(_) => self.close(),
            // The session teardown has already moved the app to Login
            Err(e) if e.is_fatal() => self.close(),
            Err(e) => {
                self.phase = ModalPhase::Open;
                self.field_errors = e.field_errors();
                let server_message = e
                    .body()
                    .map(|b| b.message.clone())
                    .filter(|m| !m.is_empty() && matches!(e, ApiError::Validation(_)));
                self.error = Some(server_message.unwrap_or_else(|| failure.to_string()));
            }
        }
    }
}

impl<F: Form> ModalForm<F> {
    /// Renders the dialog, or nothing while closed
    ///
    /// # Arguments
    ///
    /// * `title` - Dialog title
    /// * `fields` - `(label, field name, value)` rows in display order
    /// * `submit` - Submit button label
    pub fn render(&self, title: &str, fields: &[(&str, &str, String)], submit: &str) -> String {
        if !self.is_open() {
            return String::new();
        }

        let mut out = format!("\n-- {} --\n", title);
        for (label, name, value) in fields {
            out.push_str(&format!("  {}: {}\n", label, value));
            if let Some(message) = self.field_error(name) {
                out.push_str(&format!("    ! {}\n", message));
            }
        }
        if let Some(error) = self.error() {
            out.push_str(&format!("  !! {}\n", error));
        }
        let button = Button::new(submit).loading(self.is_submitting());
        let cancel = Button::new("キャンセル").disabled(self.is_submitting());
        out.push_str(&format!("  {} {}\n", button.render(), cancel.render()));
        out
    }
}
