use tracing::{debug, error, warn};
use uuid::Uuid;

use super::{Draft, EditOutcome, RecordApi, RecordEditor, ValidationReport};
use crate::employees::Employee;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Rejected(ValidationReport),
    /// Stored; the draft was cleared and the list re-fetched.
    Created,
    /// The service call failed and was logged; the draft is untouched.
    Failed,
}

/// The create form plus the record list rendered under it.
///
/// Every successful mutation re-fetches the whole list.
pub struct FormController<A> {
    api: A,
    records: Vec<Employee>,
    errors: ValidationReport,
    editor: Option<RecordEditor>,
}

impl<A: RecordApi> FormController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            records: Vec::new(),
            errors: ValidationReport::default(),
            editor: None,
        }
    }

    /// Builds the controller and fetches the initial list.
    pub async fn open(api: A) -> Self {
        let mut form = Self::new(api);
        form.refresh().await;
        form
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn records(&self) -> &[Employee] {
        &self.records
    }

    /// Errors from the last rejected submit.
    pub fn errors(&self) -> &ValidationReport {
        &self.errors
    }

    pub fn editor(&self) -> Option<&RecordEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut RecordEditor> {
        self.editor.as_mut()
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    /// Replaces the list with a fresh read. On failure the old list stays.
    pub async fn refresh(&mut self) {
        match self.api.list().await {
            Ok(records) => {
                debug!(count = records.len(), "employee list refreshed");
                self.records = records;
            }
            Err(e) => error!(error = %e, "failed to fetch employees"),
        }
    }

    pub async fn submit(&mut self, draft: &mut Draft) -> SubmitOutcome {
        let report = draft.validate();
        if !report.is_valid() {
            debug!(invalid = %report, "submit rejected");
            self.errors = report.clone();
            return SubmitOutcome::Rejected(report);
        }

        match self.api.create(draft).await {
            Ok(()) => {
                draft.clear();
                self.errors = ValidationReport::default();
                self.refresh().await;
                SubmitOutcome::Created
            }
            Err(e) => {
                error!(error = %e, "failed to submit employee");
                SubmitOutcome::Failed
            }
        }
    }

    /// Returns whether the record is gone.
    pub async fn delete(&mut self, id: Uuid) -> bool {
        match self.api.delete(id).await {
            Ok(()) => {
                self.refresh().await;
                true
            }
            Err(e) => {
                error!(error = %e, %id, "failed to delete employee");
                false
            }
        }
    }

    /// Opens the edit view for `id`. Returns false, with the form unchanged,
    /// if the record could not be loaded.
    pub async fn edit(&mut self, id: Uuid) -> bool {
        match RecordEditor::load(&self.api, id).await {
            Ok(editor) => {
                self.editor = Some(editor);
                true
            }
            Err(e) => {
                error!(error = %e, %id, "failed to load employee for editing");
                false
            }
        }
    }

    /// Submits the open editor and closes it on success.
    pub async fn submit_edit(&mut self) -> EditOutcome {
        let Some(editor) = self.editor.as_ref() else {
            warn!("submit_edit without an open editor");
            return EditOutcome::Failed;
        };
        let outcome = editor.submit(&self.api).await;
        if outcome == EditOutcome::Saved {
            self.close_editor().await;
        }
        outcome
    }

    /// Discards the editor's draft without contacting the service, then closes.
    pub async fn cancel_edit(&mut self) {
        if let Some(editor) = self.editor.take() {
            editor.cancel();
        }
        self.close_editor().await;
    }

    /// Leaves the edit view and re-fetches the list.
    pub async fn close_editor(&mut self) {
        self.editor = None;
        self.refresh().await;
    }
}
