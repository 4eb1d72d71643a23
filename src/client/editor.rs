use tracing::{debug, error};
use uuid::Uuid;

use super::{Attachment, ClientError, Draft, RecordApi};
use crate::employees::{dto::calendar_date, Employee};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The update went through; the edit view should close.
    Saved,
    /// The update failed and was logged; the edit view stays open.
    Failed,
}

/// Edits one existing record. Unlike the create form nothing is validated
/// before sending.
#[derive(Debug, Clone)]
pub struct RecordEditor {
    id: Uuid,
    draft: Draft,
    current_image: String,
}

impl RecordEditor {
    /// Fetches the record and seeds a draft from it.
    pub async fn load<A: RecordApi + ?Sized>(api: &A, id: Uuid) -> Result<Self, ClientError> {
        let record = api.get(id).await?;
        Ok(Self::from_record(&record))
    }

    pub fn from_record(record: &Employee) -> Self {
        Self {
            id: record.id,
            draft: Draft {
                name: record.name.clone(),
                email: record.email.clone(),
                phone: record.phone.clone(),
                employee_id: record.employee_id.clone(),
                designation: record.designation.clone(),
                joining_date: calendar_date(record.joining_date),
                image: None,
            },
            current_image: record.image.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Reference of the photo stored before this edit.
    pub fn current_image(&self) -> &str {
        &self.current_image
    }

    pub fn update_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), ClientError> {
        self.draft.update_field(name, value)
    }

    pub fn update_image(&mut self, file: Attachment) {
        self.draft.update_image(file);
    }

    /// Sends the whole draft. Without a new photo the stored one is kept.
    pub async fn submit<A: RecordApi + ?Sized>(&self, api: &A) -> EditOutcome {
        match api.update(self.id, &self.draft).await {
            Ok(()) => {
                debug!(id = %self.id, "employee updated");
                EditOutcome::Saved
            }
            Err(e) => {
                error!(error = %e, id = %self.id, "error updating employee");
                EditOutcome::Failed
            }
        }
    }

    /// Drops the draft without contacting the service.
    pub fn cancel(self) {
        debug!(id = %self.id, "edit cancelled");
    }
}
