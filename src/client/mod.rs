//! Client side of the employee form.
//!
//! A [`FormController`] owns the rendered record list and drives create and
//! delete; a [`RecordEditor`] edits one existing record. Both talk to the
//! backend through [`RecordApi`], implemented over HTTP by [`HttpRecordApi`]
//! and in-process by [`RecordService`](crate::employees::RecordService).
//! Service failures are logged and never retried.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::employees::Employee;

mod draft;
mod editor;
mod form;
mod http;
mod local;

pub use draft::{Draft, Field, ValidationReport};
pub use editor::{EditOutcome, RecordEditor};
pub use form::{FormController, SubmitOutcome};
pub use http::HttpRecordApi;

/// A photo picked in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unknown form field {0:?}")]
    UnknownField(String),

    /// The photo is not a text field; set it with `update_image`.
    #[error("the image field takes a file; use update_image")]
    ImageNotText,

    #[error("employee {0} not found")]
    NotFound(Uuid),

    /// The service answered with a failure status.
    #[error("service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The five record operations as seen from the form.
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Sends every draft field plus its image.
    async fn create(&self, draft: &Draft) -> Result<(), ClientError>;

    async fn list(&self) -> Result<Vec<Employee>, ClientError>;

    async fn get(&self, id: Uuid) -> Result<Employee, ClientError>;

    /// Sends every draft field; without an image the stored one is kept.
    async fn update(&self, id: Uuid, draft: &Draft) -> Result<(), ClientError>;

    async fn delete(&self, id: Uuid) -> Result<(), ClientError>;
}
