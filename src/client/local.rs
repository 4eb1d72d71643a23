use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use super::{ClientError, Draft, RecordApi};
use crate::employees::{
    dto::{EmployeeFields, Upload},
    Employee, RecordService,
};
use crate::error::ServiceError;

impl From<ServiceError> for ClientError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(id) => ClientError::NotFound(id),
            other => ClientError::Service {
                status: 500,
                message: other.to_string(),
            },
        }
    }
}

fn fields(draft: &Draft) -> Result<EmployeeFields, ServiceError> {
    let parts: HashMap<String, String> = draft
        .text_fields()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EmployeeFields::from_parts(parts)
}

fn upload(draft: &Draft) -> Option<Upload> {
    draft.image.as_ref().map(|a| Upload {
        file_name: a.file_name.clone(),
        content_type: a.content_type.clone(),
        body: a.body.clone(),
    })
}

/// Drives the service in-process, the same way the HTTP handlers do.
#[async_trait]
impl RecordApi for RecordService {
    async fn create(&self, draft: &Draft) -> Result<(), ClientError> {
        let photo = upload(draft).ok_or_else(|| ServiceError::invalid("image is required"))?;
        RecordService::create(self, fields(draft)?, photo).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Employee>, ClientError> {
        Ok(RecordService::list(self).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Employee, ClientError> {
        Ok(RecordService::get(self, id).await?)
    }

    async fn update(&self, id: Uuid, draft: &Draft) -> Result<(), ClientError> {
        RecordService::update(self, id, fields(draft)?, upload(draft)).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        Ok(RecordService::delete(self, id).await?)
    }
}
