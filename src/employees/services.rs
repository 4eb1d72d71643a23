use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{EmployeeFields, Upload},
    repo::RecordStore,
    repo_types::Employee,
};
use crate::error::{ServiceError, ServiceResult};
use crate::images::services::{store_upload, StoredFile};
use crate::storage::StorageClient;

/// Create/read/update/delete over employee records and their photos.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    files: Arc<dyn StorageClient>,
    cleanup_orphans: bool,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, files: Arc<dyn StorageClient>) -> Self {
        Self {
            store,
            files,
            cleanup_orphans: false,
        }
    }

    /// Delete the stored photo again when the record write after it fails.
    pub fn with_orphan_cleanup(mut self, enabled: bool) -> Self {
        self.cleanup_orphans = enabled;
        self
    }

    /// Stores the photo, then the record pointing at it.
    #[instrument(skip_all, fields(employee_id = %fields.employee_id))]
    pub async fn create(&self, fields: EmployeeFields, photo: Upload) -> ServiceResult<Uuid> {
        let stored = self.store_photo(photo).await?;
        match self.store.insert(&fields, &stored.reference).await {
            Ok(employee) => {
                info!(id = %employee.id, image = %employee.image, "employee created");
                Ok(employee.id)
            }
            Err(e) => {
                self.orphaned(&stored).await;
                Err(ServiceError::Persistence(e))
            }
        }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Employee>> {
        self.store.list().await.map_err(ServiceError::Persistence)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Employee> {
        self.store
            .find(id)
            .await
            .map_err(ServiceError::Persistence)?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Full-field replace. Without a new photo the current image reference is kept.
    #[instrument(skip(self, fields, photo), fields(has_photo = photo.is_some()))]
    pub async fn update(
        &self,
        id: Uuid,
        fields: EmployeeFields,
        photo: Option<Upload>,
    ) -> ServiceResult<Employee> {
        // checked first so an unknown id never leaves a stored file behind
        self.get(id).await?;

        let stored = match photo {
            Some(photo) => Some(self.store_photo(photo).await?),
            None => None,
        };
        let image = stored.as_ref().map(|s| s.reference.as_str());

        match self.store.update(id, &fields, image).await {
            Ok(Some(employee)) => {
                info!(%id, image = %employee.image, "employee updated");
                Ok(employee)
            }
            Ok(None) => {
                if let Some(stored) = &stored {
                    self.orphaned(stored).await;
                }
                Err(ServiceError::NotFound(id))
            }
            Err(e) => {
                if let Some(stored) = &stored {
                    self.orphaned(stored).await;
                }
                Err(ServiceError::Persistence(e))
            }
        }
    }

    /// Removes the record. Unknown ids are a no-op and the photo stays in the file store.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let removed = self
            .store
            .delete(id)
            .await
            .map_err(ServiceError::Persistence)?;
        if removed {
            info!(%id, "employee deleted");
        } else {
            info!(%id, "delete of unknown employee ignored");
        }
        Ok(())
    }

    async fn store_photo(&self, photo: Upload) -> ServiceResult<StoredFile> {
        store_upload(self.files.as_ref(), photo)
            .await
            .map_err(ServiceError::Storage)
    }

    async fn orphaned(&self, stored: &StoredFile) {
        if !self.cleanup_orphans {
            warn!(key = %stored.key, "record write failed; stored photo left orphaned");
            return;
        }
        match self.files.delete_object(&stored.key).await {
            Ok(()) => info!(key = %stored.key, "removed photo of failed record write"),
            Err(e) => warn!(error = %e, key = %stored.key, "could not remove orphaned photo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employees::memory::MemoryRecordStore;
    use crate::state::FakeStorage;
    use async_trait::async_trait;
    use bytes::Bytes;
    use time::macros::datetime;

    fn fields(name: &str) -> EmployeeFields {
        EmployeeFields {
            name: name.into(),
            email: "ada@example.com".into(),
            phone: "1234567890".into(),
            employee_id: "E-1".into(),
            designation: "Engineer".into(),
            joining_date: datetime!(2024-05-20 0:00 UTC),
        }
    }

    fn photo(name: &str) -> Upload {
        Upload {
            file_name: name.into(),
            content_type: "image/png".into(),
            body: Bytes::from_static(b"\x89PNG\r\n"),
        }
    }

    fn service() -> (RecordService, Arc<FakeStorage>) {
        let files = Arc::new(FakeStorage::default());
        let svc = RecordService::new(Arc::new(MemoryRecordStore::new()), files.clone());
        (svc, files)
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn insert(&self, _: &EmployeeFields, _: &str) -> anyhow::Result<Employee> {
            anyhow::bail!("connection reset")
        }
        async fn list(&self) -> anyhow::Result<Vec<Employee>> {
            anyhow::bail!("connection reset")
        }
        async fn find(&self, _: Uuid) -> anyhow::Result<Option<Employee>> {
            anyhow::bail!("connection reset")
        }
        async fn update(
            &self,
            _: Uuid,
            _: &EmployeeFields,
            _: Option<&str>,
        ) -> anyhow::Result<Option<Employee>> {
            anyhow::bail!("connection reset")
        }
        async fn delete(&self, _: Uuid) -> anyhow::Result<bool> {
            anyhow::bail!("connection reset")
        }
    }

    /// Memory store that finds records but cannot update them.
    #[derive(Default)]
    struct FrozenStore(MemoryRecordStore);

    #[async_trait]
    impl RecordStore for FrozenStore {
        async fn insert(&self, f: &EmployeeFields, image: &str) -> anyhow::Result<Employee> {
            self.0.insert(f, image).await
        }
        async fn list(&self) -> anyhow::Result<Vec<Employee>> {
            self.0.list().await
        }
        async fn find(&self, id: Uuid) -> anyhow::Result<Option<Employee>> {
            self.0.find(id).await
        }
        async fn update(
            &self,
            _: Uuid,
            _: &EmployeeFields,
            _: Option<&str>,
        ) -> anyhow::Result<Option<Employee>> {
            anyhow::bail!("connection reset")
        }
        async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
            self.0.delete(id).await
        }
    }

    #[tokio::test]
    async fn create_then_list_and_get() {
        let (svc, files) = service();
        let id = svc.create(fields("Ada"), photo("ada.png")).await.unwrap();

        let all = svc.list().await.unwrap();
        assert_eq!(all.len(), 1);
        let rec = &all[0];
        assert_eq!(rec.id, id);
        assert_eq!(rec.name, "Ada");
        assert_eq!(rec.phone, "1234567890");
        assert!(rec.image.starts_with("uploads/") && rec.image.ends_with(".png"));
        assert_eq!(files.len(), 1);

        let one = svc.get(id).await.unwrap();
        assert_eq!(&one, rec);
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let (svc, _) = service();
        let err = svc.get(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_without_photo_keeps_image() {
        let (svc, files) = service();
        let id = svc.create(fields("Ada"), photo("ada.png")).await.unwrap();
        let before = svc.get(id).await.unwrap();

        let after = svc.update(id, fields("Ada L."), None).await.unwrap();
        assert_eq!(after.id, id);
        assert_eq!(after.name, "Ada L.");
        assert_eq!(after.image, before.image);
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn update_with_photo_replaces_image() {
        let (svc, files) = service();
        let id = svc.create(fields("Ada"), photo("ada.png")).await.unwrap();
        let before = svc.get(id).await.unwrap();

        let after = svc.update(id, fields("Ada"), Some(photo("new.jpg"))).await.unwrap();
        assert_ne!(after.image, before.image);
        assert!(after.image.ends_with(".jpg"));
        // the previous photo is not removed
        assert_eq!(files.len(), 2);
    }

    #[tokio::test]
    async fn update_unknown_is_not_found_and_stores_nothing() {
        let (svc, files) = service();
        let err = svc
            .update(Uuid::new_v4(), fields("Ghost"), Some(photo("g.png")))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(files.len(), 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_leaves_photo() {
        let (svc, files) = service();
        let id = svc.create(fields("Ada"), photo("ada.png")).await.unwrap();

        svc.delete(id).await.unwrap();
        assert!(svc.list().await.unwrap().is_empty());
        assert_eq!(files.len(), 1);

        svc.delete(id).await.unwrap();
        svc.delete(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn failed_record_write_leaves_orphan_by_default() {
        let files = Arc::new(FakeStorage::default());
        let svc = RecordService::new(Arc::new(BrokenStore), files.clone());

        let err = svc.create(fields("Ada"), photo("ada.png")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn failed_record_write_removes_photo_when_cleanup_enabled() {
        let files = Arc::new(FakeStorage::default());
        let svc = RecordService::new(Arc::new(BrokenStore), files.clone()).with_orphan_cleanup(true);

        let err = svc.create(fields("Ada"), photo("ada.png")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
        assert_eq!(files.len(), 0);
    }

    #[tokio::test]
    async fn failed_update_leaves_new_photo_by_default() {
        let files = Arc::new(FakeStorage::default());
        let svc = RecordService::new(Arc::new(FrozenStore::default()), files.clone());
        let id = svc.create(fields("Ada"), photo("ada.png")).await.unwrap();

        let err = svc
            .update(id, fields("Ada"), Some(photo("new.jpg")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
        assert_eq!(files.len(), 2);
    }

    #[tokio::test]
    async fn failed_update_removes_new_photo_when_cleanup_enabled() {
        let files = Arc::new(FakeStorage::default());
        let svc = RecordService::new(Arc::new(FrozenStore::default()), files.clone())
            .with_orphan_cleanup(true);
        let id = svc.create(fields("Ada"), photo("ada.png")).await.unwrap();
        let before = svc.get(id).await.unwrap();

        let err = svc
            .update(id, fields("Ada"), Some(photo("new.jpg")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
        assert_eq!(files.len(), 1);
        let key = before.image.trim_start_matches("uploads/");
        assert!(files.contains(key));
        assert_eq!(svc.get(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn file_store_failure_writes_no_record() {
        let files = Arc::new(FakeStorage::failing());
        let svc = RecordService::new(Arc::new(MemoryRecordStore::new()), files);

        let err = svc.create(fields("Ada"), photo("ada.png")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(svc.list().await.unwrap().is_empty());
    }
}
