use crate::config::AppConfig;
use crate::employees::{memory::MemoryRecordStore, repo::PgRecordStore, RecordService, RecordStore};
use crate::storage::{LocalStorage, S3Storage, StorageClient};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub records: RecordService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn RecordStore> = match &config.database_url {
            Some(url) => {
                info!("using postgres record store");
                Arc::new(PgRecordStore::connect(url, config.database_max_connections).await?)
            }
            None => {
                warn!("DATABASE_URL not set; records are kept in memory only");
                Arc::new(MemoryRecordStore::new())
            }
        };

        let files: Arc<dyn StorageClient> = match &config.s3 {
            Some(s3) => {
                info!(endpoint = %s3.endpoint, bucket = %s3.bucket, "using s3 file store");
                Arc::new(S3Storage::new(s3).await?)
            }
            None => {
                info!(dir = %config.upload_dir.display(), "using local file store");
                Arc::new(LocalStorage::new(&config.upload_dir).await?)
            }
        };

        let records =
            RecordService::new(store, files).with_orphan_cleanup(config.cleanup_orphaned_uploads);
        Ok(Self::from_parts(Arc::new(config), records))
    }

    pub fn from_parts(config: Arc<AppConfig>, records: RecordService) -> Self {
        Self { config, records }
    }
}

#[cfg(test)]
pub(crate) use fake::FakeStorage;
