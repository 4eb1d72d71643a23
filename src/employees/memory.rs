use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{dto::EmployeeFields, repo::RecordStore, repo_types::Employee};

/// Process-local record store, used when no database is configured.
/// Lists in insertion order.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Vec<Employee>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply(row: &mut Employee, f: &EmployeeFields) {
    row.name.clone_from(&f.name);
    row.email.clone_from(&f.email);
    row.phone.clone_from(&f.phone);
    row.employee_id.clone_from(&f.employee_id);
    row.designation.clone_from(&f.designation);
    row.joining_date = f.joining_date;
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, f: &EmployeeFields, image: &str) -> anyhow::Result<Employee> {
        let row = Employee {
            id: Uuid::new_v4(),
            name: f.name.clone(),
            email: f.email.clone(),
            phone: f.phone.clone(),
            employee_id: f.employee_id.clone(),
            designation: f.designation.clone(),
            joining_date: f.joining_date,
            image: image.to_string(),
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn list(&self) -> anyhow::Result<Vec<Employee>> {
        Ok(self.rows.read().await.clone())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Employee>> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        f: &EmployeeFields,
        image: Option<&str>,
    ) -> anyhow::Result<Option<Employee>> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        apply(row, f);
        if let Some(image) = image {
            row.image = image.to_string();
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }
}
