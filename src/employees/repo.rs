use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{dto::EmployeeFields, repo_types::Employee};

/// Document store holding employee records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Writes a new record and returns it with its assigned id.
    async fn insert(&self, fields: &EmployeeFields, image: &str) -> anyhow::Result<Employee>;

    async fn list(&self) -> anyhow::Result<Vec<Employee>>;

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Employee>>;

    /// Replaces every field of `id`; `image: None` keeps the stored reference.
    /// Returns `None` if no such record exists.
    async fn update(
        &self,
        id: Uuid,
        fields: &EmployeeFields,
        image: Option<&str>,
    ) -> anyhow::Result<Option<Employee>>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const COLUMNS: &str = "id, name, email, phone, employee_id, designation, joining_date, image";

#[derive(Debug, Clone)]
pub struct PgRecordStore {
    db: PgPool,
}

impl PgRecordStore {
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self { db })
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, f: &EmployeeFields, image: &str) -> anyhow::Result<Employee> {
        let row = sqlx::query_as::<_, Employee>(&format!(
            r#"
            INSERT INTO employees (id, name, email, phone, employee_id, designation, joining_date, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&f.name)
        .bind(&f.email)
        .bind(&f.phone)
        .bind(&f.employee_id)
        .bind(&f.designation)
        .bind(f.joining_date)
        .bind(image)
        .fetch_one(&self.db)
        .await
        .context("insert employee")?;
        Ok(row)
    }

    async fn list(&self) -> anyhow::Result<Vec<Employee>> {
        let rows = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {COLUMNS} FROM employees ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list employees")?;
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Employee>> {
        let row = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find employee")?;
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        f: &EmployeeFields,
        image: Option<&str>,
    ) -> anyhow::Result<Option<Employee>> {
        let row = sqlx::query_as::<_, Employee>(&format!(
            r#"
            UPDATE employees
               SET name = $2, email = $3, phone = $4, employee_id = $5,
                   designation = $6, joining_date = $7, image = COALESCE($8, image)
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&f.name)
        .bind(&f.email)
        .bind(&f.phone)
        .bind(&f.employee_id)
        .bind(&f.designation)
        .bind(f.joining_date)
        .bind(image) // NULL keeps the current image
        .fetch_optional(&self.db)
        .await
        .context("update employee")?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete employee")?;
        Ok(done.rows_affected() > 0)
    }
}
