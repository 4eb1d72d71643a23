use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A stored employee record, as returned by the list and get endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub employee_id: String,
    pub designation: String,
    #[serde(with = "time::serde::rfc3339")]
    pub joining_date: OffsetDateTime,
    /// Path or URL of the stored photo.
    pub image: String,
}
