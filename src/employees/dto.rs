use std::collections::HashMap;

use bytes::Bytes;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    UtcOffset,
};

use crate::error::{ServiceError, ServiceResult};

/// Multipart part names of the text fields, in form order.
pub const TEXT_FIELDS: [&str; 6] = [
    "name",
    "email",
    "phone",
    "employeeId",
    "designation",
    "joiningDate",
];

/// Everything on a record except its id and image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub employee_id: String,
    pub designation: String,
    pub joining_date: OffsetDateTime,
}

impl EmployeeFields {
    /// Builds fields from multipart text parts keyed by wire name.
    pub fn from_parts(mut parts: HashMap<String, String>) -> ServiceResult<Self> {
        let mut take = |key: &str| {
            parts
                .remove(key)
                .ok_or_else(|| ServiceError::invalid(format!("{key} is required")))
        };
        let name = take("name")?;
        let email = take("email")?;
        let phone = take("phone")?;
        let employee_id = take("employeeId")?;
        let designation = take("designation")?;
        let joining_date = parse_joining_date(&take("joiningDate")?)?;

        Ok(Self {
            name,
            email,
            phone,
            employee_id,
            designation,
            joining_date,
        })
    }
}

/// An uploaded photo as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Accepts `YYYY-MM-DD` (taken as midnight UTC) or a full RFC 3339 timestamp.
/// The UTC result must fall in years 0000 through 9999, the range a record's
/// `joiningDate` can be written back out in.
pub fn parse_joining_date(raw: &str) -> ServiceResult<OffsetDateTime> {
    let raw = raw.trim();
    let invalid = || ServiceError::invalid(format!("invalid joiningDate {raw:?}"));

    let utc = match Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        Ok(date) => date.midnight().assume_utc(),
        Err(_) => OffsetDateTime::parse(raw, &Rfc3339)
            .ok()
            .and_then(|dt| dt.checked_to_offset(UtcOffset::UTC))
            .ok_or_else(invalid)?,
    };
    if !(0..=9999).contains(&utc.year()) {
        return Err(invalid());
    }
    Ok(utc)
}

/// The UTC calendar date of `dt` as `YYYY-MM-DD`.
pub fn calendar_date(dt: OffsetDateTime) -> String {
    dt.to_offset(UtcOffset::UTC).date().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn parts(skip: Option<&str>) -> HashMap<String, String> {
        [
            ("name", "Ada"),
            ("email", "ada@example.com"),
            ("phone", "1234567890"),
            ("employeeId", "E-7"),
            ("designation", "Engineer"),
            ("joiningDate", "2024-02-29"),
        ]
        .into_iter()
        .filter(|(k, _)| Some(*k) != skip)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn parses_plain_date_and_rfc3339() {
        assert_eq!(
            parse_joining_date("2024-02-29").unwrap(),
            datetime!(2024-02-29 0:00 UTC)
        );
        assert_eq!(
            parse_joining_date("2024-02-29T22:30:00-05:00").unwrap(),
            datetime!(2024-03-01 3:30 UTC)
        );
        assert!(parse_joining_date("29/02/2024").is_err());
        assert!(parse_joining_date("").is_err());
    }

    #[test]
    fn rejects_dates_outside_four_digit_years() {
        for raw in [
            "9999-12-31T23:00:00-05:00",
            "-0001-01-01",
            "+10000-01-01",
            "0000-01-01T00:30:00+01:00",
        ] {
            let err = parse_joining_date(raw).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "{raw}: {err}");
        }
        assert_eq!(
            parse_joining_date("9999-12-31T23:00:00Z").unwrap(),
            datetime!(9999-12-31 23:00 UTC)
        );
        assert_eq!(
            parse_joining_date("0000-01-01").unwrap(),
            datetime!(0000-01-01 0:00 UTC)
        );
    }

    #[test]
    fn calendar_date_is_utc_day() {
        assert_eq!(calendar_date(datetime!(2024-01-05 0:00 UTC)), "2024-01-05");
        assert_eq!(calendar_date(datetime!(2024-01-05 23:00 -02:00)), "2024-01-06");
    }

    #[test]
    fn from_parts_reads_every_field() {
        let fields = EmployeeFields::from_parts(parts(None)).unwrap();
        assert_eq!(fields.employee_id, "E-7");
        assert_eq!(fields.joining_date, datetime!(2024-02-29 0:00 UTC));
    }

    #[test]
    fn from_parts_requires_each_field() {
        for key in TEXT_FIELDS {
            let err = EmployeeFields::from_parts(parts(Some(key))).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }
}
