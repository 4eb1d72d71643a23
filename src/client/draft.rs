use std::{collections::BTreeMap, fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;

use super::{Attachment, ClientError};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"\S+@\S+\.\S+").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Phone,
    EmployeeId,
    Designation,
    JoiningDate,
    Image,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::EmployeeId => "employeeId",
            Field::Designation => "designation",
            Field::JoiningDate => "joiningDate",
            Field::Image => "image",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "name" => Field::Name,
            "email" => Field::Email,
            "phone" => Field::Phone,
            "employeeId" => Field::EmployeeId,
            "designation" => Field::Designation,
            "joiningDate" => Field::JoiningDate,
            "image" => Field::Image,
            other => return Err(ClientError::UnknownField(other.to_string())),
        })
    }
}

/// Unsaved form input. `joining_date` holds whatever the date input produced,
/// normally `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub employee_id: String,
    pub designation: String,
    pub joining_date: String,
    pub image: Option<Attachment>,
}

impl Draft {
    /// Sets one text field by its form name. No validation happens here.
    pub fn update_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), ClientError> {
        let slot = match name.parse::<Field>()? {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::EmployeeId => &mut self.employee_id,
            Field::Designation => &mut self.designation,
            Field::JoiningDate => &mut self.joining_date,
            Field::Image => return Err(ClientError::ImageNotText),
        };
        *slot = value.into();
        Ok(())
    }

    pub fn update_image(&mut self, file: Attachment) {
        self.image = Some(file);
    }

    pub fn clear(&mut self) {
        *self = Draft::default();
    }

    /// Text fields paired with their form names, in form order.
    pub fn text_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("employeeId", self.employee_id.as_str()),
            ("designation", self.designation.as_str()),
            ("joiningDate", self.joining_date.as_str()),
        ]
    }

    /// Checks required fields and the email and phone formats of a new record.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.name.is_empty() {
            report.add(Field::Name, "Name is required");
        }
        if self.email.is_empty() {
            report.add(Field::Email, "Email is required");
        } else if !EMAIL_RE.is_match(&self.email) {
            report.add(Field::Email, "Email address is invalid");
        }
        if self.phone.is_empty() {
            report.add(Field::Phone, "Phone number is required");
        } else if !PHONE_RE.is_match(&self.phone) {
            report.add(Field::Phone, "Phone number must be 10 digits");
        }
        if self.employee_id.is_empty() {
            report.add(Field::EmployeeId, "Employee ID is required");
        }
        if self.designation.is_empty() {
            report.add(Field::Designation, "Designation is required");
        }
        if self.joining_date.is_empty() {
            report.add(Field::JoiningDate, "Joining Date is required");
        }
        if self.image.is_none() {
            report.add(Field::Image, "Image is required");
        }

        report
    }
}

/// Per-field error messages. A field without an entry is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<Field, String>,
}

impl ValidationReport {
    fn add(&mut self, field: Field, message: &str) {
        self.errors.insert(field, message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}
