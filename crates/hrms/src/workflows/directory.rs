use serde::{Deserialize, Serialize};

use super::repository::RepositoryError;

/// Identifier wrapper for employees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier wrapper for shift definitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftId(pub String);

/// Employee record as seen by the leave, attendance and tour workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_email: Option<String>,
    pub employee_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports_to: Option<EmployeeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<ShiftId>,
}

impl Employee {
    pub fn is_admin_department(&self) -> bool {
        self.department
            .as_deref()
            .map(|department| department.trim().eq_ignore_ascii_case("admin"))
            .unwrap_or(false)
    }

    /// Mailbox used for workflow mail, preferring the official address.
    pub fn mailbox(&self) -> &str {
        self.official_email.as_deref().unwrap_or(&self.email)
    }
}

/// Lookup seam for employee data owned by the identity system.
pub trait EmployeeDirectory: Send + Sync {
    fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, RepositoryError>;
    fn reports_of(&self, manager: &EmployeeId) -> Result<Vec<Employee>, RepositoryError>;
    fn by_code(&self, employee_code: &str) -> Result<Option<Employee>, RepositoryError>;
    fn all(&self) -> Result<Vec<Employee>, RepositoryError>;
}
