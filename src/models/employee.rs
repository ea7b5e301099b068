//! Employee model.
//!
//! Employees are owned by the time-fact store; the engine only reads the
//! fields it needs to price a period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents an employee whose pay is calculated each period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name shown on payroll summaries.
    pub name: String,
    /// The gross monthly salary the prorating rules are applied to.
    pub monthly_salary: Decimal,
}

impl Employee {
    /// Creates a new employee.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee::new("emp_001", "alice", Decimal::new(2_200_000, 0));
    /// assert_eq!(employee.id, "emp_001");
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>, monthly_salary: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            monthly_salary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_employee() {
        let json = r#"{
            "id": "emp_001",
            "name": "alice",
            "monthly_salary": "2200000"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, "emp_001");
        assert_eq!(employee.name, "alice");
        assert_eq!(employee.monthly_salary, Decimal::from_str("2200000").unwrap());
    }

    #[test]
    fn test_salary_serializes_as_string() {
        let employee = Employee::new("emp_002", "bob", Decimal::new(350_050, 2));
        let json = serde_json::to_string(&employee).unwrap();
        assert!(json.contains("\"monthly_salary\":\"3500.50\""));
    }
}
