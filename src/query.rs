//! Query filters for record scans

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Predicates for [`RecordStore::query_filtered`](crate::RecordStore::query_filtered).
///
/// All supplied predicates must hold. Salary bounds are inclusive and
/// department matching is exact (case-sensitive, whole string).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub department: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn min_salary(mut self, min: f64) -> Self {
        self.min_salary = Some(min);
        self
    }

    pub fn max_salary(mut self, max: f64) -> Self {
        self.max_salary = Some(max);
        self
    }

    /// Department predicate, with an empty string counting as absent
    pub fn department_predicate(&self) -> Option<&str> {
        self.department.as_deref().filter(|d| !d.is_empty())
    }

    /// Salary bounds must be finite numbers
    pub fn validate(&self) -> Result<()> {
        for (label, bound) in [("minimum", self.min_salary), ("maximum", self.max_salary)] {
            if let Some(b) = bound {
                if !b.is_finite() {
                    return Err(Error::Validation(format!("{} salary must be a finite number, got {}", label, b)));
                }
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.department_predicate().is_none() && self.min_salary.is_none() && self.max_salary.is_none()
    }
}

impl std::fmt::Display for RecordFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "(none)");
        }
        let mut parts = Vec::new();
        if let Some(d) = self.department_predicate() {
            parts.push(format!("department = {:?}", d));
        }
        if let Some(min) = self.min_salary {
            parts.push(format!("salary >= {}", min));
        }
        if let Some(max) = self.max_salary {
            parts.push(format!("salary <= {}", max));
        }
        write!(f, "{}", parts.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_department_is_absent() {
        let filter = RecordFilter::new().department("");
        assert!(filter.is_empty());
        assert_eq!(filter.department_predicate(), None);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(RecordFilter::new().min_salary(0.0).max_salary(80000.0).validate().is_ok());
        assert!(matches!(
            RecordFilter::new().min_salary(f64::NAN).validate(),
            Err(Error::Validation(_))
        ));
        assert!(RecordFilter::new().max_salary(f64::NEG_INFINITY).validate().is_err());
    }

    #[test]
    fn test_display() {
        let filter = RecordFilter::new().department("Eng").min_salary(50000.0);
        assert_eq!(filter.to_string(), "department = \"Eng\" AND salary >= 50000");
        assert_eq!(RecordFilter::new().to_string(), "(none)");
    }
}
