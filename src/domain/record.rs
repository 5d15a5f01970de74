//! Student record: surname, initials and an owned grade multiset.

use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::grades::{Grade, GradeMultiset};

/// Grade that marks an excellent result.
pub const EXCELLENT: Grade = 5;
/// Grade that marks a satisfactory result.
pub const SATISFACTORY: Grade = 3;
/// Grade that marks a failing result.
pub const FAILING: Grade = 2;

/// Immutable once constructed. Editing a student means replacing the record.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    surname: String,
    initials: String,
    grades: GradeMultiset,
}

impl StudentRecord {
    pub fn new(surname: impl Into<String>, initials: impl Into<String>, grades: GradeMultiset) -> Self {
        Self {
            surname: surname.into(),
            initials: initials.into(),
            grades,
        }
    }

    /// Sole ordering key of the directory.
    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn initials(&self) -> &str {
        &self.initials
    }

    pub fn grades(&self) -> &GradeMultiset {
        &self.grades
    }

    /// Canonical display: `"<surname> <initials>: <g1> ... <gk> "`.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Every grade is a 5.
    pub fn is_excellent(&self) -> bool {
        self.grades.all_equal(EXCELLENT)
    }

    /// At least one grade is a 3.
    pub fn has_threes(&self) -> bool {
        self.grades.any_equal(SATISFACTORY)
    }

    /// Exactly one grade is a 2.
    pub fn has_single_two(&self) -> bool {
        self.grades.count_equal(FAILING) == 1
    }
}

impl fmt::Display for StudentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.surname, self.initials, self.grades)
    }
}

/// Parse a single grade token.
pub fn parse_grade(token: &str) -> Result<Grade, DomainError> {
    token.parse().map_err(|_| DomainError::InvalidGrade {
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(surname: &str, grades: &[Grade]) -> StudentRecord {
        StudentRecord::new(surname, "JD", grades.iter().copied().collect())
    }

    #[test]
    fn given_record_when_rendering_then_grades_sorted_with_trailing_space() {
        let r = StudentRecord::new("Jones", "AB", [3, 2, 5, 2, 4].into_iter().collect());
        assert_eq!(r.render(), "Jones AB: 2 2 3 4 5 ");
    }

    #[test]
    fn given_record_without_grades_when_rendering_then_ends_after_colon() {
        let r = StudentRecord::new("Empty", "E", GradeMultiset::new());
        assert_eq!(r.render(), "Empty E: ");
    }

    #[test]
    fn given_two_twos_when_checking_single_two_then_false() {
        assert!(!record("Jones", &[3, 2, 5, 2, 4]).has_single_two());
        assert!(record("Brown", &[3, 2, 5, 4, 4]).has_single_two());
    }

    #[test]
    fn given_all_fives_when_checking_then_excellent_without_threes() {
        let r = record("Smith", &[5, 5, 5, 5, 5]);
        assert!(r.is_excellent());
        assert!(!r.has_threes());
    }

    #[test]
    fn given_non_numeric_token_when_parsing_grade_then_invalid_grade() {
        assert_eq!(parse_grade("4"), Ok(4));
        assert_eq!(
            parse_grade("four"),
            Err(DomainError::InvalidGrade {
                token: "four".into()
            })
        );
    }
}
