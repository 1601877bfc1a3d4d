use serde::{Deserialize, Serialize};

use crate::model::Student;

/// GPA summary over a set of students.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    #[serde(rename = "averageGPA")]
    pub average_gpa: f64,
    #[serde(rename = "highestGPA")]
    pub highest_gpa: f64,
    #[serde(rename = "lowestGPA")]
    pub lowest_gpa: f64,
}

impl Statistics {
    /// Summarize `students`. An empty slice yields all zeros.
    ///
    /// The average is rounded to two decimals; highest and lowest are
    /// reported as stored.
    pub fn compute(students: &[Student]) -> Self {
        if students.is_empty() {
            return Self::default();
        }

        let count = students.len();
        let mut sum = 0.0;
        let mut highest = f64::NEG_INFINITY;
        let mut lowest = f64::INFINITY;
        for student in students {
            sum += student.gpa;
            highest = highest.max(student.gpa);
            lowest = lowest.min(student.gpa);
        }

        Self {
            count,
            average_gpa: round_to_hundredths(sum / count as f64),
            highest_gpa: highest,
            lowest_gpa: lowest,
        }
    }
}

/// Round to two decimals, judged on the exact binary value.
///
/// Exact ties go away from zero; everything else rounds to the nearest
/// hundredth, so 1.125 becomes 1.13 while 1.115 (stored just below the tie)
/// becomes 1.11.
fn round_to_hundredths(value: f64) -> f64 {
    if is_exact_hundredths_tie(value) {
        return (value * 100.0).round() / 100.0;
    }
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// True iff the exact decimal expansion of `value` ends in a 5 at the
/// third fractional digit.
fn is_exact_hundredths_tie(value: f64) -> bool {
    // 1074 fractional digits cover every finite f64 exactly.
    let exact = format!("{:.1074}", value.abs());
    match exact.split_once('.') {
        Some((_, frac)) => frac.as_bytes()[2] == b'5' && frac[3..].bytes().all(|b| b == b'0'),
        None => false,
    }
}
