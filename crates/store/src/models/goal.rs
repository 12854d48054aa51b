//! Study goal models
//!
//! Every goal field except the grade and averages is drawn from a fixed
//! choice table. Rank ranges are ordered by their position in that table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest accepted school average
pub const MAX_AVERAGE: f64 = 20.0;

/// Declare a choice enum backed by a `(value, label)` table
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $table:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($value:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $value)] $variant ),+
        }

        const $table: &[(&str, &str)] = &[ $( ($value, $label) ),+ ];

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $value ),+
                }
            }

            pub fn from_str(s: &str) -> Option<Self> {
                match s {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Human-readable label
            pub fn label(&self) -> &'static str {
                $table
                    .iter()
                    .find(|(value, _)| *value == self.as_str())
                    .map(|(_, label)| *label)
                    .unwrap_or("")
            }

            /// `(value, label)` pairs in table order
            pub fn choices() -> &'static [(&'static str, &'static str)] {
                $table
            }
        }
    };
}

choice_enum! {
    /// High-school track
    FieldOfStudy, FIELD_CHOICES {
        Math => ("Math", "Mathematics"),
        #[default]
        Experimental => ("Experimental", "Experimental Sciences"),
        Humanities => ("Humanities", "Humanities"),
    }
}

choice_enum! {
    /// What the user is studying for
    Purpose, PURPOSE_CHOICES {
        FinalExams => ("Final Exams", "Final Exams"),
        Entrance => ("Entrance", "University Entrance Exam"),
        #[default]
        General => ("General", "General Study"),
        ExamNight => ("Exam Night", "Night Before Exam"),
    }
}

choice_enum! {
    /// Daily study time
    StudyHours, STUDY_HOURS_CHOICES {
        #[default]
        LessThanOne => ("LessThan1", "Less than 1 hour"),
        OneToTwo => ("1to2", "1 to 2 hours"),
        TwoToFour => ("2to4", "2 to 4 hours"),
        MoreThanFour => ("MoreThan4", "More than 4 hours"),
    }
}

choice_enum! {
    /// Target entrance exam rank bracket
    ///
    /// Variant order follows the table, so `<=` compares brackets.
    RankRange, RANK_RANGE_CHOICES {
        #[default]
        R1To50 => ("1-50", "1 to 50"),
        R50To100 => ("50-100", "50 to 100"),
        R100To500 => ("100-500", "100 to 500"),
        R500To1000 => ("500-1000", "500 to 1000"),
        R1000To20000 => ("1000-20000", "1000 to 20000"),
        R2000To50000 => ("2000-50000", "2000 to 50000"),
        R5000To100000 => ("5000-100000", "5000 to 100000"),
    }
}

/// Goal fields supplied by the user on create and update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalInput {
    pub grade_id: i64,
    pub field_of_study: FieldOfStudy,
    pub purpose: Purpose,
    pub from_rank_range: RankRange,
    pub to_rank_range: RankRange,
    pub study_hours: StudyHours,
    pub average_tenth: f64,
    pub average_eleventh: f64,
}

impl GoalInput {
    pub fn new(grade_id: i64) -> Self {
        Self {
            grade_id,
            ..Default::default()
        }
    }

    /// Check field constraints that do not need the database
    ///
    /// Returns the offending field and a message.
    pub fn check(&self) -> Result<(), (&'static str, String)> {
        if self.from_rank_range > self.to_rank_range {
            return Err((
                "from_rank_range",
                "must be less than or equal to to_rank_range".to_string(),
            ));
        }
        for (field, value) in [
            ("average_tenth", self.average_tenth),
            ("average_eleventh", self.average_eleventh),
        ] {
            if !(0.0..=MAX_AVERAGE).contains(&value) {
                return Err((field, format!("must be between 0 and {}", MAX_AVERAGE)));
            }
        }
        Ok(())
    }
}

/// A user's stated study goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: String,
    #[serde(flatten)]
    pub input: GoalInput,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_range_order_follows_table() {
        let values: Vec<&str> = RankRange::choices().iter().map(|(v, _)| *v).collect();
        assert_eq!(values.first(), Some(&"1-50"));
        assert!(RankRange::R1To50 < RankRange::R5000To100000);
        assert_eq!(RankRange::from_str("500-1000"), Some(RankRange::R500To1000));
        assert_eq!(RankRange::R100To500.label(), "100 to 500");
    }

    #[test]
    fn test_check_rank_order_and_averages() {
        let mut input = GoalInput::new(1);
        input.from_rank_range = RankRange::R100To500;
        input.to_rank_range = RankRange::R100To500;
        assert!(input.check().is_ok());

        input.to_rank_range = RankRange::R50To100;
        assert_eq!(input.check().unwrap_err().0, "from_rank_range");

        let mut input = GoalInput::new(1);
        input.average_eleventh = 20.5;
        assert_eq!(input.check().unwrap_err().0, "average_eleventh");
    }

    #[test]
    fn test_serde_uses_table_values() {
        let json = serde_json::to_value(Purpose::ExamNight).unwrap();
        assert_eq!(json, "Exam Night");
        let parsed: StudyHours = serde_json::from_str("\"1to2\"").unwrap();
        assert_eq!(parsed, StudyHours::OneToTwo);
    }
}
