use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Qualification grade shared by the O/L and A/L scales.
///
/// The scale is totally ordered `A > B > C > S > F`; `F` is the failing grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    S,
    F,
}

impl Grade {
    /// Every grade from best to worst.
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::S, Grade::F];

    /// Position on the scale; higher is better.
    pub const fn rank(self) -> u8 {
        match self {
            Grade::A => 4,
            Grade::B => 3,
            Grade::C => 2,
            Grade::S => 1,
            Grade::F => 0,
        }
    }

    pub const fn letter(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::S => "S",
            Grade::F => "F",
        }
    }
}

impl Ord for Grade {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Grade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a grade on the A/B/C/S/F scale")]
pub struct GradeParseError(pub String);

impl FromStr for Grade {
    type Err = GradeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "S" => Ok(Grade::S),
            "F" => Ok(Grade::F),
            _ => Err(GradeParseError(value.to_string())),
        }
    }
}

/// True when `actual` is at or above `required` on the scale.
pub fn at_least(actual: Grade, required: Grade) -> bool {
    actual.rank() >= required.rank()
}

/// Grade as it appears on a candidate's record.
///
/// Candidate data comes from result sheets and may carry values outside the
/// scale (absent marks, typos, withheld results). Those are kept verbatim so
/// they can be reported, and rank as `F` for every comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordedGrade {
    Known(Grade),
    Unrecognized(String),
}

impl RecordedGrade {
    pub fn parse(raw: &str) -> Self {
        raw.parse::<Grade>()
            .map(RecordedGrade::Known)
            .unwrap_or_else(|_| RecordedGrade::Unrecognized(raw.trim().to_string()))
    }

    /// Grade used for comparisons.
    pub fn effective(&self) -> Grade {
        match self {
            RecordedGrade::Known(grade) => *grade,
            RecordedGrade::Unrecognized(_) => Grade::F,
        }
    }

    pub fn meets(&self, required: Grade) -> bool {
        at_least(self.effective(), required)
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, RecordedGrade::Known(_))
    }

    /// Picks the stronger of two recordings for the same subject; a known
    /// grade wins a tie against an unrecognized value.
    pub(crate) fn stronger(self, other: RecordedGrade) -> RecordedGrade {
        match self.effective().cmp(&other.effective()) {
            Ordering::Greater => self,
            Ordering::Less => other,
            Ordering::Equal if !self.is_recognized() && other.is_recognized() => other,
            Ordering::Equal => self,
        }
    }
}

impl From<Grade> for RecordedGrade {
    fn from(grade: Grade) -> Self {
        RecordedGrade::Known(grade)
    }
}

impl fmt::Display for RecordedGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordedGrade::Known(grade) => grade.fmt(f),
            RecordedGrade::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for RecordedGrade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordedGrade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RecordedGrade::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_totally_ordered() {
        for window in Grade::ALL.windows(2) {
            assert!(window[0] > window[1], "{} should outrank {}", window[0], window[1]);
        }
    }

    #[test]
    fn at_least_follows_rank() {
        assert!(at_least(Grade::A, Grade::C));
        assert!(at_least(Grade::C, Grade::C));
        assert!(!at_least(Grade::S, Grade::C));
    }

    #[test]
    fn failing_grade_only_satisfies_itself() {
        for required in Grade::ALL {
            assert_eq!(at_least(Grade::F, required), required == Grade::F);
        }
    }

    #[test]
    fn unrecognized_grades_rank_as_failing() {
        let recorded = RecordedGrade::parse("AB");
        assert_eq!(recorded, RecordedGrade::Unrecognized("AB".to_string()));
        assert_eq!(recorded.effective(), Grade::F);
        assert!(!recorded.meets(Grade::S));
        assert!(recorded.meets(Grade::F));
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(RecordedGrade::parse(" b "), RecordedGrade::Known(Grade::B));
        assert_eq!("s".parse::<Grade>(), Ok(Grade::S));
    }

    #[test]
    fn stronger_prefers_known_grade_on_tie() {
        let unknown = RecordedGrade::Unrecognized("X".to_string());
        let failing = RecordedGrade::Known(Grade::F);
        assert_eq!(unknown.stronger(failing.clone()), failing);
        assert_eq!(
            RecordedGrade::Known(Grade::C).stronger(Grade::B.into()),
            RecordedGrade::Known(Grade::B)
        );
    }

    #[test]
    fn recorded_grade_serializes_as_raw_text() {
        let json = serde_json::to_string(&vec![
            RecordedGrade::Known(Grade::A),
            RecordedGrade::Unrecognized("absent".to_string()),
        ])
        .expect("serializes");
        assert_eq!(json, r#"["A","absent"]"#);
    }
}
