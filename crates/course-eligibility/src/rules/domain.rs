use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::grade::{Grade, RecordedGrade};

/// Catalog identifier of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u32);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a basket within one course. Opaque; only unique per course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketId(pub String);

impl BasketId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BasketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Examination level a subject record belongs to. Serialized as `OL`/`AL`;
/// parsing accepts the same spellings as the CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Level {
    #[serde(rename = "OL")]
    Ordinary,
    #[serde(rename = "AL")]
    Advanced,
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Level {
    /// Lower-case tag used in reason codes.
    pub const fn code(self) -> &'static str {
        match self {
            Level::Ordinary => "ol",
            Level::Advanced => "al",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Ordinary => f.write_str("OL"),
            Level::Advanced => f.write_str("AL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a qualification level (expected OL or AL)")]
pub struct LevelParseError(pub String);

impl FromStr for Level {
    type Err = LevelParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, '/' | '-' | ' ' | '.'))
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "OL" | "ORDINARY" | "ORDINARYLEVEL" => Ok(Level::Ordinary),
            "AL" | "ADVANCED" | "ADVANCEDLEVEL" => Ok(Level::Advanced),
            _ => Err(LevelParseError(value.to_string())),
        }
    }
}

/// A candidate's result for one subject at one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub subject_id: SubjectId,
    pub level: Level,
    pub grade: RecordedGrade,
}

impl SubjectRecord {
    pub fn new(subject_id: u32, level: Level, grade: impl Into<RecordedGrade>) -> Self {
        Self {
            subject_id: SubjectId(subject_id),
            level,
            grade: grade.into(),
        }
    }
}

/// A candidate's qualification record, unique per `(level, subject)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRecord {
    grades: BTreeMap<(Level, SubjectId), RecordedGrade>,
}

impl CandidateRecord {
    /// Builds a record set. A subject recorded twice at the same level keeps
    /// its stronger grade.
    pub fn new(records: impl IntoIterator<Item = SubjectRecord>) -> Self {
        let mut grades: BTreeMap<(Level, SubjectId), RecordedGrade> = BTreeMap::new();
        for record in records {
            let key = (record.level, record.subject_id);
            match grades.remove(&key) {
                Some(existing) => {
                    tracing::warn!(
                        subject = %record.subject_id,
                        level = %record.level,
                        "duplicate subject record, keeping the stronger grade"
                    );
                    grades.insert(key, existing.stronger(record.grade));
                }
                None => {
                    grades.insert(key, record.grade);
                }
            }
        }
        Self { grades }
    }

    pub fn grade(&self, level: Level, subject: SubjectId) -> Option<&RecordedGrade> {
        self.grades.get(&(level, subject))
    }

    /// Records at one level, ordered by subject id.
    pub fn at_level(&self, level: Level) -> impl Iterator<Item = (SubjectId, &RecordedGrade)> {
        self.grades
            .iter()
            .filter(move |((record_level, _), _)| *record_level == level)
            .map(|((_, subject), grade)| (*subject, grade))
    }

    /// Records whose grade is outside the scale.
    pub fn unrecognized(&self) -> impl Iterator<Item = (Level, SubjectId, &str)> {
        self.grades
            .iter()
            .filter_map(|((level, subject), grade)| match grade {
                RecordedGrade::Unrecognized(raw) => Some((*level, *subject, raw.as_str())),
                RecordedGrade::Known(_) => None,
            })
    }

    pub fn records(&self) -> impl Iterator<Item = SubjectRecord> + '_ {
        self.grades
            .iter()
            .map(|((level, subject), grade)| SubjectRecord {
                subject_id: *subject,
                level: *level,
                grade: grade.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.grades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }
}

impl FromIterator<SubjectRecord> for CandidateRecord {
    fn from_iter<I: IntoIterator<Item = SubjectRecord>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[derive(Serialize)]
struct CandidateDocumentOut {
    records: Vec<SubjectRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateDocument {
    Wrapped { records: Vec<SubjectRecord> },
    Bare(Vec<SubjectRecord>),
}

impl Serialize for CandidateRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CandidateDocumentOut {
            records: self.records().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CandidateRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = match CandidateDocument::deserialize(deserializer)? {
            CandidateDocument::Wrapped { records } | CandidateDocument::Bare(records) => records,
        };
        Ok(Self::new(records))
    }
}

/// AND/OR combinator used inside a basket and between baskets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOperator {
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl LogicOperator {
    pub const fn code(self) -> &'static str {
        match self {
            LogicOperator::And => "and",
            LogicOperator::Or => "or",
        }
    }
}

impl fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicOperator::And => f.write_str("AND"),
            LogicOperator::Or => f.write_str("OR"),
        }
    }
}

/// "`count` subjects at `grade` or better".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRequirement {
    pub grade: Grade,
    pub count: u32,
}

/// Minimum grade for one named subject of a basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectGradeRequirement {
    pub subject_id: SubjectId,
    pub min_grade: Grade,
}

/// A named group of A/L subjects with selection and grade constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectBasket {
    pub id: BasketId,
    #[serde(default)]
    pub name: String,
    pub subject_ids: BTreeSet<SubjectId>,
    pub min_required: u32,
    pub max_allowed: u32,
    pub internal_logic: LogicOperator,
    #[serde(default)]
    pub grade_requirements: Vec<GradeRequirement>,
    #[serde(default)]
    pub subject_specific_grades: Vec<SubjectGradeRequirement>,
}

impl SubjectBasket {
    /// A basket with no minimum selection never blocks eligibility.
    pub fn is_optional(&self) -> bool {
        self.min_required == 0
    }

    pub fn required_grade_total(&self) -> u64 {
        self.grade_requirements
            .iter()
            .map(|requirement| u64::from(requirement.count))
            .sum()
    }
}

/// Relationship between a primary basket and one or more target baskets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketLogicRule {
    pub logic: LogicOperator,
    pub primary_basket_id: BasketId,
    pub target_basket_ids: BTreeSet<BasketId>,
}

impl BasketLogicRule {
    /// Primary and targets, deduplicated.
    pub fn participants(&self) -> BTreeSet<&BasketId> {
        std::iter::once(&self.primary_basket_id)
            .chain(self.target_basket_ids.iter())
            .collect()
    }
}

fn default_group_count() -> u32 {
    1
}

/// One O/L entry requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum OlRequirement {
    /// A named subject at a minimum grade.
    SubjectGrade { subject_id: SubjectId, min_grade: Grade },
    /// "N passes at grade X or better" across all O/L subjects.
    CountRule { min_grade: Grade, required_count: u32 },
    /// At least `required_count` of the listed subjects at the grade.
    OrGroup {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        group_id: Option<String>,
        subject_ids: BTreeSet<SubjectId>,
        min_grade: Grade,
        #[serde(default = "default_group_count")]
        required_count: u32,
    },
}

/// Minimum qualification a course demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualificationTier {
    #[serde(rename = "noNeed")]
    NoNeed,
    #[serde(rename = "OLPass")]
    OlPass,
    #[serde(rename = "ALPass")]
    AlPass,
    Foundation,
    Diploma,
    #[serde(rename = "HND")]
    Hnd,
    Graduate,
}

impl QualificationTier {
    pub fn requires_ordinary_level(self) -> bool {
        matches!(
            self,
            QualificationTier::OlPass | QualificationTier::AlPass | QualificationTier::Foundation
        )
    }

    pub fn requires_advanced_level(self) -> bool {
        matches!(self, QualificationTier::AlPass | QualificationTier::Foundation)
    }

    /// Whether results at `level` are looked at for this tier.
    pub fn examines(self, level: Level) -> bool {
        match level {
            Level::Ordinary => self.requires_ordinary_level(),
            Level::Advanced => self.requires_advanced_level(),
        }
    }
}

/// Full entry requirement of one course, as persisted by the catalog admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequirementTree {
    pub min_qualification_tier: QualificationTier,
    #[serde(default)]
    pub ol_requirements: Vec<OlRequirement>,
    #[serde(default)]
    pub baskets: Vec<SubjectBasket>,
    #[serde(default)]
    pub basket_logic_rules: Vec<BasketLogicRule>,
}

impl CourseRequirementTree {
    /// A course open to everyone.
    pub fn open_entry() -> Self {
        Self {
            min_qualification_tier: QualificationTier::NoNeed,
            ol_requirements: Vec::new(),
            baskets: Vec::new(),
            basket_logic_rules: Vec::new(),
        }
    }
}
