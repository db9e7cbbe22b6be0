use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::{CandidateRecord, Level, SubjectId, SubjectRecord};
use super::grade::RecordedGrade;

/// Failure to load a candidate's results from a file or export.
#[derive(Debug, thiserror::Error)]
pub enum CandidateImportError {
    #[error("failed to read candidate results: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid candidate CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid candidate JSON data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {row}: '{value}' is not a subject id")]
    InvalidSubjectId { row: usize, value: String },
    #[error("row {row}: '{value}' is not a qualification level")]
    UnknownLevel { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct ResultRow {
    #[serde(alias = "subjectId", alias = "Subject ID")]
    subject_id: String,
    #[serde(alias = "Level")]
    level: String,
    #[serde(alias = "Grade", default)]
    grade: String,
}

impl CandidateRecord {
    /// Reads a `subject_id,level,grade` results sheet.
    ///
    /// Grades outside the scale are kept as recorded; only a bad subject id or
    /// level rejects the sheet. Row numbers in errors count data rows from 1.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CandidateImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (position, row) in csv_reader.deserialize::<ResultRow>().enumerate() {
            let row = row?;
            let row_number = position + 1;
            let subject_id = row.subject_id.parse::<u32>().map_err(|_| {
                CandidateImportError::InvalidSubjectId {
                    row: row_number,
                    value: row.subject_id.clone(),
                }
            })?;
            let level = row
                .level
                .parse::<Level>()
                .map_err(|_| CandidateImportError::UnknownLevel {
                    row: row_number,
                    value: row.level.clone(),
                })?;

            records.push(SubjectRecord {
                subject_id: SubjectId(subject_id),
                level,
                grade: RecordedGrade::parse(&row.grade),
            });
        }

        Ok(Self::new(records))
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CandidateImportError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads a candidate file, choosing CSV or JSON by extension (JSON when
    /// the extension is anything other than `csv`).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CandidateImportError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            Self::from_csv_reader(file)
        } else {
            Self::from_json_reader(std::io::BufReader::new(file))
        }
    }
}
