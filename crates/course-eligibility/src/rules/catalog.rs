use serde::{Deserialize, Serialize};

use super::domain::{CandidateRecord, CourseRequirementTree};
use super::evaluation::{EligibilityEngine, EligibilityVerdict};
use super::validation::EligibilityError;

/// A course offered in the catalog together with its entry requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListing {
    pub course_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    pub requirements: CourseRequirementTree,
}

/// Result of matching one candidate against one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseMatch {
    pub course_id: String,
    pub title: String,
    pub outcome: Result<EligibilityVerdict, EligibilityError>,
}

impl CourseMatch {
    pub fn is_eligible(&self) -> bool {
        matches!(&self.outcome, Ok(verdict) if verdict.eligible)
    }

    pub fn view(&self) -> CourseMatchView {
        let (verdict, error) = match &self.outcome {
            Ok(verdict) => (Some(verdict.clone()), None),
            Err(err) => (
                None,
                Some(MatchErrorView {
                    code: err.code(),
                    message: err.to_string(),
                }),
            ),
        };
        CourseMatchView {
            course_id: self.course_id.clone(),
            title: self.title.clone(),
            eligible: self.is_eligible(),
            verdict,
            error,
        }
    }
}

/// Serializable form of [`CourseMatch`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMatchView {
    pub course_id: String,
    pub title: String,
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<EligibilityVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MatchErrorView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchErrorView {
    pub code: &'static str,
    pub message: String,
}

impl EligibilityEngine {
    /// Evaluates one candidate against many courses. Each course is
    /// independent; a malformed course yields an error entry without
    /// affecting the others. Output order follows `courses`.
    pub fn match_courses(
        &self,
        courses: &[CourseListing],
        candidate: &CandidateRecord,
    ) -> Vec<CourseMatch> {
        #[cfg(feature = "parallel")]
        let matches: Vec<CourseMatch> = {
            use rayon::prelude::*;
            courses
                .par_iter()
                .map(|course| self.match_course(course, candidate))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let matches: Vec<CourseMatch> = courses
            .iter()
            .map(|course| self.match_course(course, candidate))
            .collect();

        tracing::debug!(
            courses = courses.len(),
            eligible = matches.iter().filter(|m| m.is_eligible()).count(),
            "candidate matched against catalog"
        );
        matches
    }

    pub fn match_course(
        &self,
        course: &CourseListing,
        candidate: &CandidateRecord,
    ) -> CourseMatch {
        CourseMatch {
            course_id: course.course_id.clone(),
            title: course.title.clone(),
            outcome: self.evaluate(&course.requirements, candidate),
        }
    }
}

/// Ids of the courses the candidate is eligible for, in input order.
pub fn eligible_course_ids(matches: &[CourseMatch]) -> Vec<String> {
    matches
        .iter()
        .filter(|course_match| course_match.is_eligible())
        .map(|course_match| course_match.course_id.clone())
        .collect()
}
