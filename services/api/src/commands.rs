use crate::infra::read_json;
use clap::Args;
use course_eligibility::config::AppConfig;
use course_eligibility::error::AppError;
use course_eligibility::rules::{
    eligible_course_ids, validate, CandidateRecord, CourseListing, CourseMatchView,
    CourseRequirementTree, EligibilityEngine, QualificationTier,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Course requirement tree (JSON)
    #[arg(long)]
    pub(crate) tree: PathBuf,
    /// Candidate results (CSV or JSON)
    #[arg(long)]
    pub(crate) candidate: PathBuf,
    /// Print a one-line summary instead of the full verdict
    #[arg(long)]
    pub(crate) summary: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Course requirement tree (JSON)
    #[arg(long)]
    pub(crate) tree: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Course catalog: a JSON array of course listings
    #[arg(long)]
    pub(crate) courses: PathBuf,
    /// Candidate results (CSV or JSON)
    #[arg(long)]
    pub(crate) candidate: PathBuf,
    /// Only list the ids of courses the candidate qualifies for
    #[arg(long)]
    pub(crate) eligible_only: bool,
}

pub(crate) fn run_evaluate(config: &AppConfig, args: EvaluateArgs) -> Result<(), AppError> {
    let tree: CourseRequirementTree = read_json(&args.tree)?;
    let candidate = CandidateRecord::from_path(&args.candidate)?;

    let verdict = EligibilityEngine::new(config.engine).evaluate(&tree, &candidate)?;
    info!(
        tree = %args.tree.display(),
        eligible = verdict.eligible,
        "evaluation complete"
    );

    if args.summary {
        println!("{}", verdict.summary());
        Ok(())
    } else {
        print_json(&verdict)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationReport {
    valid: bool,
    tier: QualificationTier,
    baskets: usize,
    rules: usize,
    ol_requirements: usize,
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let tree: CourseRequirementTree = read_json(&args.tree)?;
    let valid = validate(tree)?;

    print_json(&ValidationReport {
        valid: true,
        tier: valid.tier(),
        baskets: valid.baskets().len(),
        rules: valid.rules().len(),
        ol_requirements: valid.ol_requirements().len(),
    })
}

pub(crate) fn run_match(config: &AppConfig, args: MatchArgs) -> Result<(), AppError> {
    let courses: Vec<CourseListing> = read_json(&args.courses)?;
    let candidate = CandidateRecord::from_path(&args.candidate)?;

    let matches = EligibilityEngine::new(config.engine).match_courses(&courses, &candidate);
    let eligible = eligible_course_ids(&matches);
    info!(
        courses = courses.len(),
        eligible = eligible.len(),
        "catalog match complete"
    );

    if args.eligible_only {
        for course_id in eligible {
            println!("{course_id}");
        }
        Ok(())
    } else {
        let views: Vec<CourseMatchView> = matches.iter().map(|m| m.view()).collect();
        print_json(&views)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
