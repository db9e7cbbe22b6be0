use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use course_eligibility::error::AppError;
use course_eligibility::rules::{
    eligible_course_ids, validate, CandidateRecord, CourseListing, CourseMatchView,
    CourseRequirementTree, EligibilityEngine, EligibilityVerdict, QualificationTier,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EvaluateRequest {
    pub(crate) requirements: CourseRequirementTree,
    pub(crate) candidate: CandidateRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EvaluateResponse {
    pub(crate) evaluated_at: DateTime<Utc>,
    pub(crate) summary: String,
    pub(crate) verdict: EligibilityVerdict,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateRequest {
    pub(crate) requirements: CourseRequirementTree,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateResponse {
    pub(crate) checked_at: DateTime<Utc>,
    pub(crate) valid: bool,
    pub(crate) tier: QualificationTier,
    pub(crate) baskets: usize,
    pub(crate) rules: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchRequest {
    pub(crate) courses: Vec<CourseListing>,
    pub(crate) candidate: CandidateRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchResponse {
    pub(crate) evaluated_at: DateTime<Utc>,
    pub(crate) eligible_course_ids: Vec<String>,
    pub(crate) matches: Vec<CourseMatchView>,
}

pub(crate) fn eligibility_router(engine: Arc<EligibilityEngine>) -> Router {
    Router::new()
        .route("/api/v1/eligibility/evaluate", post(evaluate_endpoint))
        .route("/api/v1/eligibility/validate", post(validate_endpoint))
        .route("/api/v1/eligibility/match", post(match_endpoint))
        .with_state(engine)
}

pub(crate) fn with_eligibility_routes(engine: Arc<EligibilityEngine>) -> Router {
    eligibility_router(engine)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn evaluate_endpoint(
    State(engine): State<Arc<EligibilityEngine>>,
    Json(payload): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, AppError> {
    let verdict = engine.evaluate(&payload.requirements, &payload.candidate)?;
    tracing::info!(
        tier = ?payload.requirements.min_qualification_tier,
        eligible = verdict.eligible,
        "eligibility request evaluated"
    );

    Ok(Json(EvaluateResponse {
        evaluated_at: Utc::now(),
        summary: verdict.summary(),
        verdict,
    }))
}

pub(crate) async fn validate_endpoint(
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    let valid = validate(payload.requirements)?;

    Ok(Json(ValidateResponse {
        checked_at: Utc::now(),
        valid: true,
        tier: valid.tier(),
        baskets: valid.baskets().len(),
        rules: valid.rules().len(),
    }))
}

pub(crate) async fn match_endpoint(
    State(engine): State<Arc<EligibilityEngine>>,
    Json(payload): Json<MatchRequest>,
) -> Json<MatchResponse> {
    let matches = engine.match_courses(&payload.courses, &payload.candidate);
    tracing::info!(courses = matches.len(), "catalog match evaluated");

    Json(MatchResponse {
        evaluated_at: Utc::now(),
        eligible_course_ids: eligible_course_ids(&matches),
        matches: matches.iter().map(|course_match| course_match.view()).collect(),
    })
}
