use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::Matcher;
use crate::models::{ErrorResponse, HealthResponse, RankRequest, RankResponse};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<Matcher>,
}

/// Configure ranking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/rank", web::post().to(rank_resumes));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        scorer: state.matcher.scorer_name().to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Rank resumes for a job
///
/// POST /api/v1/rank
///
/// Request body:
/// ```json
/// {
///   "job": {
///     "skills": ["python", "sql"],
///     "description": "string",
///     "experiencePolicy": "fresher|experienced|any"
///   },
///   "resumes": [{"resumeId": "string", "text": "string"}]
/// }
/// ```
///
/// `experience_policy` and `resume_id` are accepted as aliases.
async fn rank_resumes(
    state: web::Data<AppState>,
    req: web::Json<RankRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for rank request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let job = match req.job.to_requirement() {
        Ok(job) => job,
        Err(e) => {
            tracing::info!("Rejected job specification: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid job specification".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    let RankRequest { resumes, .. } = req.into_inner();
    let result = state.matcher.rank(&job, resumes).await;

    tracing::info!(
        "Returning {} ranked candidates for run {}",
        result.candidates.len(),
        result.run_id
    );

    HttpResponse::Ok().json(RankResponse::from(result))
}
