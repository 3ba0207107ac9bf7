use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::CoreError;
use crate::models::bids::SubmitBid;
use crate::models::jobs::{CompleteJob, CreateJob, JobFilter};
use crate::models::templates::SaveTemplate;
use crate::services::BidEngine;

/// GET /api/transport/jobs: open jobs with bid counts.
pub async fn list_jobs(
    _user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    query: web::Query<JobFilter>,
) -> Result<HttpResponse, CoreError> {
    let jobs = engine.list_open_jobs(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

/// POST /api/transport/jobs
pub async fn create_job(
    user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    body: web::Json<CreateJob>,
) -> Result<HttpResponse, CoreError> {
    let job = engine.create_job(user.0.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(job))
}

/// GET /api/transport/jobs/{id}
pub async fn job_detail(
    user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let detail = engine.job_detail(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// DELETE /api/transport/jobs/{id}: client only, OPEN or CANCELLED jobs.
pub async fn delete_job(
    user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    engine.delete_job(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/transport/jobs/{id}/bids
pub async fn submit_bid(
    user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    path: web::Path<Uuid>,
    body: web::Json<SubmitBid>,
) -> Result<HttpResponse, CoreError> {
    let bid = engine
        .submit_bid(path.into_inner(), user.0.id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(bid))
}

/// POST /api/transport/jobs/{id}/start
pub async fn start_job(
    user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let job = engine.start_job(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// POST /api/transport/jobs/{id}/complete: body is optional.
pub async fn complete_job(
    user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    path: web::Path<Uuid>,
    body: Option<web::Json<CompleteJob>>,
) -> Result<HttpResponse, CoreError> {
    let input = body.map(web::Json::into_inner).unwrap_or_default();
    let job = engine
        .complete_job(path.into_inner(), user.0.id, input)
        .await?;
    Ok(HttpResponse::Ok().json(job))
}

/// POST /api/transport/jobs/{id}/cancel
pub async fn cancel_job(
    user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let job = engine.cancel_job(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// POST /api/transport/bids/{id}/accept: returns the PENDING contract.
pub async fn accept_bid(
    user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let contract = engine.accept_bid(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(contract))
}

/// POST /api/transport/contracts/{id}/confirm
pub async fn confirm_contract(
    user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CoreError> {
    let contract = engine
        .confirm_contract(path.into_inner(), user.0.id)
        .await?;
    Ok(HttpResponse::Ok().json(contract))
}

/// POST /api/transport/templates: admin only.
pub async fn save_template(
    user: AuthenticatedUser,
    engine: web::Data<BidEngine>,
    body: web::Json<SaveTemplate>,
) -> Result<HttpResponse, CoreError> {
    let template = engine.save_template(&user.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(template))
}
