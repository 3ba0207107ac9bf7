use sea_orm::prelude::Expr;
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::bids;
use crate::models::jobs::{self, CreateJob, JobFilter, JobStatus};

/// Route facts attached to a job at creation.
#[derive(Debug, Clone)]
pub struct RouteFacts {
    pub distance_km: f64,
    pub estimated_minutes: i32,
    pub polyline: String,
    pub estimated_price: f64,
}

pub async fn insert_job<C: ConnectionTrait>(
    db: &C,
    client_id: Uuid,
    input: CreateJob,
    route: RouteFacts,
) -> Result<jobs::Model, DbErr> {
    let job = jobs::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        provider_id: Set(None),
        service_type: Set(input.service_type),
        pickup_location: Set(input.pickup_location),
        pickup_latitude: Set(input.pickup_latitude),
        pickup_longitude: Set(input.pickup_longitude),
        dropoff_location: Set(input.dropoff_location),
        dropoff_latitude: Set(input.dropoff_latitude),
        dropoff_longitude: Set(input.dropoff_longitude),
        pickup_time: Set(input.pickup_time),
        budget: Set(input.budget),
        estimated_price: Set(Some(route.estimated_price)),
        distance_km: Set(route.distance_km),
        route_polyline: Set(Some(route.polyline)),
        estimated_minutes: Set(Some(route.estimated_minutes)),
        description: Set(input.description),
        status: Set(JobStatus::Open),
        is_urgent: Set(input.is_urgent),
        vehicle_type_required: Set(input.vehicle_type_required),
        rating: Set(None),
        review: Set(None),
        created_at: Set(chrono::Utc::now()),
        completed_at: Set(None),
    };

    job.insert(db).await
}

pub async fn get_job_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<jobs::Model>, DbErr> {
    jobs::Entity::find_by_id(id).one(db).await
}

/// Read a job holding a row lock until the surrounding transaction ends.
pub async fn get_job_for_update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<jobs::Model>, DbErr> {
    jobs::Entity::find_by_id(id).lock_exclusive().one(db).await
}

/// Conditionally move an OPEN job to ACCEPTED for a provider.
/// Returns false if the job was no longer OPEN.
pub async fn claim_open_job<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
    provider_id: Uuid,
) -> Result<bool, DbErr> {
    let result = jobs::Entity::update_many()
        .col_expr(jobs::Column::Status, Expr::value(JobStatus::Accepted))
        .col_expr(jobs::Column::ProviderId, Expr::value(Some(provider_id)))
        .filter(jobs::Column::Id.eq(job_id))
        .filter(jobs::Column::Status.eq(JobStatus::Open))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Move a job from `from` to `to`, guarded on the current status.
/// Returns false if another writer changed the status first.
pub async fn update_job_status<C: ConnectionTrait>(
    db: &C,
    job_id: Uuid,
    from: JobStatus,
    to: JobStatus,
) -> Result<bool, DbErr> {
    let result = jobs::Entity::update_many()
        .col_expr(jobs::Column::Status, Expr::value(to))
        .filter(jobs::Column::Id.eq(job_id))
        .filter(jobs::Column::Status.eq(from))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

pub async fn record_completion<C: ConnectionTrait>(
    db: &C,
    job: jobs::Model,
    rating: Option<i32>,
    review: Option<String>,
) -> Result<jobs::Model, DbErr> {
    let mut active: jobs::ActiveModel = job.into();
    active.status = Set(JobStatus::Completed);
    active.completed_at = Set(Some(chrono::Utc::now()));
    active.rating = Set(rating);
    active.review = Set(review);

    active.update(db).await
}

/// Open jobs matching the filter, newest first, one page at a time.
pub async fn get_open_jobs<C: ConnectionTrait>(
    db: &C,
    filter: &JobFilter,
    page: u64,
    limit: u64,
) -> Result<Vec<jobs::Model>, DbErr> {
    let mut query = jobs::Entity::find().filter(jobs::Column::Status.eq(JobStatus::Open));

    if let Some(service_type) = filter.service_type {
        query = query.filter(jobs::Column::ServiceType.eq(service_type));
    }
    if let Some(after) = filter.pickup_after {
        query = query.filter(jobs::Column::PickupTime.gte(after));
    }
    if let Some(before) = filter.pickup_before {
        query = query.filter(jobs::Column::PickupTime.lte(before));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        query = query.filter(Expr::cust_with_values(
            "(LOWER(pickup_location) LIKE ? OR LOWER(dropoff_location) LIKE ?)",
            [pattern.clone(), pattern],
        ));
    }

    query
        .order_by_desc(jobs::Column::CreatedAt)
        .paginate(db, limit)
        .fetch_page(page.saturating_sub(1))
        .await
}

/// Count bids for many jobs and return a job_id -> bid_count map.
pub async fn count_bids_for_jobs<C: ConnectionTrait>(
    db: &C,
    job_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, u64>, DbErr> {
    if job_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<Uuid> = bids::Entity::find()
        .select_only()
        .column(bids::Column::JobId)
        .filter(bids::Column::JobId.is_in(job_ids))
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    for job_id in rows {
        *counts.entry(job_id).or_insert(0) += 1;
    }

    Ok(counts)
}

pub async fn delete_job<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<DeleteResult, DbErr> {
    jobs::Entity::delete_by_id(id).exec(db).await
}
