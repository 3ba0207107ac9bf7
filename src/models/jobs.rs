use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::vehicles::VehicleType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    #[sea_orm(string_value = "taxi")]
    Taxi,
    #[sea_orm(string_value = "delivery")]
    Delivery,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Taxi => f.write_str("Taxi"),
            ServiceType::Delivery => f.write_str("Delivery"),
        }
    }
}

/// Job lifecycle. Forward only: OPEN → ACCEPTED → IN_PROGRESS → COMPLETED,
/// with CANCELLED reachable from OPEN or ACCEPTED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl JobStatus {
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Open, Accepted)
                | (Accepted, InProgress)
                | (InProgress, Completed)
                | (Open, Cancelled)
                | (Accepted, Cancelled)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Open => "Open",
            JobStatus::Accepted => "Accepted",
            JobStatus::InProgress => "In Progress",
            JobStatus::Completed => "Completed",
            JobStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// SeaORM entity for the `transport_requests` table.
///
/// `estimated_price` is written once at creation. A `None` in
/// `vehicle_type_required` means any vehicle is acceptable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transport_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub service_type: ServiceType,
    pub pickup_location: String,
    #[sea_orm(column_type = "Double")]
    pub pickup_latitude: f64,
    #[sea_orm(column_type = "Double")]
    pub pickup_longitude: f64,
    pub dropoff_location: String,
    #[sea_orm(column_type = "Double")]
    pub dropoff_latitude: f64,
    #[sea_orm(column_type = "Double")]
    pub dropoff_longitude: f64,
    pub pickup_time: DateTimeUtc,
    #[sea_orm(column_type = "Double")]
    pub budget: f64,
    #[sea_orm(column_type = "Double", nullable)]
    pub estimated_price: Option<f64>,
    #[sea_orm(column_type = "Double")]
    pub distance_km: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub route_polyline: Option<String>,
    pub estimated_minutes: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: JobStatus,
    pub is_urgent: bool,
    pub vehicle_type_required: Option<VehicleType>,
    pub rating: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub review: Option<String>,
    pub created_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
}

impl Model {
    /// Client or assigned provider.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.provider_id == Some(user_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
    #[sea_orm(has_one = "super::contracts::Entity")]
    Contract,
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for `POST /api/transport/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    pub service_type: ServiceType,
    pub pickup_location: String,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_location: String,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub pickup_time: chrono::DateTime<chrono::Utc>,
    pub budget: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub is_urgent: bool,
    pub vehicle_type_required: Option<VehicleType>,
}

/// Query parameters for the open job board.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub service_type: Option<ServiceType>,
    pub pickup_after: Option<chrono::DateTime<chrono::Utc>>,
    pub pickup_before: Option<chrono::DateTime<chrono::Utc>>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Model,
    pub bid_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    pub job: Model,
    pub bids: Vec<super::bids::Model>,
    pub contract: Option<super::contracts::Model>,
    pub can_bid: bool,
}

/// Request body for `POST /api/transport/jobs/{id}/complete`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteJob {
    pub rating: Option<i32>,
    pub review: Option<String>,
}
