use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::users as user_db;
use crate::error::CoreError;
use crate::models::users::{AccountType, ServiceTypes};
use crate::models::vehicles::VehicleType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleSummary {
    pub vehicle_type: VehicleType,
    pub verified: bool,
}

/// What eligibility checks need to know about a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub user_id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    pub verified: bool,
    pub service_types: Option<ServiceTypes>,
    pub vehicles: Vec<VehicleSummary>,
}

/// Read-only lookup of provider profiles.
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    async fn get_eligibility(&self, provider_id: Uuid) -> Result<ProviderProfile, CoreError>;
}

/// Directory backed by the `users` and `vehicles` tables.
#[derive(Clone)]
pub struct DbProviderDirectory {
    db: DatabaseConnection,
}

impl DbProviderDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProviderDirectory for DbProviderDirectory {
    async fn get_eligibility(&self, provider_id: Uuid) -> Result<ProviderProfile, CoreError> {
        let user = user_db::get_user_by_id(&self.db, provider_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("User {provider_id}")))?;

        let vehicles = user_db::get_vehicles_for_owner(&self.db, provider_id)
            .await?
            .into_iter()
            .map(|v| VehicleSummary {
                vehicle_type: v.vehicle_type,
                verified: v.is_verified,
            })
            .collect();

        Ok(ProviderProfile {
            user_id: user.id,
            name: user.full_name(),
            account_type: user.account_type,
            verified: user.is_verified,
            service_types: user.service_types,
            vehicles,
        })
    }
}
