use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::jobs::ServiceType;

/// Template key. `Default` is the fallback when no template exists for the
/// job's own service type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateServiceType {
    #[sea_orm(string_value = "taxi")]
    Taxi,
    #[sea_orm(string_value = "delivery")]
    Delivery,
    #[sea_orm(string_value = "default")]
    Default,
}

impl From<ServiceType> for TemplateServiceType {
    fn from(s: ServiceType) -> Self {
        match s {
            ServiceType::Taxi => TemplateServiceType::Taxi,
            ServiceType::Delivery => TemplateServiceType::Delivery,
        }
    }
}

/// SeaORM entity for the `contract_templates` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contract_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_type: TemplateServiceType,
    #[sea_orm(column_type = "Text")]
    pub terms: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveTemplate {
    pub service_type: TemplateServiceType,
    pub terms: String,
}
