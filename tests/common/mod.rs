//! Shared fixtures for the integration tests: an in-memory SQLite database
//! with the real schema, row builders and collaborator doubles.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use marketplace_core::chat::ChatBroadcaster;
use marketplace_core::error::CoreError;
use marketplace_core::external::{
    DbProviderDirectory, LatLng, LedgerService, NotificationEmitter, NotificationEvent, Route,
    RouteOracle,
};
use marketplace_core::models::jobs::{CreateJob, ServiceType};
use marketplace_core::models::notifications::NotificationKind;
use marketplace_core::models::projects::{self, ProjectStatus};
use marketplace_core::models::templates::{self, TemplateServiceType};
use marketplace_core::models::users::{self, AccountType, Roles, ServiceTypes};
use marketplace_core::models::vehicles::{self, VehicleType};
use marketplace_core::services::{BidEngine, ChatService};

pub const FULL_TEMPLATE: &str = "{service_type} job {job_id}: {client_name} pays {provider_name} \
E{agreed_amount} to go from {pickup_location} to {dropoff_location}.";

/// One connection so every query sees the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to open in-memory SQLite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

// ── Rows ──

pub async fn insert_user(db: &DatabaseConnection, name: &str, role: Roles) -> users::Model {
    let id = Uuid::new_v4();
    users::ActiveModel {
        id: Set(id),
        email: Set(format!("{name}-{id}@example.com")),
        username: Set(None),
        display_name: Set(Some(name.to_string())),
        role: Set(role),
        account_type: Set(AccountType::Regular),
        is_verified: Set(false),
        service_types: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

/// A verified provider offering `services`.
pub async fn insert_provider(
    db: &DatabaseConnection,
    name: &str,
    services: ServiceTypes,
) -> users::Model {
    let user = insert_user(db, name, Roles::Freelancer).await;
    let mut active: users::ActiveModel = user.into();
    active.account_type = Set(AccountType::Provider);
    active.is_verified = Set(true);
    active.service_types = Set(Some(services));
    active.update(db).await.expect("Failed to promote provider")
}

pub async fn set_verified(db: &DatabaseConnection, user: &users::Model, verified: bool) {
    let mut active: users::ActiveModel = user.clone().into();
    active.is_verified = Set(verified);
    active.update(db).await.expect("Failed to update user");
}

pub async fn insert_vehicle(
    db: &DatabaseConnection,
    owner: Uuid,
    vehicle_type: VehicleType,
    verified: bool,
) -> vehicles::Model {
    vehicles::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner),
        vehicle_type: Set(vehicle_type),
        make: Set("Toyota".into()),
        model: Set("Hiace".into()),
        license_plate: Set(format!("ABC-{}", &Uuid::new_v4().to_string()[..6])),
        is_active: Set(true),
        is_verified: Set(verified),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert vehicle")
}

pub async fn insert_project(
    db: &DatabaseConnection,
    client: Uuid,
    freelancer: Option<Uuid>,
    status: ProjectStatus,
) -> projects::Model {
    projects::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Logo redesign".into()),
        description: Set("A fresh logo".into()),
        client_id: Set(client),
        freelancer_id: Set(freelancer),
        budget: Set(500.0),
        deadline: Set(Some(Utc::now() + Duration::days(30))),
        status: Set(status),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert project")
}

pub async fn insert_template(
    db: &DatabaseConnection,
    service_type: TemplateServiceType,
    terms: &str,
) -> templates::Model {
    let now = Utc::now();
    templates::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_type: Set(service_type),
        terms: Set(terms.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert template")
}

pub fn job_input(service_type: ServiceType, budget: f64) -> CreateJob {
    CreateJob {
        service_type,
        pickup_location: "Mbabane Bus Rank".into(),
        pickup_latitude: -26.3167,
        pickup_longitude: 31.1333,
        dropoff_location: "Manzini Market".into(),
        dropoff_latitude: -26.4833,
        dropoff_longitude: 31.3667,
        pickup_time: Utc::now() + Duration::hours(3),
        budget,
        description: None,
        is_urgent: false,
        vehicle_type_required: None,
    }
}

// ── Doubles ──

/// Records every event. Can be told to fail every emit.
#[derive(Default)]
pub struct RecordingEmitter {
    pub events: Mutex<Vec<NotificationEvent>>,
    pub cleared: Mutex<Vec<(Uuid, Uuid)>>,
    pub fail: bool,
}

impl RecordingEmitter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn of_kind(&self, kind: NotificationKind) -> Vec<NotificationEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }

    pub fn reset(&self) {
        self.events.lock().unwrap().clear();
    }
}

#[async_trait]
impl NotificationEmitter for RecordingEmitter {
    async fn emit(&self, event: NotificationEvent) -> Result<(), CoreError> {
        if self.fail {
            return Err(CoreError::External("notification sink down".into()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn clear_unread(&self, user_id: Uuid, room_id: Uuid) -> Result<(), CoreError> {
        self.cleared.lock().unwrap().push((user_id, room_id));
        Ok(())
    }
}

pub struct StaticLedger(pub bool);

#[async_trait]
impl LedgerService for StaticLedger {
    async fn check_balance(&self, _user_id: Uuid, _amount: f64) -> Result<bool, CoreError> {
        Ok(self.0)
    }
}

/// Returns a fixed route (or none) and counts lookups.
pub struct StaticRoutes {
    pub route: Option<Route>,
    pub calls: AtomicUsize,
}

impl StaticRoutes {
    pub fn km(distance_km: f64) -> Self {
        Self {
            route: Some(Route {
                distance_km,
                eta_minutes: 25,
                polyline: "abc~def".into(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn none() -> Self {
        Self {
            route: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteOracle for StaticRoutes {
    async fn get_route(&self, _origin: LatLng, _dest: LatLng) -> Result<Option<Route>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.route.clone())
    }
}

// ── Services ──

pub struct ChatHarness {
    pub db: DatabaseConnection,
    pub chat: ChatService,
    pub broadcaster: Arc<ChatBroadcaster>,
    pub emitter: Arc<RecordingEmitter>,
}

pub async fn chat_harness() -> ChatHarness {
    chat_harness_with(RecordingEmitter::default()).await
}

pub async fn chat_harness_with(emitter: RecordingEmitter) -> ChatHarness {
    let db = setup_db().await;
    let broadcaster = Arc::new(ChatBroadcaster::new());
    let emitter = Arc::new(emitter);
    let chat = ChatService::new(db.clone(), broadcaster.clone(), emitter.clone());
    ChatHarness {
        db,
        chat,
        broadcaster,
        emitter,
    }
}

pub struct TransportHarness {
    pub db: DatabaseConnection,
    pub engine: BidEngine,
    pub emitter: Arc<RecordingEmitter>,
    pub routes: Arc<StaticRoutes>,
}

pub async fn transport_harness(funded: bool, routes: StaticRoutes) -> TransportHarness {
    let db = setup_db().await;
    let emitter = Arc::new(RecordingEmitter::default());
    let routes = Arc::new(routes);
    let engine = BidEngine::new(
        db.clone(),
        emitter.clone(),
        Arc::new(DbProviderDirectory::new(db.clone())),
        Arc::new(StaticLedger(funded)),
        routes.clone(),
    );
    TransportHarness {
        db,
        engine,
        emitter,
        routes,
    }
}
