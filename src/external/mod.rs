//! Collaborators the core calls out to, each behind a trait so tests can
//! swap in doubles.

pub mod ledger;
pub mod notify;
pub mod providers;
pub mod routing;

pub use ledger::{DbLedger, LedgerService};
pub use notify::{DbNotificationEmitter, EntityRef, NotificationEmitter, NotificationEvent};
pub use providers::{DbProviderDirectory, ProviderDirectory, ProviderProfile, VehicleSummary};
pub use routing::{GoogleRouteOracle, LatLng, Route, RouteOracle};
