pub mod authorization;
pub mod jwt;
pub mod middleware;

pub use middleware::{AuthenticatedUser, JwtSecret};
