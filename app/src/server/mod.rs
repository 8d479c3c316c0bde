//! HTTP server module.
//!
//! - Application state shared by handlers
//! - Database readiness probe
//! - Router configuration

pub mod health;
pub mod routes;
pub mod state;

pub use health::DatabaseProbe;
pub use routes::build_router;
pub use state::AppState;
