//! # Slotbook App
//!
//! HTTP server wiring for the Slotbook booking engine: configuration,
//! application state, routes, metrics and startup retry.
//!
//! The `server` binary connects to `PostgreSQL`, runs migrations and serves
//! the API. Tests build the same router over the in-memory backends:
//!
//! ```ignore
//! let state = AppState::new(ledger, directory, Arc::new(SystemClock));
//! let app = build_router(state);
//! ```

pub mod api;
pub mod config;
pub mod metrics;
pub mod retry;
pub mod server;

pub use config::Config;
pub use server::{AppState, build_router};
