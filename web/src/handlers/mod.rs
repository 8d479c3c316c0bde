//! HTTP handlers shared by every Slotbook server.

pub mod health;

pub use health::{ReadinessProbe, health_check, readiness};
