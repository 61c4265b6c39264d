//! BDD step definitions for the pressure-watcher service

pub mod dashboard_steps;
pub mod subscription_steps;
pub mod upload_steps;
