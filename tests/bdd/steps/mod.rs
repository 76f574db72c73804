//! BDD step definitions for the rdvmonitor service

pub mod check_steps;
pub mod lifecycle_steps;
pub mod notification_steps;
