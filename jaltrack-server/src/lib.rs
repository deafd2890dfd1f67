//! jaltrack-server — billing backend for water-jug delivery businesses
//!
//! Multi-tenant service that:
//! - Reconciles delivery calendars against supplier and client holidays
//! - Generates one invoice per customer per billing period, idempotently
//! - Preserves manual discounts and extra charges across regeneration
//! - Exposes a JWT-authenticated admin API with an audit trail

pub mod api;
pub mod auth;
pub mod billing;
pub mod config;
pub mod db;
pub mod state;
