//! Database query modules (runtime sqlx over SQLite)

pub mod audit;
pub mod businesses;
pub mod customers;
pub mod holidays;
pub mod invoices;
