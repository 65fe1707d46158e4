//! gestor-service: back office for a small business.
//!
//! Customers, product catalog with variants, quotes, sales, receivables,
//! payables, manual transactions and a dashboard, served as a JSON API.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
