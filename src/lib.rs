//! Rentify: property management for landlords and tenants.
//!
//! Flat entity collections (users, properties, units, assignments, payments,
//! maintenance requests, vacate notices) kept in memory and mirrored to a
//! Sled key-value store, one key per collection. Rent status is derived from
//! the unit's due day, its grace period and today's date.

pub mod access;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod demo;
pub mod error;
pub mod models;
pub mod rent;
// REST API module: Axum HTTP handlers on port 11111
pub mod rest;
pub mod storage;
pub mod store;
pub mod telemetry;
