//! Entitlement Sync - Order-to-Entitlement Reconciliation
//!
//! This crate keeps course entries and membership records in line with the
//! lifecycle of commerce orders: paid orders grant access, free items unlock
//! at checkout, cancelled and refunded orders take it back.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod replay;
pub mod telemetry;
