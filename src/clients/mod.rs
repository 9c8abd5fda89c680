//! Clients - HTTP Clients for External APIs
//!
//! This module contains the data-access client for the fuel tracker backend.

pub mod fuel_tracker_client;

pub use fuel_tracker_client::{FuelDataSource, FuelTrackerClient};
