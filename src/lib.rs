//! Carte engine - geospatial offer map for ProxiSanté
//!
//! Turns the flat list of active job offers into one marker per healthcare
//! structure, keeps the map camera inside its limits, and tracks hover and
//! selection consistently across the map and the list panel.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{aggregate, Aggregation, GroupOrder, MapEngine, MapEvent, SelectionPhase};
pub use models::{CameraCommand, CameraView, Location, LocationGroup, OfferRecord, Posting};
pub use services::{OfferStore, StaticOfferStore, SupabaseStore};
