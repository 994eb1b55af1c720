//! Market Listings - profile listings core for the provider marketplace
//!
//! Holds the full profile collection fetched from the backend, filters and
//! partitions it for display, and keeps user-selected criteria in sync with
//! shareable URLs.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Clock, FilterEngine, ManualClock, SystemClock};
pub use models::{Category, FilterCriteria, FilteredResult, Profile};
pub use services::{CacheManager, ProfileSource, ProfileStore, RestProfileSource, ViewStateCoordinator};
