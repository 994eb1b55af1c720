// Service exports
pub mod cache;
pub mod coordinator;
pub mod source;
pub mod store;

pub use cache::{CacheManager, CacheKey, CacheError};
pub use coordinator::{FilterPhase, ListingView, ViewStateCoordinator};
pub use source::{ProfileSource, RestProfileSource, SourceError};
pub use store::{refresh, ProfileStore, SharedStore, StoreSnapshot, StoreStatus, DEFAULT_STALE_AFTER_SECS};
