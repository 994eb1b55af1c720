// Model exports
pub mod criteria;
pub mod domain;
pub mod requests;
pub mod responses;

pub use criteria::{AgeRange, FilterCriteria, MIN_LISTING_AGE};
pub use domain::{Category, Location, Package, PackageStatus, PackageTier, Profile, Service, ServiceType};
pub use requests::ListingsQuery;
pub use responses::{FilteredResult, ListingsResponse, RefreshResponse, HealthResponse, ErrorResponse};
