// Core algorithm exports
pub mod clock;
pub mod engine;
pub mod filters;
pub mod presentation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{partition, FilterEngine};
pub use filters::{matches_criteria, matches_demographics, matches_age, matches_services, matches_county};
pub use presentation::{bucket_by_tier, order_for_display, shuffle_profiles, tier_rank, TierBuckets};
