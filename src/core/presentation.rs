use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::models::{PackageTier, Profile};

/// Display weight of a profile's package: elite 3, premium 2, basic 1, none 0
///
/// Cancelled and expired packages rank as none.
#[inline]
pub fn tier_rank(profile: &Profile, now: DateTime<Utc>) -> u8 {
    match profile.active_tier(now) {
        Some(PackageTier::Elite) => 3,
        Some(PackageTier::Premium) => 2,
        Some(PackageTier::Basic) => 1,
        None => 0,
    }
}

/// Uniform Fisher-Yates shuffle
pub fn shuffle_profiles<R: Rng + ?Sized>(profiles: &mut [Profile], rng: &mut R) {
    profiles.shuffle(rng);
}

/// Order a result sequence for display
///
/// With no active filters the sequence is shuffled to spread visibility.
/// Otherwise it is stably sorted by package tier, so repeated renders of the
/// same filtered result come out identical.
pub fn order_for_display<R: Rng + ?Sized>(
    mut profiles: Vec<Profile>,
    has_active_filters: bool,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Profile> {
    if has_active_filters {
        profiles.sort_by_key(|p| std::cmp::Reverse(tier_rank(p, now)));
    } else {
        shuffle_profiles(&mut profiles, rng);
    }
    profiles
}

/// Profiles grouped by active package tier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierBuckets {
    pub elite: Vec<Profile>,
    pub premium: Vec<Profile>,
    pub basic: Vec<Profile>,
    pub regular: Vec<Profile>,
}

pub fn bucket_by_tier(profiles: &[Profile], now: DateTime<Utc>) -> TierBuckets {
    let mut buckets = TierBuckets::default();

    for profile in profiles {
        let bucket = match profile.active_tier(now) {
            Some(PackageTier::Elite) => &mut buckets.elite,
            Some(PackageTier::Premium) => &mut buckets.premium,
            Some(PackageTier::Basic) => &mut buckets.basic,
            None => &mut buckets.regular,
        };
        bucket.push(profile.clone());
    }

    buckets
}
