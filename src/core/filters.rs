use crate::models::{FilterCriteria, Profile, MIN_LISTING_AGE};

/// Case-insensitive equality of an optional profile field against an optional constraint
#[inline]
fn matches_text(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual.map_or(false, |actual| actual.eq_ignore_ascii_case(wanted)),
    }
}

/// Category and demographic attributes
#[inline]
pub fn matches_demographics(profile: &Profile, criteria: &FilterCriteria) -> bool {
    if let Some(category) = criteria.category {
        if profile.category != category {
            return false;
        }
    }

    matches_text(criteria.gender.as_deref(), profile.gender.as_deref())
        && matches_text(criteria.body_type.as_deref(), profile.body_type.as_deref())
        && matches_text(criteria.breast_size.as_deref(), profile.breast_size.as_deref())
        && matches_text(criteria.serves_who.as_deref(), profile.serves_who.as_deref())
        && matches_text(
            criteria.sexual_orientation.as_deref(),
            profile.sexual_orientation.as_deref(),
        )
        && matches_text(criteria.ethnicity.as_deref(), profile.ethnicity.as_deref())
}

/// Age range check. Spas are exempt; other profiles need a known age of at least 18.
#[inline]
pub fn matches_age(profile: &Profile, criteria: &FilterCriteria) -> bool {
    if profile.is_spa() {
        return true;
    }

    match profile.age {
        Some(age) if age >= MIN_LISTING_AGE => criteria.age_range.contains(age),
        _ => false,
    }
}

/// Service type and specific service, applied to every category
#[inline]
pub fn matches_services(profile: &Profile, criteria: &FilterCriteria) -> bool {
    if let Some(service_type) = criteria.service_type {
        if profile.service_type != Some(service_type) {
            return false;
        }
    }

    if let Some(wanted) = &criteria.specific_service {
        let wanted = wanted.to_lowercase();
        if !profile
            .services
            .iter()
            .any(|s| s.name.to_lowercase().contains(&wanted))
        {
            return false;
        }
    }

    true
}

#[inline]
pub fn matches_county(profile: &Profile, criteria: &FilterCriteria) -> bool {
    matches_text(criteria.county.as_deref(), profile.location.county.as_deref())
}

/// All criteria combined with logical AND
#[inline]
pub fn matches_criteria(profile: &Profile, criteria: &FilterCriteria) -> bool {
    matches_demographics(profile, criteria)
        && matches_age(profile, criteria)
        && matches_services(profile, criteria)
        && matches_county(profile, criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Location, Service, ServiceType};

    fn create_test_profile(category: Category, age: Option<u8>) -> Profile {
        Profile {
            id: "test_profile".to_string(),
            category,
            username: None,
            gender: Some("Female".to_string()),
            age,
            body_type: Some("Curvy".to_string()),
            breast_size: None,
            ethnicity: Some("African".to_string()),
            sexual_orientation: None,
            serves_who: Some("Men".to_string()),
            service_type: Some(ServiceType::Incall),
            services: vec![Service {
                name: "Deep Tissue Massage".to_string(),
                price: Some(3000.0),
                price_unit: Some("hour".to_string()),
                negotiable: true,
            }],
            location: Location {
                country: Some("Kenya".to_string()),
                county: Some("Nairobi".to_string()),
                location: Some("Westlands".to_string()),
                area: vec!["Parklands".to_string(), "Sarit".to_string()],
            },
            current_package: None,
            phone: None,
            whatsapp: false,
        }
    }

    #[test]
    fn test_demographics_case_insensitive() {
        let profile = create_test_profile(Category::Escort, Some(25));
        let criteria = FilterCriteria {
            gender: Some("female".to_string()),
            body_type: Some("CURVY".to_string()),
            ..FilterCriteria::default()
        };

        assert!(matches_demographics(&profile, &criteria));
    }

    #[test]
    fn test_demographics_missing_field_fails_when_set() {
        let profile = create_test_profile(Category::Escort, Some(25));
        let criteria = FilterCriteria {
            breast_size: Some("large".to_string()),
            ..FilterCriteria::default()
        };

        assert!(!matches_demographics(&profile, &criteria));
    }

    #[test]
    fn test_category_mismatch() {
        let profile = create_test_profile(Category::Masseuse, Some(25));
        let criteria = FilterCriteria::default().with_category(Category::Escort);

        assert!(!matches_criteria(&profile, &criteria));
    }

    #[test]
    fn test_age_rules() {
        let criteria = FilterCriteria::default();

        assert!(matches_age(&create_test_profile(Category::Escort, Some(18)), &criteria));
        assert!(!matches_age(&create_test_profile(Category::Escort, Some(17)), &criteria));
        assert!(!matches_age(&create_test_profile(Category::Escort, None), &criteria));
        assert!(matches_age(&create_test_profile(Category::Spa, None), &criteria));
        assert!(matches_age(&create_test_profile(Category::Spa, Some(5)), &criteria));

        let narrow = FilterCriteria::default().with_age_range(20, Some(24));
        assert!(!matches_age(&create_test_profile(Category::Escort, Some(25)), &narrow));
        assert!(matches_age(&create_test_profile(Category::Escort, Some(24)), &narrow));
    }

    #[test]
    fn test_specific_service_substring() {
        let profile = create_test_profile(Category::Spa, None);

        let hit = FilterCriteria::default().with_specific_service("tissue");
        assert!(matches_services(&profile, &hit));

        let miss = FilterCriteria::default().with_specific_service("sauna");
        assert!(!matches_services(&profile, &miss));
    }

    #[test]
    fn test_service_type_applies_to_spa() {
        let profile = create_test_profile(Category::Spa, None);
        let criteria = FilterCriteria {
            service_type: Some(ServiceType::Outcall),
            ..FilterCriteria::default()
        };

        assert!(!matches_criteria(&profile, &criteria));
    }

    #[test]
    fn test_county() {
        let profile = create_test_profile(Category::Escort, Some(30));

        assert!(matches_county(&profile, &FilterCriteria::default().with_county("nairobi")));
        assert!(!matches_county(&profile, &FilterCriteria::default().with_county("Kisumu")));
    }
}
