use serde::{Deserialize, Serialize};
use crate::models::domain::{Category, ServiceType};

/// Youngest age any listing may be shown for
pub const MIN_LISTING_AGE: u8 = 18;

/// Query parameter carrying the category
pub const CATEGORY_PARAM: &str = "userType";
/// Query parameter carrying the specific service
pub const SPECIFIC_SERVICE_PARAM: &str = "specificService";

/// Values the UI uses to mean "no constraint"
const SENTINELS: &[&str] = &["", "all", "null", "undefined"];

/// Normalize a raw filter value, mapping every "no constraint" marker to `None`
pub fn constraint(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if SENTINELS.iter().any(|s| value.eq_ignore_ascii_case(s)) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Requested age range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    #[serde(default = "default_min_age")]
    pub min: u8,
    #[serde(default)]
    pub max: Option<u8>,
}

fn default_min_age() -> u8 { MIN_LISTING_AGE }

impl Default for AgeRange {
    fn default() -> Self {
        Self {
            min: MIN_LISTING_AGE,
            max: None,
        }
    }
}

impl AgeRange {
    /// Clamped bounds: min is at least 18, max (when set) is at least min
    pub fn effective(&self) -> (u8, Option<u8>) {
        let min = self.min.max(MIN_LISTING_AGE);
        let max = self.max.map(|max| max.max(min));
        (min, max)
    }

    pub fn contains(&self, age: u8) -> bool {
        let (min, max) = self.effective();
        age >= min && max.map_or(true, |max| age <= max)
    }

    pub fn is_default(&self) -> bool {
        self.min <= MIN_LISTING_AGE && self.max.is_none()
    }
}

/// Filter criteria; `None` means no constraint on that field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(rename = "userType")]
    pub category: Option<Category>,
    pub gender: Option<String>,
    pub body_type: Option<String>,
    pub breast_size: Option<String>,
    pub serves_who: Option<String>,
    pub sexual_orientation: Option<String>,
    pub ethnicity: Option<String>,
    pub service_type: Option<ServiceType>,
    pub specific_service: Option<String>,
    pub county: Option<String>,
    #[serde(default)]
    pub age_range: AgeRange,
}

impl FilterCriteria {
    pub fn with_category(self, category: Category) -> Self {
        Self {
            category: Some(category),
            ..self
        }
    }

    pub fn with_specific_service(self, service: &str) -> Self {
        Self {
            specific_service: constraint(Some(service)),
            ..self
        }
    }

    pub fn with_county(self, county: &str) -> Self {
        Self {
            county: constraint(Some(county)),
            ..self
        }
    }

    pub fn with_age_range(self, min: u8, max: Option<u8>) -> Self {
        Self {
            age_range: AgeRange { min, max },
            ..self
        }
    }

    /// Re-run sentinel normalization over every string member
    pub fn normalized(self) -> Self {
        let norm = |v: Option<String>| constraint(v.as_deref());
        Self {
            category: self.category,
            gender: norm(self.gender),
            body_type: norm(self.body_type),
            breast_size: norm(self.breast_size),
            serves_who: norm(self.serves_who),
            sexual_orientation: norm(self.sexual_orientation),
            ethnicity: norm(self.ethnicity),
            service_type: self.service_type,
            specific_service: norm(self.specific_service),
            county: norm(self.county),
            age_range: self.age_range,
        }
    }

    /// True when any field differs from its default or an age bound is set
    pub fn has_active_filters(&self) -> bool {
        self.category.is_some()
            || self.gender.is_some()
            || self.body_type.is_some()
            || self.breast_size.is_some()
            || self.serves_who.is_some()
            || self.sexual_orientation.is_some()
            || self.ethnicity.is_some()
            || self.service_type.is_some()
            || self.specific_service.is_some()
            || self.county.is_some()
            || !self.age_range.is_default()
    }

    /// Encode the URL-shareable subset (category and specific service)
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(category) = self.category {
            pairs.push(format!("{}={}", CATEGORY_PARAM, urlencoding::encode(category.as_str())));
        }
        if let Some(service) = &self.specific_service {
            pairs.push(format!("{}={}", SPECIFIC_SERVICE_PARAM, urlencoding::encode(service)));
        }
        pairs.join("&")
    }

    /// Rebuild criteria from a query string; every other field stays at its default
    pub fn from_query_string(query: &str) -> Self {
        let mut criteria = Self::default();

        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = match pair.split_once('=') {
                Some(kv) => kv,
                None => continue,
            };
            let value = match urlencoding::decode(&value.replace('+', " ")) {
                Ok(v) => v.into_owned(),
                Err(e) => {
                    tracing::debug!("Ignoring undecodable query value for {}: {}", key, e);
                    continue;
                }
            };

            match key {
                CATEGORY_PARAM => {
                    criteria.category = constraint(Some(&value)).and_then(|v| match v.parse::<Category>() {
                        Ok(category) => Some(category),
                        Err(_) => {
                            tracing::debug!("Ignoring unknown {} in query: {}", CATEGORY_PARAM, v);
                            None
                        }
                    });
                }
                SPECIFIC_SERVICE_PARAM => {
                    criteria.specific_service = constraint(Some(&value));
                }
                _ => {}
            }
        }

        criteria
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_normalize_to_none() {
        assert_eq!(constraint(Some("all")), None);
        assert_eq!(constraint(Some("ALL")), None);
        assert_eq!(constraint(Some("undefined")), None);
        assert_eq!(constraint(Some("  ")), None);
        assert_eq!(constraint(None), None);
        assert_eq!(constraint(Some(" Curvy ")), Some("Curvy".to_string()));
    }

    #[test]
    fn test_age_range_clamping() {
        let range = AgeRange { min: 10, max: None };
        assert_eq!(range.effective(), (18, None));

        let inverted = AgeRange { min: 30, max: Some(25) };
        assert_eq!(inverted.effective(), (30, Some(30)));
        assert!(inverted.contains(30));
        assert!(!inverted.contains(29));

        assert!(AgeRange::default().contains(99));
        assert!(!AgeRange::default().contains(17));
    }

    #[test]
    fn test_default_has_no_active_filters() {
        assert!(!FilterCriteria::default().has_active_filters());
        assert!(!FilterCriteria::default().with_age_range(12, None).has_active_filters());
    }

    #[test]
    fn test_active_filter_detection() {
        assert!(FilterCriteria::default().with_specific_service("massage").has_active_filters());
        assert!(FilterCriteria::default().with_age_range(18, Some(30)).has_active_filters());
        assert!(FilterCriteria::default().with_county("Mombasa").has_active_filters());
        assert!(!FilterCriteria::default().with_county("all").has_active_filters());
    }

    #[test]
    fn test_query_round_trip_keeps_whitelist_only() {
        let criteria = FilterCriteria {
            gender: Some("female".to_string()),
            county: Some("Nairobi".to_string()),
            ..FilterCriteria::default()
        }
        .with_category(Category::Escort)
        .with_specific_service("deep tissue");

        let query = criteria.to_query_string();
        assert_eq!(query, "userType=escort&specificService=deep%20tissue");

        let parsed = FilterCriteria::from_query_string(&query);
        assert_eq!(
            parsed,
            FilterCriteria::default()
                .with_category(Category::Escort)
                .with_specific_service("deep tissue")
        );
    }

    #[test]
    fn test_query_parsing_ignores_sentinels_and_junk() {
        let parsed = FilterCriteria::from_query_string("?userType=all&specificService=&gender=male&x");
        assert_eq!(parsed, FilterCriteria::default());
    }

    #[test]
    fn test_unknown_category_is_dropped() {
        let parsed = FilterCriteria::from_query_string("userType=agency&specificService=oil");
        assert_eq!(parsed.category, None);
        assert_eq!(parsed.specific_service.as_deref(), Some("oil"));
    }
}
