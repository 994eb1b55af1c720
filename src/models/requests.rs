use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::criteria::{constraint, AgeRange, FilterCriteria, MIN_LISTING_AGE};
use crate::models::domain::Category;

/// Query parameters accepted by the listings endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ListingsQuery {
    #[serde(rename = "userType")]
    pub user_type: Option<String>,
    #[validate(length(max = 100))]
    #[serde(rename = "specificService")]
    pub specific_service: Option<String>,
    #[validate(length(max = 100))]
    pub county: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "bodyType")]
    pub body_type: Option<String>,
    #[serde(rename = "breastSize")]
    pub breast_size: Option<String>,
    #[serde(rename = "servesWho")]
    pub serves_who: Option<String>,
    #[serde(rename = "sexualOrientation")]
    pub sexual_orientation: Option<String>,
    pub ethnicity: Option<String>,
    #[serde(rename = "serviceType")]
    pub service_type: Option<String>,
    #[validate(range(max = 120))]
    #[serde(rename = "minAge")]
    pub min_age: Option<u8>,
    #[validate(range(max = 120))]
    #[serde(rename = "maxAge")]
    pub max_age: Option<u8>,
    #[serde(rename = "groupByTier")]
    pub group_by_tier: Option<bool>,
}

impl ListingsQuery {
    /// A `userType` that is neither a sentinel nor a known category
    pub fn unknown_user_type(&self) -> Option<&str> {
        let value = self.user_type.as_deref()?;
        match constraint(Some(value)) {
            Some(category) if category.parse::<Category>().is_err() => Some(value),
            _ => None,
        }
    }

    /// Criteria for every non-URL field; category and specific service come from the URL
    pub fn extra_criteria(&self, base: FilterCriteria) -> FilterCriteria {
        FilterCriteria {
            gender: constraint(self.gender.as_deref()),
            body_type: constraint(self.body_type.as_deref()),
            breast_size: constraint(self.breast_size.as_deref()),
            serves_who: constraint(self.serves_who.as_deref()),
            sexual_orientation: constraint(self.sexual_orientation.as_deref()),
            ethnicity: constraint(self.ethnicity.as_deref()),
            service_type: constraint(self.service_type.as_deref()).and_then(|v| v.parse().ok()),
            age_range: AgeRange {
                min: self.min_age.unwrap_or(MIN_LISTING_AGE),
                max: self.max_age,
            },
            ..base
        }
    }
}
