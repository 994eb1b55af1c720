use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Listing category ("user type")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Escort,
    Masseuse,
    OfModel,
    Spa,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Escort => "escort",
            Category::Masseuse => "masseuse",
            Category::OfModel => "of-model",
            Category::Spa => "spa",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "escort" => Ok(Category::Escort),
            "masseuse" => Ok(Category::Masseuse),
            "of-model" | "ofmodel" | "of_model" => Ok(Category::OfModel),
            "spa" => Ok(Category::Spa),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Where a provider sees clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Incall,
    Outcall,
    Both,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Incall => "incall",
            ServiceType::Outcall => "outcall",
            ServiceType::Both => "both",
        }
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "incall" => Ok(ServiceType::Incall),
            "outcall" => Ok(ServiceType::Outcall),
            "both" => Ok(ServiceType::Both),
            other => Err(format!("unknown service type: {}", other)),
        }
    }
}

// Backend data is not consistent about casing ("Incall", "incall")
impl<'de> Deserialize<'de> for ServiceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A named service offered by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(rename = "priceUnit", default)]
    pub price_unit: Option<String>,
    #[serde(default)]
    pub negotiable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub area: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageTier {
    Basic,
    Premium,
    Elite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    Active,
    Cancelled,
    Expired,
}

/// Subscription package, used only for display bucketing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    #[serde(rename = "packageType")]
    pub tier: PackageTier,
    pub status: PackageStatus,
    #[serde(rename = "expiryDate", default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Package {
    /// Active status and not past its expiry date
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PackageStatus::Active && self.expires_at.map_or(true, |at| at > now)
    }
}

/// One listed provider or venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "userType")]
    pub category: Category,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(rename = "bodyType", default)]
    pub body_type: Option<String>,
    #[serde(rename = "breastSize", default)]
    pub breast_size: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(rename = "sexualOrientation", default)]
    pub sexual_orientation: Option<String>,
    #[serde(rename = "servesWho", default)]
    pub serves_who: Option<String>,
    #[serde(rename = "serviceType", default)]
    pub service_type: Option<ServiceType>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub location: Location,
    #[serde(rename = "currentPackage", default)]
    pub current_package: Option<Package>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: bool,
}

impl Profile {
    pub fn is_spa(&self) -> bool {
        self.category == Category::Spa
    }

    /// Tier of the package if it is currently active
    pub fn active_tier(&self, now: DateTime<Utc>) -> Option<PackageTier> {
        self.current_package
            .as_ref()
            .filter(|p| p.is_active_at(now))
            .map(|p| p.tier)
    }
}
