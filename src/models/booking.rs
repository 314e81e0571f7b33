use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::CupCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Men,
    Women,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "men",
            Gender::Women => "women",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "men" => Some(Gender::Men),
            "women" => Some(Gender::Women),
            _ => None,
        }
    }
}

/// A confirmed reservation. Insert-only: nothing in this service ever
/// updates or deletes a booking after it is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub gender: Gender,
    pub cup_category: CupCategory,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub zone: String,
    pub street: String,
    pub building_number: String,
    pub unit_number: Option<String>,
    pub google_maps_link: Option<String>,
    pub agreement_file_name: String,
    pub agreement_file_url: String,
    pub agreement_file_path: String,
    pub created_at: NaiveDateTime,
}

/// Contact fields collected by the booking form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub zone: String,
    pub street: String,
    pub building_number: String,
    pub unit_number: Option<String>,
    pub google_maps_link: Option<String>,
}

impl CustomerDetails {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("address", &self.address),
            ("zone", &self.zone),
            ("street", &self.street),
            ("building number", &self.building_number),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }

        if self.phone.len() < 7
            || !self
                .phone
                .chars()
                .all(|c| c.is_ascii_digit() || "+()-".contains(c))
        {
            return Err("invalid phone number".to_string());
        }

        if let Some(link) = self.google_maps_link.as_deref() {
            if !link.is_empty() && !link.starts_with("http://") && !link.starts_with("https://") {
                return Err("invalid maps link".to_string());
            }
        }

        Ok(())
    }
}
