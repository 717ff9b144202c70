//! Guest and environment inputs.
//!
//! These are the raw inputs the context registry derives sections from.
//! They are plain data: the voice console replaces them wholesale when the
//! dashboard reports a new guest or a weather refresh.

use serde::{Deserialize, Serialize};

/// A guest the voice agent is speaking with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    /// Stable guest identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Occupation, if the guest shared it.
    #[serde(default)]
    pub occupation: Option<String>,
    /// Loyalty programme tier (e.g. "Gold").
    #[serde(default)]
    pub membership_tier: Option<String>,
    /// Current loyalty point balance.
    #[serde(default)]
    pub loyalty_points: Option<u64>,
    /// Free-form preferences ("late checkout", "feather-free pillows").
    #[serde(default)]
    pub preferences: Vec<String>,
    /// Current stay, if the guest is checked in.
    #[serde(default)]
    pub stay: Option<StayInfo>,
}

impl Guest {
    /// Returns the room number of the current stay, if any.
    pub fn room_number(&self) -> Option<&str> {
        self.stay.as_ref().map(|stay| stay.room_number.as_str())
    }
}

/// Room and location details of a stay.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayInfo {
    pub room_number: String,
    #[serde(default)]
    pub property: Option<String>,
    #[serde(default)]
    pub floor: Option<i32>,
    /// ISO-8601 check-in date.
    #[serde(default)]
    pub check_in: Option<String>,
    /// ISO-8601 check-out date.
    #[serde(default)]
    pub check_out: Option<String>,
}

/// Current weather conditions at the property.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub location: String,
    /// Short description, e.g. "light rain".
    pub condition: String,
    pub temperature_c: f64,
    #[serde(default)]
    pub feels_like_c: Option<f64>,
    #[serde(default)]
    pub humidity_pct: Option<f64>,
    #[serde(default)]
    pub wind_kph: Option<f64>,
    /// ISO-8601 observation time reported by the weather provider.
    #[serde(default)]
    pub observed_at: Option<String>,
}
