//! Context section derivation and the registry that owns the sections.

use concierge_types::{Guest, WeatherSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Ordered key → value payload of a section. Insertion order is preserved.
pub type SectionPayload = Map<String, Value>;

pub const VOICE_GUIDELINES_ID: &str = "voice-guidelines";
pub const GUEST_PROFILE_ID: &str = "guest-profile";
pub const ROOM_LOCATION_ID: &str = "room-location";
pub const WEATHER_ID: &str = "weather";
pub const SERVICE_CATALOG_ID: &str = "service-catalog";

/// A labeled bundle of structured data folded into the instruction document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceContextSection {
    pub id: String,
    pub title: String,
    pub description: String,
    pub enabled: bool,
    /// Required sections are always enabled.
    pub required: bool,
    pub payload: SectionPayload,
}

impl VoiceContextSection {
    fn new(
        id: &str,
        title: &str,
        description: &str,
        required: bool,
        payload: Value,
    ) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            enabled: true,
            required,
            payload,
        }
    }
}

/// Derives the default section list for the given inputs.
///
/// Order: voice guidelines, guest profile (when a guest is present), room
/// and location (when the guest has a stay), weather (when present),
/// service catalog. Every section starts enabled.
pub fn derive_sections(
    guest: Option<&Guest>,
    weather: Option<&WeatherSnapshot>,
) -> Vec<VoiceContextSection> {
    let mut sections = vec![voice_guidelines_section()];

    if let Some(guest) = guest {
        sections.push(guest_profile_section(guest));
        if guest.stay.is_some() {
            sections.push(room_location_section(guest));
        }
    }

    if let Some(weather) = weather {
        sections.push(weather_section(weather));
    }

    sections.push(service_catalog_section());
    sections
}

fn voice_guidelines_section() -> VoiceContextSection {
    VoiceContextSection::new(
        VOICE_GUIDELINES_ID,
        "Voice interaction guidelines",
        "How replies should sound when spoken aloud",
        true,
        json!({
            "tone": "warm, calm and professional",
            "maxSentencesPerTurn": 3,
            "confirmBeforeFilingRequests": true,
            "avoid": ["markdown", "lists read aloud", "URLs"],
        }),
    )
}

fn guest_profile_section(guest: &Guest) -> VoiceContextSection {
    let mut payload = Map::new();
    payload.insert("name".to_string(), json!(guest.name));
    if let Some(occupation) = &guest.occupation {
        payload.insert("occupation".to_string(), json!(occupation));
    }
    if let Some(tier) = &guest.membership_tier {
        payload.insert("membershipTier".to_string(), json!(tier));
    }
    if let Some(points) = guest.loyalty_points {
        payload.insert("loyaltyPoints".to_string(), json!(points));
    }
    if !guest.preferences.is_empty() {
        payload.insert("preferences".to_string(), json!(guest.preferences));
    }

    VoiceContextSection::new(
        GUEST_PROFILE_ID,
        "Guest profile",
        "Identity and loyalty details of the guest on the call",
        true,
        Value::Object(payload),
    )
}

fn room_location_section(guest: &Guest) -> VoiceContextSection {
    let mut payload = Map::new();
    if let Some(stay) = &guest.stay {
        payload.insert("roomNumber".to_string(), json!(stay.room_number));
        if let Some(property) = &stay.property {
            payload.insert("property".to_string(), json!(property));
        }
        if let Some(floor) = stay.floor {
            payload.insert("floor".to_string(), json!(floor));
        }
        if let Some(check_in) = &stay.check_in {
            payload.insert("checkIn".to_string(), json!(check_in));
        }
        if let Some(check_out) = &stay.check_out {
            payload.insert("checkOut".to_string(), json!(check_out));
        }
    }

    VoiceContextSection::new(
        ROOM_LOCATION_ID,
        "Room and location",
        "Where the guest is staying and for how long",
        false,
        Value::Object(payload),
    )
}

fn weather_section(weather: &WeatherSnapshot) -> VoiceContextSection {
    let mut payload = Map::new();
    payload.insert("location".to_string(), json!(weather.location));
    payload.insert("condition".to_string(), json!(weather.condition));
    payload.insert("temperatureC".to_string(), json!(weather.temperature_c));
    if let Some(feels_like) = weather.feels_like_c {
        payload.insert("feelsLikeC".to_string(), json!(feels_like));
    }
    if let Some(humidity) = weather.humidity_pct {
        payload.insert("humidityPct".to_string(), json!(humidity));
    }
    if let Some(wind) = weather.wind_kph {
        payload.insert("windKph".to_string(), json!(wind));
    }
    if let Some(observed_at) = &weather.observed_at {
        payload.insert("observedAt".to_string(), json!(observed_at));
    }

    VoiceContextSection::new(
        WEATHER_ID,
        "Live weather",
        "Current conditions at the property",
        false,
        Value::Object(payload),
    )
}

fn service_catalog_section() -> VoiceContextSection {
    VoiceContextSection::new(
        SERVICE_CATALOG_ID,
        "Service catalog",
        "Services the concierge can arrange on the guest's behalf",
        false,
        json!({
            "housekeeping": ["room refresh", "extra towels", "turndown service"],
            "maintenance": ["climate control", "lighting", "plumbing"],
            "dining": ["in-room dining", "restaurant reservations"],
            "transport": ["airport transfer", "taxi booking"],
            "wellness": ["spa appointments", "fitness center access"],
        }),
    )
}

/// Owns the derived context sections.
///
/// The owner calls [`ContextRegistry::rederive`] whenever the guest or the
/// weather input changes. Toggles made since the previous derivation are
/// discarded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextRegistry {
    sections: Vec<VoiceContextSection>,
}

impl ContextRegistry {
    /// Creates a registry with the default sections for the given inputs.
    pub fn derive(guest: Option<&Guest>, weather: Option<&WeatherSnapshot>) -> Self {
        Self {
            sections: derive_sections(guest, weather),
        }
    }

    /// Replaces every section with freshly derived defaults.
    pub fn rederive(&mut self, guest: Option<&Guest>, weather: Option<&WeatherSnapshot>) {
        self.sections = derive_sections(guest, weather);
        tracing::debug!(count = self.sections.len(), "re-derived context sections");
    }

    pub fn sections(&self) -> &[VoiceContextSection] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&VoiceContextSection> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Iterates over enabled sections in registry order.
    pub fn enabled_sections(&self) -> impl Iterator<Item = &VoiceContextSection> {
        self.sections.iter().filter(|section| section.enabled)
    }

    /// Flips `enabled` on a non-required section.
    ///
    /// Required sections and unknown ids are left untouched. Returns the
    /// section's `enabled` flag after the call, or `None` for an unknown id.
    pub fn toggle_section(&mut self, id: &str) -> Option<bool> {
        let section = self.sections.iter_mut().find(|section| section.id == id)?;
        if !section.required {
            section.enabled = !section.enabled;
        }
        Some(section.enabled)
    }

    /// Shallow-merges `partial` into the section's payload.
    ///
    /// Existing keys keep their position; new keys are appended. `enabled`
    /// is not touched. Returns `false` for an unknown id.
    pub fn update_payload(&mut self, id: &str, partial: SectionPayload) -> bool {
        let Some(section) = self.sections.iter_mut().find(|section| section.id == id) else {
            tracing::debug!(section = id, "payload update for unknown context section");
            return false;
        };
        for (key, value) in partial {
            section.payload.insert(key, value);
        }
        true
    }

    /// Sets `enabled` on every non-required section. Required sections stay
    /// enabled.
    pub fn set_all_enabled(&mut self, enabled: bool) {
        for section in &mut self.sections {
            section.enabled = section.required || enabled;
        }
    }
}
