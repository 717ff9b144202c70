//! Instruction document compilation.
//!
//! [`compile_instructions`] is pure: it reads only its arguments and always
//! produces the same text for the same input. Missing optional fields fall
//! back to fixed text instead of failing.

use crate::sections::VoiceContextSection;
use concierge_types::{Guest, LanguagePreference, SessionSettings, WeatherSnapshot};

/// Minimum length of a service request summary accepted by the tool backend.
pub const MIN_REQUEST_SUMMARY_CHARS: usize = 12;

/// Tool that files a new service request.
pub const CREATE_REQUEST_TOOL: &str = "create_service_request";

/// Tool that retrieves the status of existing requests.
pub const QUERY_REQUESTS_TOOL: &str = "get_service_requests";

/// Weather line emitted when no weather snapshot is available.
pub const WEATHER_UNAVAILABLE_LINE: &str =
    "Weather data is unavailable; do not reference weather conditions.";

const UNKNOWN: &str = "Unknown";

const ROLE_STATEMENT: &str = "You are the voice concierge of this property. You speak with \
guests in real time, help them with anything they need during their stay, and keep every \
reply natural to hear rather than to read.";

const SAFETY_BLOCK: &[&str] = &[
    "Never read out payment details, passwords, access codes, or another guest's information.",
    "Only discuss the guest's own stay and requests.",
    "Do not give medical, legal, or financial advice; offer to connect the guest with staff instead.",
];

const ESCALATION_BLOCK: &[&str] = &[
    "If the guest reports an emergency, tell them to contact emergency services and file an urgent request immediately.",
    "If the guest asks for a person, or is upset after two attempts to help, offer to have the front desk call them back.",
    "If a tool call fails, apologise once, explain that staff will follow up, and do not retry more than once.",
];

const RESPONSE_STYLE_BLOCK: &[&str] = &[
    "Keep replies to one to three short sentences.",
    "Confirm the details of a request back to the guest before filing it.",
    "Use the guest's name sparingly and never invent facts that are not in this document.",
];

/// Compiles the instruction document sent to the remote agent.
///
/// The document has a fixed layout: role statement, guest snapshot, enabled
/// context sections, environment (weather and language policy), tools
/// guidance, safety, escalation, and response style.
pub fn compile_instructions(
    guest: Option<&Guest>,
    weather: Option<&WeatherSnapshot>,
    sections: &[VoiceContextSection],
    settings: &SessionSettings,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(ROLE_STATEMENT.to_string());
    lines.push(String::new());

    lines.push("Guest snapshot:".to_string());
    lines.extend(guest_snapshot(guest, settings));
    lines.push(String::new());

    lines.push("Context:".to_string());
    let context = context_lines(sections);
    if context.is_empty() {
        lines.push("None provided.".to_string());
    } else {
        lines.extend(context);
    }
    lines.push(String::new());

    lines.push("Environment:".to_string());
    lines.push(format!("- {}", weather_line(weather)));
    lines.push(format!("- Language: {}", language_line(settings)));
    lines.push(String::new());

    lines.push("Tools:".to_string());
    lines.push(format!(
        "- {CREATE_REQUEST_TOOL}: file a new request for housekeeping, maintenance, dining, transport, or wellness on the guest's behalf."
    ));
    lines.push(format!(
        "- {QUERY_REQUESTS_TOOL}: retrieve the status of the guest's existing requests."
    ));
    lines.push(format!(
        "- Request summaries must be at least {MIN_REQUEST_SUMMARY_CHARS} characters; if the guest's description is shorter, ask for more detail before calling {CREATE_REQUEST_TOOL}."
    ));
    lines.push(String::new());

    push_block(&mut lines, "Safety and privacy:", SAFETY_BLOCK);
    lines.push(String::new());
    push_block(&mut lines, "Escalation:", ESCALATION_BLOCK);
    lines.push(String::new());
    push_block(&mut lines, "Response style:", RESPONSE_STYLE_BLOCK);

    lines.join("\n")
}

fn push_block(lines: &mut Vec<String>, heading: &str, items: &[&str]) {
    lines.push(heading.to_string());
    lines.extend(items.iter().map(|item| format!("- {item}")));
}

fn guest_snapshot(guest: Option<&Guest>, settings: &SessionSettings) -> Vec<String> {
    let name = guest.map_or("Unknown guest", |g| g.name.as_str());
    let occupation = guest
        .and_then(|g| g.occupation.as_deref())
        .unwrap_or(UNKNOWN);
    let room = guest.and_then(Guest::room_number).unwrap_or(UNKNOWN);
    let tier = guest
        .and_then(|g| g.membership_tier.as_deref())
        .unwrap_or(UNKNOWN);
    let points = guest
        .and_then(|g| g.loyalty_points)
        .map_or_else(|| UNKNOWN.to_string(), |p| p.to_string());
    let notes = settings.operator_notes.trim();
    let notes = if notes.is_empty() { "None" } else { notes };

    vec![
        format!("- Name: {name}"),
        format!("- Occupation: {occupation}"),
        format!("- Room: {room}"),
        format!("- Membership tier: {tier}"),
        format!("- Loyalty points: {points}"),
        format!("- Operator notes: {notes}"),
    ]
}

fn context_lines(sections: &[VoiceContextSection]) -> Vec<String> {
    sections
        .iter()
        .filter(|section| section.enabled)
        .map(|section| {
            // Map<String, Value> serialization cannot fail.
            let data = serde_json::to_string(&section.payload).unwrap_or_default();
            format!(
                "- {}: {}. Data: {}",
                section.title, section.description, data
            )
        })
        .collect()
}

fn weather_line(weather: Option<&WeatherSnapshot>) -> String {
    let Some(weather) = weather else {
        return WEATHER_UNAVAILABLE_LINE.to_string();
    };

    let mut line = format!(
        "Weather in {}: {}, {}°C",
        weather.location,
        weather.condition,
        format_number(weather.temperature_c)
    );
    if let Some(feels_like) = weather.feels_like_c {
        line.push_str(&format!(" (feels like {}°C)", format_number(feels_like)));
    }
    if let Some(humidity) = weather.humidity_pct {
        line.push_str(&format!(", humidity {}%", format_number(humidity)));
    }
    if let Some(wind) = weather.wind_kph {
        line.push_str(&format!(", wind {} km/h", format_number(wind)));
    }
    line.push('.');
    line
}

fn language_line(settings: &SessionSettings) -> String {
    match &settings.preferred_language {
        LanguagePreference::Auto => {
            "detect and respond in the guest's spoken language.".to_string()
        }
        LanguagePreference::Code(code) => format!(
            "respond strictly in `{}` unless the guest switches.",
            code.to_uppercase()
        ),
        LanguagePreference::Custom => format!(
            "respond using ISO code `{}`.",
            settings.custom_language_code_or_default()
        ),
    }
}

/// Renders whole numbers without a fractional part and everything else
/// with one decimal.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
