//! Instruction context for Concierge voice sessions.
//!
//! Two pieces live here:
//!
//! - [`ContextRegistry`]: derives the labeled, toggleable context sections
//!   (guest profile, room, weather, voice guidelines, service catalog) from
//!   the current guest and weather inputs.
//! - [`compile_instructions`]: a pure function that folds the guest, weather,
//!   enabled sections and session settings into the instruction document
//!   handed to the remote voice agent at connect time.
//!
//! The registry is re-derived by its owner whenever the guest or weather
//! input changes. Re-deriving resets every toggle to its default.
//!
//! # Usage
//!
//! ```rust,ignore
//! use concierge_context::{compile_instructions, ContextRegistry};
//!
//! let mut registry = ContextRegistry::derive(Some(&guest), Some(&weather));
//! registry.toggle_section("service-catalog");
//!
//! let text = compile_instructions(
//!     Some(&guest),
//!     Some(&weather),
//!     registry.sections(),
//!     &settings,
//! );
//! ```

mod compiler;
mod sections;

pub use compiler::{
    compile_instructions, CREATE_REQUEST_TOOL, MIN_REQUEST_SUMMARY_CHARS, QUERY_REQUESTS_TOOL,
    WEATHER_UNAVAILABLE_LINE,
};
pub use sections::{
    derive_sections, ContextRegistry, SectionPayload, VoiceContextSection, GUEST_PROFILE_ID,
    ROOM_LOCATION_ID, SERVICE_CATALOG_ID, VOICE_GUIDELINES_ID, WEATHER_ID,
};
