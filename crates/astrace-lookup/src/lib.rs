//! Autonomous-system and geolocation lookups for traced hops.

pub mod client;
pub mod enrich;
pub mod error;

pub use client::{IpInfoClient, LookupService, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use enrich::enrich;
pub use error::LookupError;
