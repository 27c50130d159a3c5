mod pulse;
#[cfg(feature = "beacon")]
mod client;

pub use pulse::{parse_pulse_time, PulseBody, PulseRef, PulseResponse};
#[cfg(feature = "beacon")]
pub use client::BeaconClient;

/// Pulse-by-time endpoint of the Universidad de Chile beacon.
pub const DEFAULT_BEACON_URL: &str = "https://random.uchile.cl/beacon/2.0/pulse/time";
