use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{blocking::Client, redirect::Policy};
use tracing::debug;

use super::{parse_pulse_time, PulseRef, PulseResponse};

/// Blocking client for a NIST-style randomness beacon (`{base}/{unix_millis}`).
pub struct BeaconClient {
    base_url: String,
    client: Client,
}

impl BeaconClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("drawmap/", env!("CARGO_PKG_VERSION")))
            .redirect(Policy::limited(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("[beacon] Failed to build HTTP client")?;
        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), client })
    }

    /// URL of the pulse for `date`.
    pub fn pulse_url(&self, date: &str) -> Result<String> {
        let at = parse_pulse_time(date)?;
        Ok(format!("{}/{}", self.base_url, at.timestamp_millis()))
    }

    /// Fetch the pulse emitted at `date`.
    pub fn pulse(&self, date: &str) -> Result<PulseRef> {
        let url = self.pulse_url(date)?;
        debug!(%url, "fetching beacon pulse");

        let resp: PulseResponse = self.client.get(&url).send()
            .with_context(|| format!("[beacon] GET {url}"))?
            .error_for_status()
            .with_context(|| format!("[beacon] GET {url} returned error status"))?
            .json()
            .with_context(|| format!("[beacon] Unexpected pulse body from {url}"))?;
        Ok(resp.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_pulse_url() {
        let client = BeaconClient::new("https://beacon.example/pulse/time/").unwrap();
        assert_eq!(
            client.pulse_url("2021-06-20T16:00:00Z").unwrap(),
            "https://beacon.example/pulse/time/1624204800000",
        );
        assert!(client.pulse_url("garbage").is_err());
    }
}
