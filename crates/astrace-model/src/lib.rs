//! Shared data structures for astrace.

use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Started {
        destination: Option<String>,
        banner: String,
    },
    HopDiscovered {
        address: String,
    },
    MaxHopsReached,
    Unreachable {
        message: String,
    },
    Completed,
    InvalidDestination {
        message: String,
    },
    // Output ended before any terminal marker.
    Exhausted,
}

impl TraceEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TraceEvent::Unreachable { .. }
                | TraceEvent::Completed
                | TraceEvent::InvalidDestination { .. }
                | TraceEvent::Exhausted
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupResponse {
    pub ip: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub hostname: Option<String>,
    pub org: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopRecord {
    pub sequence: u32,
    pub address: String,
    pub autonomous_system: String,
    pub provider: String,
    pub country: String,
    pub city: String,
}

impl HopRecord {
    pub fn from_response(sequence: u32, response: &LookupResponse) -> Self {
        let (autonomous_system, provider) = split_org(present(&response.org));

        Self {
            sequence,
            address: or_unknown(&response.ip),
            autonomous_system,
            provider,
            country: or_unknown(&response.country),
            city: or_unknown(&response.city),
        }
    }

    // Lookup failed: only the traced address is known.
    pub fn degraded(sequence: u32, traced_address: &str) -> Self {
        Self {
            sequence,
            address: traced_address.to_string(),
            autonomous_system: UNKNOWN.to_string(),
            provider: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn or_unknown(value: &Option<String>) -> String {
    present(value).unwrap_or(UNKNOWN).to_string()
}

// "AS15169 Google LLC" -> ("AS15169", "Google LLC")
fn split_org(org: Option<&str>) -> (String, String) {
    let mut tokens = org.unwrap_or_default().split_whitespace();
    let autonomous_system = match tokens.next() {
        Some(token) => token.to_string(),
        None => return (UNKNOWN.to_string(), UNKNOWN.to_string()),
    };

    (autonomous_system, tokens.collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> LookupResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn org_splits_into_as_and_provider() {
        let body = response(
            r#"{"ip":"8.8.8.8","city":"Mountain View","country":"US","org":"AS1234 Example   Net"}"#,
        );
        let record = HopRecord::from_response(2, &body);

        assert_eq!(record.sequence, 2);
        assert_eq!(record.autonomous_system, "AS1234");
        assert_eq!(record.provider, "Example Net");
        assert_eq!(record.country, "US");
        assert_eq!(record.city, "Mountain View");
    }

    #[test]
    fn missing_fields_become_placeholders() {
        let body = response(r#"{"ip":"192.168.1.1","bogon":true}"#);
        let record = HopRecord::from_response(1, &body);

        assert_eq!(record.address, "192.168.1.1");
        assert_eq!(record.autonomous_system, UNKNOWN);
        assert_eq!(record.provider, UNKNOWN);
        assert_eq!(record.country, UNKNOWN);
        assert_eq!(record.city, UNKNOWN);
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let body = response(r#"{"ip":"","city":"","org":"   "}"#);
        let record = HopRecord::from_response(3, &body);

        assert_eq!(record.address, UNKNOWN);
        assert_eq!(record.city, UNKNOWN);
        assert_eq!(record.autonomous_system, UNKNOWN);
    }

    #[test]
    fn missing_ip_is_not_replaced_by_traced_address() {
        let record = HopRecord::from_response(1, &response("{}"));

        assert_eq!(record.address, UNKNOWN);
        assert_eq!(record.autonomous_system, UNKNOWN);
        assert_eq!(record.provider, UNKNOWN);
        assert_eq!(HopRecord::degraded(1, "10.0.0.1").address, "10.0.0.1");
    }

    #[test]
    fn org_without_provider_name() {
        let body = response(r#"{"org":"AS64500"}"#);
        let record = HopRecord::from_response(1, &body);

        assert_eq!(record.autonomous_system, "AS64500");
        assert_eq!(record.provider, "");
    }

    #[test]
    fn same_response_maps_identically() {
        let body = response(r#"{"ip":"1.1.1.1","country":"AU","org":"AS13335 Cloudflare, Inc."}"#);
        assert_eq!(
            HopRecord::from_response(4, &body),
            HopRecord::from_response(4, &body)
        );
    }

    #[test]
    fn terminal_events() {
        assert!(TraceEvent::Completed.is_terminal());
        assert!(TraceEvent::Exhausted.is_terminal());
        assert!(!TraceEvent::MaxHopsReached.is_terminal());
        assert!(!TraceEvent::HopDiscovered {
            address: "10.0.0.1".to_string()
        }
        .is_terminal());
    }
}
