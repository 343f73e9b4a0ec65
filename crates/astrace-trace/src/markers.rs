use anyhow::{anyhow, Result};
use encoding_rs::Encoding;
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    InvalidDestination,
    TracingStarted,
    MaxHops,
    HostUnreachable,
    TraceComplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub invalid_destination: String,
    pub tracing_started: String,
    pub max_hops: String,
    pub host_unreachable: String,
    pub trace_complete: String,
    pub completion_notice: String,
}

impl Markers {
    pub fn russian() -> Self {
        Self {
            invalid_destination: "Не удается разрешить системное имя узла".to_string(),
            tracing_started: "Трассировка маршрута".to_string(),
            max_hops: "с максимальным числом прыжков".to_string(),
            host_unreachable: "Заданный узел недоступен.".to_string(),
            trace_complete: "Трассировка завершена".to_string(),
            completion_notice: "Трассировка завершена.".to_string(),
        }
    }

    pub fn english() -> Self {
        Self {
            invalid_destination: "Unable to resolve target system name".to_string(),
            tracing_started: "Tracing route to".to_string(),
            max_hops: "over a maximum of".to_string(),
            host_unreachable: "Destination host unreachable".to_string(),
            trace_complete: "Trace complete".to_string(),
            completion_notice: "Trace complete.".to_string(),
        }
    }

    pub fn literal(&self, kind: MarkerKind) -> &str {
        match kind {
            MarkerKind::InvalidDestination => &self.invalid_destination,
            MarkerKind::TracingStarted => &self.tracing_started,
            MarkerKind::MaxHops => &self.max_hops,
            MarkerKind::HostUnreachable => &self.host_unreachable,
            MarkerKind::TraceComplete => &self.trace_complete,
        }
    }

    pub fn contains(&self, kind: MarkerKind, line: &str) -> bool {
        let marker = self.literal(kind);
        !marker.is_empty() && line.contains(marker)
    }

    // Longest marker first so one embedded in another cannot shadow it.
    pub fn first_match(&self, line: &str, kinds: &[MarkerKind]) -> Option<MarkerKind> {
        let mut ordered = kinds.to_vec();
        ordered.sort_by_key(|kind| Reverse(self.literal(*kind).chars().count()));
        ordered
            .into_iter()
            .find(|kind| self.contains(*kind, line))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub name: String,
    pub markers: Markers,
    pub codepage: String,
}

impl Locale {
    pub fn russian() -> Self {
        Self {
            name: "ru".to_string(),
            markers: Markers::russian(),
            codepage: "ibm866".to_string(),
        }
    }

    pub fn english() -> Self {
        Self {
            name: "en".to_string(),
            markers: Markers::english(),
            codepage: "windows-1252".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ru" => Some(Self::russian()),
            "en" => Some(Self::english()),
            _ => None,
        }
    }

    pub fn with_codepage(mut self, label: &str) -> Self {
        self.codepage = label.to_string();
        self
    }

    pub fn encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.codepage.trim().as_bytes())
            .ok_or_else(|| anyhow!("unknown codepage: {}", self.codepage))
    }
}
