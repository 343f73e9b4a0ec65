use crate::extract::extract_ipv4;
use crate::markers::{MarkerKind, Markers};
use crate::stream::LineSource;
use astrace_model::TraceEvent;
use std::collections::VecDeque;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Idle,
    Tracing,
    AwaitingMaxHops,
    CollectingHops,
    Terminated,
}

const START_MARKERS: [MarkerKind; 2] = [MarkerKind::InvalidDestination, MarkerKind::TracingStarted];
const TERMINAL_MARKERS: [MarkerKind; 2] = [MarkerKind::HostUnreachable, MarkerKind::TraceComplete];

pub struct TraceParser<S> {
    source: S,
    markers: Markers,
    state: ParseState,
    end_address: Option<String>,
    pending: VecDeque<TraceEvent>,
}

impl<S: LineSource> TraceParser<S> {
    pub fn new(source: S, markers: Markers) -> Self {
        Self {
            source,
            markers,
            state: ParseState::Idle,
            end_address: None,
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn end_address(&self) -> Option<&str> {
        self.end_address.as_deref()
    }

    fn feed(&mut self, line: &str) {
        match self.state {
            ParseState::Idle => self.feed_idle(line),
            ParseState::Tracing | ParseState::AwaitingMaxHops | ParseState::CollectingHops => {
                self.feed_active(line)
            }
            ParseState::Terminated => {}
        }
    }

    fn feed_idle(&mut self, line: &str) {
        match self.markers.first_match(line, &START_MARKERS) {
            Some(MarkerKind::InvalidDestination) => {
                self.terminate(TraceEvent::InvalidDestination {
                    message: line.to_string(),
                });
            }
            Some(_) => {
                self.end_address = extract_ipv4(line).map(str::to_string);
                self.state = ParseState::Tracing;
                self.pending.push_back(TraceEvent::Started {
                    destination: self.end_address.clone(),
                    banner: line.to_string(),
                });

                // Literal-address destinations get a one-line header.
                if self.markers.contains(MarkerKind::MaxHops, line) {
                    self.enter_collecting();
                }
            }
            None => debug!(line, "skipping line before trace header"),
        }
    }

    fn feed_active(&mut self, line: &str) {
        match self.markers.first_match(line, &TERMINAL_MARKERS) {
            Some(MarkerKind::HostUnreachable) => {
                let message = line.strip_prefix(' ').unwrap_or(line).to_string();
                return self.terminate(TraceEvent::Unreachable { message });
            }
            Some(_) => return self.terminate(TraceEvent::Completed),
            None => {}
        }

        if self.markers.contains(MarkerKind::MaxHops, line) {
            return self.enter_collecting();
        }

        if self.state == ParseState::Tracing {
            self.state = ParseState::AwaitingMaxHops;
        }

        let Some(address) = extract_ipv4(line) else {
            return;
        };
        if self.state != ParseState::CollectingHops {
            debug!(address, "address before max-hops header, skipping");
            return;
        }

        let reached_end = self.end_address.as_deref() == Some(address);
        self.pending.push_back(TraceEvent::HopDiscovered {
            address: address.to_string(),
        });
        if reached_end {
            self.terminate(TraceEvent::Completed);
        }
    }

    fn enter_collecting(&mut self) {
        if self.state != ParseState::CollectingHops {
            self.state = ParseState::CollectingHops;
            self.pending.push_back(TraceEvent::MaxHopsReached);
        }
    }

    fn terminate(&mut self, event: TraceEvent) {
        self.state = ParseState::Terminated;
        self.pending.push_back(event);
    }
}

impl<S: LineSource> Iterator for TraceParser<S> {
    type Item = TraceEvent;

    fn next(&mut self) -> Option<TraceEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.state == ParseState::Terminated {
                return None;
            }

            match self.source.next_line() {
                Ok(Some(line)) => self.feed(&line),
                Ok(None) => self.terminate(TraceEvent::Exhausted),
                Err(err) => {
                    warn!(error = %err, "treating unreadable tracer output as end of stream");
                    self.terminate(TraceEvent::Exhausted);
                }
            }
        }
    }
}
