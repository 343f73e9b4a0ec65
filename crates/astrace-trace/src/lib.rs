//! Tracer output collection and parsing.

pub mod extract;
pub mod markers;
pub mod parser;
pub mod runner;
pub mod stream;

pub use extract::extract_ipv4;
pub use markers::{Locale, MarkerKind, Markers};
pub use parser::{ParseState, TraceParser};
pub use runner::{ProcessLines, TracerSettings};
pub use stream::{decode_line, LineSource, ReaderLines};
