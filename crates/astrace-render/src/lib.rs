//! Fixed-width table output for traced hops.

pub mod table;

pub use table::{format_row, TableRenderer, HEADER};
