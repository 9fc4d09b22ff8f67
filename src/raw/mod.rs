//! Wire structs that map directly onto the on-disk layout.
//!
//! These are uninterpreted: coordinates are still quantized, strings are still
//! nul-filled byte fields, and bit fields are still packed. The typed
//! interfaces live one level up, in [Header](crate::Header),
//! [Point](crate::Point) and [Vlr](crate::Vlr).

mod header;
mod point;
pub mod vlr;

pub use self::{header::Header, header::HEADER_SIZE, point::Point, vlr::Vlr};
