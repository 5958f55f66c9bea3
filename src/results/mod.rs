//! Result types and decoding
//!
//! Defines the typed model of an Instant Answer response and turns raw
//! response bodies into it.

mod decoder;
mod lenient;
mod types;

pub use decoder::{decode, ResultDecoder};
pub use types::*;
