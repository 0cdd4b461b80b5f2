#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]
//! Implements the adaptive multi-symbol entropy decoder of the AV1 video codec in Rust.
//!
//! Every coefficient, mode decision and residual value of an AV1 tile passes through
//! this decoder. It turns the compressed bytes of a tile into symbols, each decoded
//! against a probability table that adapts to the symbols seen so far.
//!
//! The crate provides:
//!
//! * [`EntropyDecoder`]: the arithmetic decoder, reading bits, literals, booleans and
//!   symbols of alphabets with up to 16 symbols
//! * [`cdf`]: the layout, adaptation and validation of the probability tables
//! * [`BitReader`]: quasi-uniform and sub-exponential codes built on top of bits
//!
//! ```
//! use av1_entropy::{BitReader, EntropyDecoder};
//!
//! let tile = [0x8F, 0x12, 0x00, 0xC3];
//! let mut decoder = EntropyDecoder::new(&tile, true);
//!
//! // One CDF table per syntax element and context, owned by the caller.
//! let mut cdf = [24576, 16384, 8192, 0, 0];
//! let symbol = decoder.read_symbol(&mut cdf, 4);
//! assert!(symbol < 4);
//! assert_eq!(cdf[4], 1);
//!
//! let literal = decoder.read_literal(5);
//! assert!(literal < 32);
//! ```
//!
//! The decoder never allocates, never fails on truncated input and is not
//! synchronized. Tiles are decoded in parallel by creating one decoder per tile,
//! each with its own copies of the probability tables.
pub use bit_reader::*;
pub use entropy_decoder::*;
pub use error::*;

mod bit_reader;
pub mod cdf;
mod entropy_decoder;
mod error;
pub(crate) mod math;
