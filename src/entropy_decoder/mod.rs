//! Implements the entropy decoder.
//!
//! This is a multi-symbol arithmetic decoder in the style of [Mar79] range coding,
//! with 15 bit probabilities and a 16 bit range. Every symbol is decoded against an
//! adaptive CDF table, see [`crate::cdf`], that is adapted after each symbol the same
//! way the encoder adapts it.
//!
//! The coded value is not tracked directly. Instead the decoder keeps the
//! difference between the top of the current range and the coded value, stored in
//! a 64 bit window that is refilled from the input whenever too few bits are left.
//! Bytes enter the window inverted, which turns the zero bits that pad a stream
//! past its end into ones shifted in at the bottom.
//!
//! The range is kept normalized, so that `32768 <= values_in_range < 65536`
//! holds after every decoded symbol.
//!
//! * Mar79: "Range encoding: an algorithm for removing redundancy from a digitised message"
//!          by Martin, G.N.N. (1979)
pub use decoder::EntropyDecoder;

mod decoder;
#[cfg(test)]
mod encoder;

/// Width of the window in bits.
const WINDOW_SIZE: i32 = 64;
/// Width of the window in bytes.
const WINDOW_BYTES: usize = (WINDOW_SIZE / 8) as usize;
/// The number of bits above the 16 bits of the current difference, that are
/// buffered after a refill.
const MAX_CACHED_BITS: i32 = WINDOW_SIZE - 16;
/// The probabilities are stored with 15 bits, but only the upper 9 bits
/// take part in the scaling.
const CDF_PRECISION: u32 = 6;
/// Every symbol keeps at least this many values of the range.
const MIN_PROBABILITY_PER_SYMBOL: u32 = 4;
/// Alphabets with fewer symbols than this are searched linearly, larger ones with
/// a binary search.
const LINEAR_SEARCH_LIMIT: usize = 14;

/// Configures the entropy decoder on creation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecoderConfiguration {
    /// Adapts the CDF tables after every decoded symbol. Default: true.
    ///
    /// Disable this for passes that must not change the adaptive state, for
    /// example when a tile is parsed a second time.
    pub allow_update_cdf: bool,
}

impl Default for DecoderConfiguration {
    fn default() -> Self {
        Self {
            allow_update_cdf: true,
        }
    }
}
