//! Implements the entropy decoder.
use crate::cdf::update_cdf;
use crate::entropy_decoder::{
    DecoderConfiguration, CDF_PRECISION, LINEAR_SEARCH_LIMIT, MAX_CACHED_BITS,
    MIN_PROBABILITY_PER_SYMBOL, WINDOW_BYTES, WINDOW_SIZE,
};
use crate::math::Log;
use crate::{BitReader, Error, Result};

/// The longest prefix a Golomb code may have.
const MAX_GOLOMB_LENGTH: u32 = 20;

/// The entropy decoder.
///
/// Decodes the symbols of one independently coded unit of the bitstream, usually
/// a tile. The decoder borrows its input for its whole lifetime and never reads past
/// its end; once the input is exhausted, it continues with zero bits. Bit and symbol
/// reads never fail. A stream that was truncated or corrupted decodes to wrong
/// values, which the caller has to detect.
///
/// The CDF tables are owned by the caller and passed in for every symbol. They are
/// adapted in place, unless the decoder was created with `allow_update_cdf` set to
/// false.
///
/// The decoder can be moved freely, but not copied: it represents exactly one
/// position in the stream.
#[derive(Debug)]
pub struct EntropyDecoder<'d> {
    /// Buffered input.
    data: &'d [u8],
    /// The offset at which the next byte will be read.
    cursor: usize,
    /// As long as the cursor is below this offset, a whole window can be loaded at once.
    fast_refill_end: usize,
    /// Adapt the CDF tables after each symbol.
    allow_update_cdf: bool,
    /// Set once zero bits are shifted in past the end of the input.
    padding: bool,
    /// The number of bits cached below the 16 bits of the current difference.
    /// Negative if the window needs to be refilled before the next symbol.
    bits: i32,
    /// The number of values in the current range. Only the lower 16 bits are used.
    values_in_range: u32,
    /// The difference between the top of the current range and the coded value,
    /// minus one. The 16 bits above `bits` are used to decode the next symbol.
    window_diff: u64,
}

impl<'d> EntropyDecoder<'d> {
    /// Creates a new decoder from the given buffer.
    pub fn new(data: &'d [u8], allow_update_cdf: bool) -> Self {
        log::trace!(
            "creating entropy decoder over {} bytes (cdf update: {})",
            data.len(),
            allow_update_cdf
        );

        let fast_refill_end = if data.len() >= WINDOW_BYTES {
            data.len() - WINDOW_BYTES + 1
        } else {
            0
        };

        let mut dec = Self {
            data,
            cursor: 0,
            fast_refill_end,
            allow_update_cdf,
            padding: false,
            bits: -15,
            values_in_range: u32::from(crate::cdf::CDF_MAX_PROBABILITY),
            window_diff: 0,
        };

        if dec.cursor < dec.fast_refill_end {
            // A whole window is loaded. The initial difference only has 15 bits, so
            // more than MAX_CACHED_BITS bits are cached in that case.
            dec.window_diff = !dec.load_window();
            dec.cursor += WINDOW_BYTES;
            dec.bits = WINDOW_SIZE - 15;
        } else {
            dec.populate_bits();
        }

        dec
    }

    /// Creates a new decoder from the given buffer and configuration.
    pub fn with_configuration(data: &'d [u8], configuration: &DecoderConfiguration) -> Self {
        Self::new(data, configuration.allow_update_cdf)
    }

    /// Returns true if the CDF tables are adapted after each symbol.
    pub fn allow_update_cdf(&self) -> bool {
        self.allow_update_cdf
    }

    /// Loads the next window of input bytes in big-endian order.
    /// The cursor must be below `fast_refill_end`.
    #[inline(always)]
    fn load_window(&self) -> u64 {
        let mut bytes = [0_u8; WINDOW_BYTES];
        bytes.copy_from_slice(&self.data[self.cursor..self.cursor + WINDOW_BYTES]);
        u64::from_be_bytes(bytes)
    }

    /// Refills the window. Must only be called if `bits` is negative.
    ///
    /// Past the end of the input, zero bits are read.
    fn populate_bits(&mut self) {
        debug_assert!(self.bits < 0);

        if self.cursor < self.fast_refill_end {
            // Only the upper six bytes fit next to the 16 bits of the difference.
            let value = !self.load_window() >> (WINDOW_SIZE - MAX_CACHED_BITS);
            self.cursor += (MAX_CACHED_BITS >> 3) as usize;
            self.window_diff = value | (self.window_diff << MAX_CACHED_BITS);
            self.bits += MAX_CACHED_BITS;
            return;
        }

        let mut bits = self.bits;
        let mut window_diff = self.window_diff;
        let mut count = WINDOW_SIZE - 9 - (bits + 15);
        while count >= 0 && self.cursor < self.data.len() {
            let value = u64::from(self.data[self.cursor] ^ 0xFF);
            self.cursor += 1;
            window_diff = (window_diff << 8) | value;
            bits += 8;
            count -= 8;
        }
        debug_assert!(bits <= MAX_CACHED_BITS);

        if self.cursor == self.data.len() {
            if !self.padding {
                log::trace!("input exhausted after {} bytes", self.data.len());
                self.padding = true;
            }
            // Shift in ones, the inverted zero bits.
            // Wraps only if all difference bits were ones, which yields the same result.
            window_diff = ((window_diff + 1) << (MAX_CACHED_BITS - bits)).wrapping_sub(1);
            bits = MAX_CACHED_BITS;
        }

        self.bits = bits;
        self.window_diff = window_diff;
    }

    /// Normalizes the range so that 32768 <= `values_in_range` < 65536 and
    /// refills the window if necessary.
    #[inline(always)]
    fn normalize_range(&mut self) {
        let bits_used = 15 ^ self.values_in_range.floor_log2();
        self.bits -= bits_used as i32;
        self.values_in_range <<= bits_used;
        if self.bits < 0 {
            self.populate_bits();
        }
    }

    /// The 16 bits of the difference that decide the next symbol.
    #[inline(always)]
    fn symbol_value(&self) -> u32 {
        u32::from((self.window_diff >> self.bits) as u16)
    }

    /// Zooms into the interval `[curr, prev)` of the decoded symbol.
    #[inline(always)]
    fn consume(&mut self, prev: u32, curr: u32) {
        self.values_in_range = prev - curr;
        self.window_diff -= u64::from(curr) << self.bits;
        self.normalize_range();
    }

    /// Decodes a symbol of two with the probability `threshold` for a one.
    #[inline(always)]
    fn decode_binary(&mut self, threshold: u32) -> bool {
        let symbol = self.symbol_value() < threshold;
        if symbol {
            self.values_in_range = threshold;
        } else {
            self.values_in_range -= threshold;
            self.window_diff -= u64::from(threshold) << self.bits;
        }
        self.normalize_range();
        symbol
    }

    /// Reads a symbol by scanning the `cdf` from the first symbol upwards.
    ///
    /// Every entry is scaled to the current range, the first one that falls to or
    /// below the difference ends the scan. The last symbol scales to zero and is never
    /// looked at.
    #[inline(always)]
    fn read_symbol_linear(&mut self, cdf: &[u16], symbol_count: usize) -> usize {
        debug_assert_eq!(cdf[symbol_count - 1], 0);
        let last = symbol_count - 1;
        let symbol_value = self.symbol_value();
        let values_in_range_shifted = self.values_in_range >> 8;

        let mut prev = self.values_in_range;
        for (symbol, &probability) in cdf[..last].iter().enumerate() {
            let curr = scale_cdf(values_in_range_shifted, probability, last - symbol);
            if symbol_value >= curr {
                self.consume(prev, curr);
                return symbol;
            }
            prev = curr;
        }

        self.consume(prev, 0);
        last
    }

    /// Reads a symbol with a binary search for the first scaled entry of the `cdf`
    /// that falls to or below the difference.
    ///
    /// `prev` holds the scaled value of `low - 1` and `curr` the one of `high`,
    /// with the range itself above the first and zero below the last symbol.
    #[inline(always)]
    fn read_symbol_binary(&mut self, cdf: &[u16], symbol_count: usize) -> usize {
        debug_assert_eq!(cdf[symbol_count - 1], 0);
        let last = symbol_count - 1;
        let symbol_value = self.symbol_value();
        let values_in_range_shifted = self.values_in_range >> 8;

        let mut low = 0;
        let mut high = last;
        let mut prev = self.values_in_range;
        let mut curr = 0;
        while low < high {
            let mid = (low + high) >> 1;
            let scaled = scale_cdf(values_in_range_shifted, cdf[mid], last - mid);
            if symbol_value < scaled {
                low = mid + 1;
                prev = scaled;
            } else {
                high = mid;
                curr = scaled;
            }
        }

        self.consume(prev, curr);
        low
    }

    /// Reads a symbol with a search strategy that fits the size of the alphabet.
    #[inline(always)]
    fn read_symbol_impl(&mut self, cdf: &[u16], symbol_count: usize) -> usize {
        if symbol_count < LINEAR_SEARCH_LIMIT {
            self.read_symbol_linear(cdf, symbol_count)
        } else {
            self.read_symbol_binary(cdf, symbol_count)
        }
    }

    /// Reads a symbol of an alphabet with `symbol_count` symbols, which is only
    /// known at runtime.
    ///
    /// The `cdf` has to hold `symbol_count + 1` entries and is adapted to the
    /// decoded symbol if the decoder allows it.
    pub fn read_symbol(&mut self, cdf: &mut [u16], symbol_count: usize) -> usize {
        debug_assert!((2..=crate::cdf::MAX_SYMBOL_COUNT).contains(&symbol_count));
        let symbol = self.read_symbol_impl(cdf, symbol_count);
        if self.allow_update_cdf {
            update_cdf(cdf, symbol_count, symbol);
        }
        symbol
    }

    /// Reads a symbol of an alphabet with `N` symbols, which is known at compile time.
    ///
    /// Behaves exactly like `read_symbol()`, but lets the compiler unroll the search
    /// and the adaptation for each alphabet size.
    #[inline]
    pub fn read_symbol_n<const N: usize>(&mut self, cdf: &mut [u16]) -> usize {
        debug_assert!((2..=crate::cdf::MAX_SYMBOL_COUNT).contains(&N));
        let symbol = self.read_symbol_impl(cdf, N);
        if self.allow_update_cdf {
            update_cdf(cdf, N, symbol);
        }
        symbol
    }

    /// Reads a boolean with a boolean `cdf` table.
    ///
    /// The table is adapted to the decoded value if the decoder allows it.
    pub fn read_bool(&mut self, cdf: &mut [u16; 3]) -> bool {
        debug_assert_eq!(cdf[1], 0);
        let symbol = self.read_bool_without_cdf_update(cdf[0]);
        if self.allow_update_cdf {
            update_cdf(cdf, 2, usize::from(symbol));
        }
        symbol
    }

    /// Reads a boolean with the fixed probability `cdf`, which is never adapted.
    pub fn read_bool_without_cdf_update(&mut self, cdf: u16) -> bool {
        debug_assert!(cdf < crate::cdf::CDF_MAX_PROBABILITY);
        let threshold = scale_cdf(self.values_in_range >> 8, cdf, 1);
        self.decode_binary(threshold)
    }

    /// Reads a value coded with an Exp-Golomb code of equiprobable bits.
    ///
    /// Fails if the prefix is longer than 20 bits.
    pub fn read_golomb(&mut self) -> Result<u32> {
        let mut length = 0;
        loop {
            length += 1;
            if length > MAX_GOLOMB_LENGTH {
                log::debug!("rejecting golomb code with a prefix of {} bits", length);
                return Err(Error::GolombTooLong(MAX_GOLOMB_LENGTH));
            }
            if self.read_bit() != 0 {
                break;
            }
        }

        let x = (1_u32 << (length - 1)) | self.read_literal(length - 1);
        Ok(x - 1)
    }
}

impl<'d> BitReader for EntropyDecoder<'d> {
    fn read_bit(&mut self) -> u32 {
        let threshold = ((self.values_in_range & !255) >> 1) + MIN_PROBABILITY_PER_SYMBOL;
        u32::from(self.decode_binary(threshold))
    }

    fn read_literal(&mut self, num_bits: u32) -> u32 {
        debug_assert!(num_bits <= 32);
        let mut literal = 0;
        for _ in 0..num_bits {
            literal = (literal << 1) | self.read_bit();
        }
        literal
    }
}

/// Scales the `probability` of a CDF entry to the current range, where `remaining`
/// is the number of symbols above the entry. Every remaining symbol keeps a minimal
/// part of the range.
#[inline(always)]
fn scale_cdf(values_in_range_shifted: u32, probability: u16, remaining: usize) -> u32 {
    ((values_in_range_shifted * (u32::from(probability) >> CDF_PRECISION)) >> 1)
        + MIN_PROBABILITY_PER_SYMBOL * remaining as u32
}
