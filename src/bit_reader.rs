//! Codes that are built on top of single bits and literals.

use crate::math::{inverse_recenter, Log};
use crate::{Error, Result};

/// Provides common codes for readers of equiprobable bits.
pub trait BitReader {
    /// Reads a single bit.
    fn read_bit(&mut self) -> u32;

    /// Reads an unsigned literal of `num_bits` bits, most significant bit first.
    fn read_literal(&mut self, num_bits: u32) -> u32;

    /// Reads a value in `0..n` with a quasi-uniform code.
    ///
    /// The first `(1 << w) - n` values take `w - 1` bits, all others take `w` bits,
    /// where `w` is the bit width of `n`. Returns `0` without reading for `n <= 1`.
    fn decode_uniform(&mut self, n: u32) -> u32 {
        if n <= 1 {
            return 0;
        }
        let w = n.floor_log2() + 1;
        let m = ((1_u64 << w) - u64::from(n)) as u32;
        let v = self.read_literal(w - 1);
        if v < m {
            return v;
        }
        let extra_bit = self.read_bit();
        (v << 1) - m + extra_bit
    }

    /// Reads a value in `0..num_symbols` with a finite sub-exponential code.
    ///
    /// `control` is the bit width of the first bucket, every following bucket is
    /// twice as large, the last bucket is coded quasi-uniformly.
    fn decode_subexp(&mut self, num_symbols: u32, control: u32) -> Result<u32> {
        let mut i = 0;
        let mut mk: u32 = 0;
        loop {
            let b = if i != 0 { control + i - 1 } else { control };
            if b >= 32 {
                log::debug!("rejecting sub-exponential code with a {} bit literal", b);
                return Err(Error::SubexpTooWide(b));
            }
            let a = 1_u64 << b;
            if u64::from(num_symbols) <= u64::from(mk) + 3 * a {
                return Ok(self.decode_uniform(num_symbols - mk) + mk);
            }
            if self.read_bit() != 0 {
                i += 1;
                mk += a as u32;
            } else {
                return Ok(self.read_literal(b) + mk);
            }
        }
    }

    /// Reads a value in `0..mx` with a sub-exponential code, recentered around
    /// `reference` so that values close to it get the shortest codes.
    fn decode_unsigned_subexp_with_reference(
        &mut self,
        mx: u32,
        reference: u32,
        control: u32,
    ) -> Result<u32> {
        if reference >= mx {
            log::debug!("rejecting reference {} for the interval [0, {})", reference, mx);
            return Err(Error::ReferenceOutOfRange {
                low: 0,
                high: i64::from(mx),
                reference: i64::from(reference),
            });
        }
        let v = self.decode_subexp(mx, control)?;
        if (u64::from(reference) << 1) <= u64::from(mx) {
            Ok(inverse_recenter(reference, v))
        } else {
            Ok(mx - 1 - inverse_recenter(mx - 1 - reference, v))
        }
    }

    /// Reads a value in `low..high` with a sub-exponential code, recentered around
    /// `reference`, which has to lie in the same interval.
    fn decode_signed_subexp_with_reference(
        &mut self,
        low: i32,
        high: i32,
        reference: i32,
        control: u32,
    ) -> Result<i32> {
        if low >= high || reference < low || reference >= high {
            log::debug!(
                "rejecting reference {} for the interval [{}, {})",
                reference,
                low,
                high
            );
            return Err(Error::ReferenceOutOfRange {
                low: i64::from(low),
                high: i64::from(high),
                reference: i64::from(reference),
            });
        }
        let mx = (i64::from(high) - i64::from(low)) as u32;
        let reference = (i64::from(reference) - i64::from(low)) as u32;
        let value = self.decode_unsigned_subexp_with_reference(mx, reference, control)?;
        Ok((i64::from(low) + i64::from(value)) as i32)
    }
}
